//! Domain DTOs for the backtest and paper-trading endpoints.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any drift between the two crates.
//!
//! Values the server leaves dynamically typed get closed Rust types here:
//! strategy parameters are a [`ParamValue`] variant, positions are
//! [`PaperPosition`] records, and a backtest outcome is either a success with
//! metrics or a failure with an error message, never both.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;
pub const DEFAULT_COMMISSION: f64 = 0.0003;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

/// Status label the server uses for a completed backtest.
pub const STATUS_SUCCESS: &str = "success";

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Declared type of a strategy parameter, using the server's labels.
///
/// Labels outside the known set are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParamType {
    Int,
    Float,
    Bool,
    Str,
    Other(String),
}

impl ParamType {
    pub fn as_str(&self) -> &str {
        match self {
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Bool => "bool",
            ParamType::Str => "str",
            ParamType::Other(label) => label,
        }
    }
}

impl From<String> for ParamType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "int" => ParamType::Int,
            "float" => ParamType::Float,
            "bool" => ParamType::Bool,
            "str" => ParamType::Str,
            _ => ParamType::Other(label),
        }
    }
}

impl From<ParamType> for String {
    fn from(param_type: ParamType) -> Self {
        match param_type {
            ParamType::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// A strategy parameter value.
///
/// Untagged on the wire: JSON integers decode as `Int`, numbers with a
/// fraction or exponent as `Float`, `null` as `Null` and arrays (the server's
/// tuples and lists) as `List`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Scalar type of the value. `Null` and `List` have no single label:
    /// the server reports them by their Python type name.
    pub fn param_type(&self) -> Option<ParamType> {
        match self {
            ParamValue::Bool(_) => Some(ParamType::Bool),
            ParamValue::Int(_) => Some(ParamType::Int),
            ParamValue::Float(_) => Some(ParamType::Float),
            ParamValue::Str(_) => Some(ParamType::Str),
            ParamValue::Null | ParamValue::List(_) => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// One configurable input of a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParam {
    pub name: String,
    pub default: ParamValue,
    #[serde(rename = "type")]
    pub param_type: ParamType,
}

/// A strategy's identity and configuration surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySchema {
    pub id: String,
    pub name: String,
    pub description: String,
    pub params: Vec<StrategyParam>,
}

impl StrategySchema {
    pub fn param(&self, name: &str) -> Option<&StrategyParam> {
        self.params.iter().find(|p| p.name == name)
    }
}

// ---------------------------------------------------------------------------
// Backtest
// ---------------------------------------------------------------------------

/// Input to a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub strategy_id: String,
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_cash: f64,
    pub commission: f64,
    pub params: BTreeMap<String, ParamValue>,
}

impl BacktestRequest {
    /// A request with the server's default cash, commission and no params.
    pub fn new(strategy_id: &str, symbol: &str, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            strategy_id: strategy_id.to_string(),
            symbol: symbol.to_string(),
            start_date,
            end_date,
            initial_cash: DEFAULT_INITIAL_CASH,
            commission: DEFAULT_COMMISSION,
            params: BTreeMap::new(),
        }
    }

    pub fn with_initial_cash(mut self, initial_cash: f64) -> Self {
        self.initial_cash = initial_cash;
        self
    }

    pub fn with_commission(mut self, commission: f64) -> Self {
        self.commission = commission;
        self
    }

    pub fn with_param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }
}

/// Computed results of a backtest. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpe_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_drawdown: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_drawdown_len: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_trades: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub won_trades: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lost_trades: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_cash: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_pct: Option<f64>,
}

/// Outcome of a backtest run.
///
/// On the wire this is `{status, metrics?, error?}`. A `"success"` status
/// must carry metrics and no error; any other status must carry an error and
/// no metrics. Payloads breaking that rule fail to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireBacktestResponse", into = "WireBacktestResponse")]
pub enum BacktestResponse {
    Success { metrics: BacktestMetrics },
    Failure { status: String, error: String },
}

impl BacktestResponse {
    pub fn status(&self) -> &str {
        match self {
            BacktestResponse::Success { .. } => STATUS_SUCCESS,
            BacktestResponse::Failure { status, .. } => status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BacktestResponse::Success { .. })
    }

    pub fn metrics(&self) -> Option<&BacktestMetrics> {
        match self {
            BacktestResponse::Success { metrics } => Some(metrics),
            BacktestResponse::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            BacktestResponse::Success { .. } => None,
            BacktestResponse::Failure { error, .. } => Some(error),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireBacktestResponse {
    status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metrics: Option<BacktestMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TryFrom<WireBacktestResponse> for BacktestResponse {
    type Error = String;

    fn try_from(wire: WireBacktestResponse) -> Result<Self, Self::Error> {
        let WireBacktestResponse { status, metrics, error } = wire;
        if status == STATUS_SUCCESS {
            return match (metrics, error) {
                (Some(metrics), None) => Ok(BacktestResponse::Success { metrics }),
                (None, _) => Err("success response without metrics".to_string()),
                (Some(_), Some(_)) => Err("success response carries an error".to_string()),
            };
        }
        match (metrics, error) {
            (None, Some(error)) => Ok(BacktestResponse::Failure { status, error }),
            (Some(_), _) => Err(format!("{status} response carries metrics")),
            (None, None) => Err(format!("{status} response without error")),
        }
    }
}

impl From<BacktestResponse> for WireBacktestResponse {
    fn from(response: BacktestResponse) -> Self {
        match response {
            BacktestResponse::Success { metrics } => WireBacktestResponse {
                status: STATUS_SUCCESS.to_string(),
                metrics: Some(metrics),
                error: None,
            },
            BacktestResponse::Failure { status, error } => WireBacktestResponse {
                status,
                metrics: None,
                error: Some(error),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Paper trading
// ---------------------------------------------------------------------------

/// Request payload for opening a paper account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub user_id: String,
    pub strategy_id: String,
    pub initial_capital: f64,
}

impl CreateAccountRequest {
    pub fn new(user_id: &str, strategy_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            strategy_id: strategy_id.to_string(),
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }

    pub fn with_initial_capital(mut self, initial_capital: f64) -> Self {
        self.initial_capital = initial_capital;
        self
    }
}

/// Lifecycle label of a paper account. Unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountStatus {
    Active,
    Stopped,
    Closed,
    Unknown(String),
}

impl AccountStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Stopped => "stopped",
            AccountStatus::Closed => "closed",
            AccountStatus::Unknown(label) => label,
        }
    }
}

impl From<String> for AccountStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "active" => AccountStatus::Active,
            "stopped" => AccountStatus::Stopped,
            "closed" => AccountStatus::Closed,
            _ => AccountStatus::Unknown(label),
        }
    }
}

impl From<AccountStatus> for String {
    fn from(status: AccountStatus) -> Self {
        match status {
            AccountStatus::Unknown(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// A holding in a paper account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperPosition {
    pub symbol: String,
    pub quantity: i64,
    pub cost_price: f64,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_value: Option<f64>,
    #[serde(default)]
    pub pnl: Option<f64>,
    #[serde(default)]
    pub pnl_pct: Option<f64>,
}

/// A paper-trading account, keyed by `(user_id, strategy_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperAccount {
    pub user_id: String,
    pub strategy_id: String,
    pub status: AccountStatus,
    pub initial_capital: f64,
    pub cash: f64,
    pub total_assets: f64,
    #[serde(default)]
    pub positions: BTreeMap<String, PaperPosition>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PaperAccount {
    /// Value held in positions, as reported by the server's last mark.
    pub fn market_value(&self) -> f64 {
        self.total_assets - self.cash
    }
}
