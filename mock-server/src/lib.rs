use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrategyParam {
    pub name: String,
    pub default: Value,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrategySchema {
    pub id: String,
    pub name: String,
    pub description: String,
    pub params: Vec<StrategyParam>,
}

fn default_initial_cash() -> f64 {
    100_000.0
}

fn default_commission() -> f64 {
    0.0003
}

#[derive(Debug, Deserialize)]
pub struct BacktestRequest {
    pub strategy_id: String,
    pub symbol: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_initial_cash")]
    pub initial_cash: f64,
    #[serde(default = "default_commission")]
    pub commission: f64,
    #[serde(default)]
    pub params: HashMap<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_len: u64,
    pub total_trades: u64,
    pub won_trades: u64,
    pub lost_trades: u64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub initial_cash: f64,
    pub final_value: f64,
    pub pnl: f64,
    pub return_pct: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BacktestResponse {
    pub status: String,
    pub metrics: Option<BacktestMetrics>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAccount {
    pub user_id: String,
    pub strategy_id: String,
    #[serde(default = "default_initial_cash")]
    pub initial_capital: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaperPosition {
    pub symbol: String,
    pub quantity: i64,
    pub cost_price: f64,
    pub current_price: Option<f64>,
    pub market_value: Option<f64>,
    pub pnl: Option<f64>,
    pub pnl_pct: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaperAccount {
    pub user_id: String,
    pub strategy_id: String,
    pub status: String,
    pub initial_capital: f64,
    pub cash: f64,
    pub total_assets: f64,
    pub positions: BTreeMap<String, PaperPosition>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

type ApiFailure = (StatusCode, Json<ErrorDetail>);

fn not_found(detail: String) -> ApiFailure {
    (StatusCode::NOT_FOUND, Json(ErrorDetail { detail }))
}

/// The backend's run handler wraps every unexpected failure, its own 404
/// included, into a 500 whose detail is the inner `"<status>: <detail>"`.
fn internal_error(inner: ApiFailure) -> ApiFailure {
    let (status, Json(ErrorDetail { detail })) = inner;
    let detail = format!("{}: {detail}", status.as_u16());
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorDetail { detail }))
}

pub struct AppState {
    strategies: Vec<StrategySchema>,
    accounts: RwLock<HashMap<(String, String), PaperAccount>>,
}

pub type Db = Arc<AppState>;

/// The strategies this server can run.
pub fn builtin_strategies() -> Vec<StrategySchema> {
    vec![StrategySchema {
        id: "DualMovingAverage".to_string(),
        name: "Dual Moving Average".to_string(),
        description: "Trend following strategy using two moving averages".to_string(),
        params: vec![
            StrategyParam {
                name: "fast_period".to_string(),
                default: Value::from(10),
                kind: "int".to_string(),
            },
            StrategyParam {
                name: "slow_period".to_string(),
                default: Value::from(30),
                kind: "int".to_string(),
            },
        ],
    }]
}

pub fn app() -> Router {
    let db: Db = Arc::new(AppState {
        strategies: builtin_strategies(),
        accounts: RwLock::new(HashMap::new()),
    });
    Router::new()
        .route("/api/backtest/strategies", get(list_strategies))
        .route("/api/backtest/run", post(run_backtest))
        .route("/api/paper-trading/accounts", post(create_account))
        .route("/api/paper-trading/accounts/{user_id}/{strategy_id}", get(get_account))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_strategies(State(db): State<Db>) -> Json<Vec<StrategySchema>> {
    Json(db.strategies.clone())
}

async fn run_backtest(
    State(db): State<Db>,
    Json(input): Json<BacktestRequest>,
) -> Result<Json<BacktestResponse>, ApiFailure> {
    let strategy = db
        .strategies
        .iter()
        .find(|s| s.id == input.strategy_id)
        .ok_or_else(|| internal_error(not_found(format!("Strategy {} not found", input.strategy_id))))?;

    let response = match simulate(strategy, &input) {
        Ok(metrics) => BacktestResponse {
            status: "success".to_string(),
            metrics: Some(metrics),
            error: None,
        },
        Err(error) => {
            warn!(strategy_id = %input.strategy_id, symbol = %input.symbol, %error, "backtest failed");
            BacktestResponse {
                status: "failed".to_string(),
                metrics: None,
                error: Some(error),
            }
        }
    };
    Ok(Json(response))
}

/// Flat run: no trades are taken, so the account ends where it started.
fn simulate(strategy: &StrategySchema, input: &BacktestRequest) -> Result<BacktestMetrics, String> {
    let start = parse_date("start_date", &input.start_date)?;
    let end = parse_date("end_date", &input.end_date)?;
    if start > end {
        return Err(format!("start_date {start} is after end_date {end}"));
    }
    if let Some(name) = input.params.keys().find(|k| !strategy.params.iter().any(|p| &p.name == *k)) {
        return Err(format!("Unknown parameter {name} for strategy {}", strategy.id));
    }
    Ok(BacktestMetrics {
        sharpe_ratio: 0.0,
        max_drawdown: 0.0,
        max_drawdown_len: 0,
        total_trades: 0,
        won_trades: 0,
        lost_trades: 0,
        win_rate: 0.0,
        profit_factor: 0.0,
        initial_cash: input.initial_cash,
        final_value: input.initial_cash,
        pnl: 0.0,
        return_pct: 0.0,
    })
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("invalid {field} {value:?}: {e}"))
}

async fn create_account(State(db): State<Db>, Json(input): Json<CreateAccount>) -> Json<PaperAccount> {
    let mut accounts = db.accounts.write().await;
    let key = (input.user_id.clone(), input.strategy_id.clone());
    let account = accounts.entry(key).or_insert_with(|| {
        info!(user_id = %input.user_id, strategy_id = %input.strategy_id, "created paper account");
        let now = Utc::now().naive_utc();
        PaperAccount {
            user_id: input.user_id,
            strategy_id: input.strategy_id,
            status: "active".to_string(),
            initial_capital: input.initial_capital,
            cash: input.initial_capital,
            total_assets: input.initial_capital,
            positions: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    });
    Json(account.clone())
}

async fn get_account(
    State(db): State<Db>,
    Path((user_id, strategy_id)): Path<(String, String)>,
) -> Result<Json<PaperAccount>, ApiFailure> {
    let accounts = db.accounts.read().await;
    accounts
        .get(&(user_id, strategy_id))
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Account not found".to_string()))
}
