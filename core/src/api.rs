//! Backtest and paper-trading operations.
//!
//! Each operation is one call on the underlying [`HttpClient`]. Errors are
//! the client's own and pass through unchanged; a failed backtest that the
//! server reports as data comes back as `Ok(BacktestResponse::Failure { .. })`.

use tracing::debug;

use crate::http::HttpClient;
use crate::types::{BacktestRequest, BacktestResponse, CreateAccountRequest, PaperAccount, StrategySchema};

pub const STRATEGIES_PATH: &str = "/api/backtest/strategies";
pub const BACKTEST_RUN_PATH: &str = "/api/backtest/run";
pub const ACCOUNTS_PATH: &str = "/api/paper-trading/accounts";

/// Path of a single paper account.
///
/// Identifiers are interpolated as-is. They must not contain `/`, `?` or `#`.
pub fn account_path(user_id: &str, strategy_id: &str) -> String {
    format!("{ACCOUNTS_PATH}/{user_id}/{strategy_id}")
}

/// Typed surface over the quant backend.
#[derive(Debug, Clone)]
pub struct QuantApi<C> {
    client: C,
}

impl<C: HttpClient> QuantApi<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    /// List every strategy the server knows, with its parameter schema.
    pub async fn get_strategies(&self) -> Result<Vec<StrategySchema>, C::Error> {
        debug!("listing strategies");
        self.client.get(STRATEGIES_PATH).await
    }

    /// Run a backtest and wait for the server to finish it.
    pub async fn run_backtest(&self, request: &BacktestRequest) -> Result<BacktestResponse, C::Error> {
        debug!(
            strategy_id = %request.strategy_id,
            symbol = %request.symbol,
            start = %request.start_date,
            end = %request.end_date,
            "running backtest"
        );
        self.client.post(BACKTEST_RUN_PATH, request).await
    }

    /// Open a paper account for `(user_id, strategy_id)`.
    pub async fn create_account(&self, request: &CreateAccountRequest) -> Result<PaperAccount, C::Error> {
        debug!(user_id = %request.user_id, strategy_id = %request.strategy_id, "creating paper account");
        self.client.post(ACCOUNTS_PATH, request).await
    }

    pub async fn get_account(&self, user_id: &str, strategy_id: &str) -> Result<PaperAccount, C::Error> {
        debug!(user_id, strategy_id, "fetching paper account");
        self.client.get(&account_path(user_id, strategy_id)).await
    }
}
