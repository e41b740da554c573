//! End-to-end test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every `QuantApi`
//! operation over real HTTP through a ureq-backed `Transport`. Validates that
//! request building, the client's DTOs and the server's DTOs agree.

use async_trait::async_trait;
use chrono::NaiveDate;
use quant_core::{
    AccountStatus, ApiError, BacktestRequest, CreateAccountRequest, HttpMethod, HttpRequest, HttpResponse,
    ParamValue, QuantApi, RequestClient, Transport,
};

/// Runs requests with a blocking ureq agent on tokio's blocking pool.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the request
/// helper handle status interpretation.
#[derive(Clone)]
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

fn execute_blocking(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => {
            let mut builder = agent.get(&req.path);
            for (name, value) in &req.headers {
                builder = builder.header(name, value);
            }
            builder.call()
        }
        (HttpMethod::Post, body) => {
            let mut builder = agent.post(&req.path);
            for (name, value) in &req.headers {
                builder = builder.header(name, value);
            }
            builder.send(body.unwrap_or_default().as_bytes())
        }
    }
    .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body,
    })
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
    }
}

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn quant_lifecycle() {
    // Step 1: start mock server on a random port.
    let base_url = start_server().await;
    let api = QuantApi::new(RequestClient::new(&base_url, UreqTransport::new()));

    // Step 2: list strategies.
    let strategies = api.get_strategies().await.unwrap();
    assert_eq!(strategies.len(), 1);
    let strategy = &strategies[0];
    assert_eq!(strategy.id, "DualMovingAverage");
    assert_eq!(strategy.param("fast_period").unwrap().default, ParamValue::Int(10));

    // Step 3: run a backtest with one overridden param.
    let request = BacktestRequest::new(&strategy.id, "600519", date(2023, 1, 1), date(2023, 12, 31))
        .with_initial_cash(25_000.0)
        .with_param("fast_period", 5i64);
    let result = api.run_backtest(&request).await.unwrap();
    assert!(result.is_success(), "{result:?}");
    let metrics = result.metrics().unwrap();
    assert_eq!(metrics.initial_cash, Some(25_000.0));
    assert_eq!(metrics.final_value, Some(25_000.0));
    assert_eq!(metrics.total_trades, Some(0));

    // Step 4: reversed date range — reported as data, not as an error.
    let reversed = BacktestRequest::new(&strategy.id, "600519", date(2023, 12, 31), date(2023, 1, 1));
    let result = api.run_backtest(&reversed).await.unwrap();
    assert!(!result.is_success());
    assert_eq!(result.status(), "failed");
    assert!(result.metrics().is_none());
    assert!(result.error().unwrap().contains("after"));

    // Step 5: unknown strategy — the server wraps its 404 into a 500.
    let unknown = BacktestRequest::new("Nope", "600519", date(2023, 1, 1), date(2023, 2, 1));
    let err = api.run_backtest(&unknown).await.unwrap_err();
    match err {
        ApiError::HttpError { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("404: Strategy Nope not found"), "{body}");
        }
        other => panic!("expected HttpError, got {other:?}"),
    }

    // Step 6: account does not exist yet.
    let err = api.get_account("u1", &strategy.id).await.unwrap_err();
    assert_eq!(err, ApiError::NotFound);

    // Step 7: create it.
    let created = api
        .create_account(&CreateAccountRequest::new("u1", &strategy.id).with_initial_capital(1000.0))
        .await
        .unwrap();
    assert_eq!(created.user_id, "u1");
    assert_eq!(created.status, AccountStatus::Active);
    assert_eq!(created.cash, 1000.0);
    assert_eq!(created.market_value(), 0.0);

    // Step 8: fetch it by composite key.
    let fetched = api.get_account("u1", &strategy.id).await.unwrap();
    assert_eq!(fetched, created);

    // Step 9: creating again returns the existing account.
    let again = api
        .create_account(&CreateAccountRequest::new("u1", &strategy.id))
        .await
        .unwrap();
    assert_eq!(again, created);
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_a_transport_error() {
    // Bind and drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let api = QuantApi::new(RequestClient::new(&format!("http://127.0.0.1:{port}"), UreqTransport::new()));

    let err = api.get_strategies().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
}
