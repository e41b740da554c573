//! Typed API client core for the quant backend.
//!
//! # Overview
//! Declares the request/response shapes of the backtest and paper-trading
//! endpoints and exposes them as four async operations on [`QuantApi`].
//! The strategy engine, backtest runner and paper ledger all live on the
//! server; this crate only issues calls and decodes the answers.
//!
//! # Design
//! - [`HttpClient`] is the capability seam: `get(path)` and `post(path, body)`
//!   generic over the decoded shape. `QuantApi` is written against it and
//!   forwards its errors untouched.
//! - [`RequestClient`] is the stock `HttpClient`. It builds `HttpRequest`
//!   values and parses `HttpResponse` values, and hands the round-trip itself
//!   to a [`Transport`] supplied by the host.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod error;
pub mod http;
pub mod request;
pub mod types;

pub use api::QuantApi;
pub use error::ApiError;
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, Transport};
pub use request::RequestClient;
pub use types::{
    AccountStatus, BacktestMetrics, BacktestRequest, BacktestResponse, CreateAccountRequest,
    PaperAccount, PaperPosition, ParamType, ParamValue, StrategyParam, StrategySchema,
};
