//! HTTP plumbing: plain-data request/response types and the two traits the
//! rest of the crate is written against.
//!
//! # Design
//! `HttpRequest` and `HttpResponse` describe a round-trip as plain data. The
//! host executes it through a [`Transport`]; non-2xx statuses come back as
//! data so status interpretation stays in one place (`RequestClient::parse`).
//!
//! [`HttpClient`] sits one level higher: it is the `get`/`post` capability the
//! API wrappers call, generic over the decoded response shape. Its error type
//! is associated so wrappers can propagate it without translation.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `RequestClient::build_*`. `path` is the absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes one HTTP round-trip.
///
/// Implementations must return non-2xx responses as `Ok(HttpResponse)` and
/// reserve `Err` for failures where no response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// The `get`/`post` capability the API wrappers depend on.
///
/// `path` is relative to whatever base the implementation targets, e.g.
/// `/api/backtest/strategies`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issue a GET and decode the body as `T`.
    async fn get<T>(&self, path: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned + Send;

    /// Issue a POST carrying `body` as JSON and decode the answer as `T`.
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Self::Error>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send;
}
