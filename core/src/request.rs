//! Shared JSON request helper.
//!
//! # Design
//! `RequestClient` holds a `base_url`, a list of default headers and a
//! transport, and carries no mutable state between calls. Each call is split
//! into a `build_*` step that produces an `HttpRequest` and a `parse` step that
//! consumes an `HttpResponse`; the transport runs the round-trip in between.
//! Both halves are public so hosts that drive their own I/O can use them
//! without a `Transport` at all.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, Transport};

const CONTENT_TYPE_JSON: (&str, &str) = ("content-type", "application/json");

/// JSON-over-HTTP implementation of [`HttpClient`].
#[derive(Debug, Clone)]
pub struct RequestClient<T> {
    base_url: String,
    headers: Vec<(String, String)>,
    transport: T,
}

impl<T> RequestClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: Vec::new(),
            transport,
        }
    }

    /// Add a header sent with every request, e.g. `authorization`.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url(path),
            headers: self.headers.clone(),
            body: None,
        }
    }

    pub fn build_post<B>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut headers = vec![(CONTENT_TYPE_JSON.0.to_string(), CONTENT_TYPE_JSON.1.to_string())];
        headers.extend(self.headers.iter().cloned());
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.url(path),
            headers,
            body: Some(body),
        })
    }

    pub fn parse<R: DeserializeOwned>(&self, response: HttpResponse) -> Result<R, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl<T: Transport> RequestClient<T> {
    async fn round_trip<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        debug!(method = request.method.as_str(), url = %request.path, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "received response");
        self.parse(response)
    }
}

#[async_trait]
impl<T: Transport> HttpClient for RequestClient<T> {
    type Error = ApiError;

    async fn get<R>(&self, path: &str) -> Result<R, ApiError>
    where
        R: DeserializeOwned + Send,
    {
        let request = self.build_get(path);
        self.round_trip(request).await
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned + Send,
    {
        let request = self.build_post(path, body)?;
        self.round_trip(request).await
    }
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
