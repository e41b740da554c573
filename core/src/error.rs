//! Error types for the request helper.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "no such account" from "the server returned an unexpected status." All
//! other non-2xx responses land in `HttpError` with the raw status code and
//! body for debugging. `QuantApi` itself adds no variants; it forwards
//! whatever its `HttpClient` returns.

use thiserror::Error;

/// Errors returned by `RequestClient`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The transport could not complete the round-trip.
    #[error("transport failed: {0}")]
    Transport(String),
}
