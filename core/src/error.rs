//! Error types for the ajax dispatcher.
//!
//! # Design
//! Neither error ever reaches a request's callbacks as a value. A
//! `ConfigError` is returned when loading `RequestSettings` from JSON, before
//! any exchange exists. A `TransportError` is produced by a `Transport` and
//! collapsed into the error callback's `(status, status_text)` pair; its
//! detail only shows up in the logs.

use thiserror::Error;

/// Errors raised while loading request settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// A payload field held an array or object instead of a scalar.
    #[error("payload field `{key}` is not a scalar value")]
    NonScalarField { key: String },

    #[error("invalid request settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when an exchange could not complete.
///
/// An HTTP error status is not a `TransportError`; the exchange completed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("I/O error while reading the response: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(_) => TransportError::Timeout,
            ureq::Error::BadUri(uri) => TransportError::InvalidUrl(uri),
            ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => TransportError::Timeout,
            ureq::Error::Io(io) => TransportError::Io(io),
            other => TransportError::Network(other.to_string()),
        }
    }
}
