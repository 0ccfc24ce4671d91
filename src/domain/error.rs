//! Error types for the catalog client.
//!
//! Two layers of errors live here. [`ApiError`] is the structured failure the
//! remote catalog backend reports for a single query (`kind` + `message` +
//! optional `retry_after`); it is data that flows through the event loop and
//! ends up rendered as a banner. [`ShikimoreError`] is the crate-level error
//! for everything the host itself can fail at: storage, configuration and the
//! runtime. Both are implemented with `thiserror`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown when the backend reports a failure without any text.
const GENERIC_FAILURE: &str = "Failed to load data";

/// Category of a backend failure.
///
/// Serialized in `snake_case` so that it matches the backend's wire encoding
/// (`"rate_limit"`, `"not_found"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Request parameters were rejected before reaching the API.
    Validation,
    /// Transport-level failure.
    Http,
    /// The GraphQL layer returned errors.
    Graphql,
    /// The API throttled the client; see [`ApiError::retry_after`].
    RateLimit,
    /// Any other error reported by the API.
    Api,
    /// The response could not be decoded.
    Serialization,
    /// The requested entity does not exist.
    NotFound,
}

/// Structured failure reported by a backend query.
///
/// The `Display` implementation is the user-facing text: the message itself
/// (or a generic fallback when empty), with a "retry after N seconds" suffix
/// for rate-limit errors that carry a hint.
///
/// # Examples
///
/// ```
/// use shikimore::domain::{ApiError, ApiErrorKind};
///
/// let err = ApiError::rate_limited("Too many requests", Some(3));
/// assert_eq!(err.to_string(), "Too many requests (retry after 3 seconds)");
///
/// let err = ApiError::new(ApiErrorKind::Http, "");
/// assert_eq!(err.to_string(), "Failed to load data");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ApiError {
    #[must_use]
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound, message)
    }

    #[must_use]
    pub fn rate_limited(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self {
            kind: ApiErrorKind::RateLimit,
            message: message.into(),
            retry_after,
        }
    }

    /// Human-readable text for the error banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        let base = if self.message.trim().is_empty() {
            GENERIC_FAILURE
        } else {
            self.message.as_str()
        };

        match (self.kind, self.retry_after) {
            (ApiErrorKind::RateLimit, Some(seconds)) => {
                format!("{base} (retry after {seconds} seconds)")
            }
            _ => base.to_string(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// A specialized `Result` for backend queries.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// The main error type for host-side operations.
///
/// # Examples
///
/// ```
/// use shikimore::domain::ShikimoreError;
///
/// fn validate() -> Result<(), ShikimoreError> {
///     Err(ShikimoreError::Config("page_limit must be between 1 and 50".to_string()))
/// }
/// assert!(validate().is_err());
/// ```
#[derive(Debug, Error)]
pub enum ShikimoreError {
    /// Reading or writing the key-value store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A backend query failed outside of the event loop (e.g. loading fixtures).
    #[error("Backend error: {0}")]
    Backend(#[from] ApiError),

    /// The event loop could not continue.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// A specialized `Result` type for host-side operations.
pub type Result<T> = std::result::Result<T, ShikimoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_without_hint_has_no_suffix() {
        let err = ApiError::rate_limited("Slow down", None);
        assert_eq!(err.user_message(), "Slow down");
    }

    #[test]
    fn retry_hint_only_applies_to_rate_limit() {
        let mut err = ApiError::new(ApiErrorKind::Api, "Boom");
        err.retry_after = Some(10);
        assert_eq!(err.user_message(), "Boom");
    }

    #[test]
    fn kind_uses_backend_wire_names() {
        let json = serde_json::to_string(&ApiError::rate_limited("x", Some(2))).unwrap();
        assert!(json.contains("\"rate_limit\""));

        let parsed: ApiError =
            serde_json::from_str(r#"{"kind":"not_found","message":"gone"}"#).unwrap();
        assert_eq!(parsed.kind, ApiErrorKind::NotFound);
        assert_eq!(parsed.retry_after, None);
    }

    #[test]
    fn api_error_converts_into_crate_error() {
        let err: ShikimoreError = ApiError::not_found("no such anime").into();
        assert_eq!(err.to_string(), "Backend error: no such anime");
    }
}
