//! Error types for the engine client.
//!
//! # Design
//! The engine answers failures with an HTTP status and a JSON body carrying a
//! `message`. The three statuses callers branch on (400 invalid input, 404
//! missing entity, 409 duplicate) get dedicated variants. Every other non-2xx
//! response lands in `HttpError` with the status for debugging.

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by `RecommClient` and by every adapter operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400: the engine rejected an id, timestamp, rating or parameter.
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// 404: the referenced item, user, property or interaction does not exist.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// 409: the entity or interaction already exists.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The transport deadline elapsed before the engine answered.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure (DNS, TLS, reset, unreadable body).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request parameters could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    /// Map a non-success status and its body to the matching variant.
    ///
    /// The message is the `message` field of the engine's JSON error body, or
    /// the raw body when it is not JSON.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.message)
            .unwrap_or_else(|_| body.to_string());
        match status {
            400 => ApiError::BadRequest { message },
            404 => ApiError::NotFound { message },
            409 => ApiError::Conflict { message },
            _ => ApiError::HttpError { status, message },
        }
    }

    /// HTTP status the engine answered with, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest { .. } => Some(400),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Conflict { .. } => Some(409),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_error_body_supplies_message() {
        let err = ApiError::from_status(404, r#"{"statusCode":404,"message":"Item nope not found"}"#);
        match err {
            ApiError::NotFound { message } => assert_eq!(message, "Item nope not found"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn plain_body_is_kept_verbatim() {
        let err = ApiError::from_status(503, "upstream unavailable");
        assert!(matches!(err, ApiError::HttpError { status: 503, ref message } if message == "upstream unavailable"));
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn dedicated_statuses() {
        assert!(matches!(ApiError::from_status(400, ""), ApiError::BadRequest { .. }));
        assert!(matches!(ApiError::from_status(409, ""), ApiError::Conflict { .. }));
        assert_eq!(ApiError::from_status(409, "").status(), Some(409));
        assert_eq!(ApiError::Timeout.status(), None);
    }
}
