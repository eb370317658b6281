//! Stateless request builder and response parser for the engine API.
//!
//! # Design
//! `RecommClient` holds only the endpoint, database id and secret token, and
//! carries no mutable state between calls. `build*` turns a `Request` into a
//! signed `HttpRequest`; the `parse_*` methods consume an `HttpResponse`. The
//! caller executes the actual HTTP round-trip in between, keeping the core
//! deterministic and free of I/O dependencies.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::requests::{encode_query, Request};
use crate::signing::sign_path;
use crate::types::BatchOutcome;

/// Default public endpoint of the hosted engine.
pub const DEFAULT_BASE_URL: &str = "https://rapi.recombee.com";

/// Synchronous, stateless client for the engine API.
#[derive(Debug, Clone)]
pub struct RecommClient {
    base_url: String,
    database_id: String,
    token: String,
}

impl RecommClient {
    pub fn new(base_url: &str, database_id: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            database_id: database_id.to_string(),
            token: token.to_string(),
        }
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    /// Build a request signed with the current time.
    pub fn build(&self, request: &Request) -> Result<HttpRequest, ApiError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.build_at(request, now)
    }

    /// Build a request signed as if sent at `timestamp` (unix seconds).
    pub fn build_at(&self, request: &Request, timestamp: u64) -> Result<HttpRequest, ApiError> {
        let mut path = format!("/{}{}", urlencoding::encode(&self.database_id), request.path());
        let query = encode_query(&request.query_params()?);
        if !query.is_empty() {
            path.push('?');
            path.push_str(&query);
        }
        let signed = sign_path(&path, &self.token, timestamp);

        let body = request
            .body_params()?
            .map(|params| serde_json::to_string(&params))
            .transpose()
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;

        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        Ok(HttpRequest {
            method: request.method(),
            path: format!("{}{}", self.base_url, signed),
            headers,
            body,
        })
    }

    /// Accept the `"ok"` answer of a write operation.
    pub fn parse_ack(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    /// Decode the JSON answer of a read operation.
    pub fn parse_json<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Decode a batch answer: one outcome per sub-request, in order.
    ///
    /// A failed sub-request does not fail the batch; inspect each outcome.
    pub fn parse_batch(&self, response: HttpResponse) -> Result<Vec<BatchOutcome>, ApiError> {
        self.parse_json(response)
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::from_status(response.status, &response.body))
}
