//! Batch endpoint: replays each sub-request against the API router, in
//! order, and collects one `{code, json}` outcome per sub-request.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Method, Request},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::store::{EngineError, Values};

const MAX_BATCH_SIZE: usize = 10_000;

#[derive(Debug, Deserialize)]
pub struct BatchBody {
    pub requests: Vec<SubRequest>,
}

#[derive(Debug, Deserialize)]
pub struct SubRequest {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub params: Values,
}

impl SubRequest {
    /// POST parameters travel as the JSON body, all others in the query.
    fn into_http(self, db: &str) -> Result<Request<Body>, EngineError> {
        let method = Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| EngineError::BadRequest(format!("unknown method {}", self.method)))?;
        if !self.path.starts_with('/') {
            return Err(EngineError::BadRequest(format!("path {} must start with /", self.path)));
        }
        let mut uri = format!("/{}{}", urlencoding::encode(db), self.path);
        let builder = Request::builder().method(method.clone());
        let request = if method == Method::POST {
            builder
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(Value::Object(self.params).to_string()))
        } else {
            let query = encode_query(&self.params);
            if !query.is_empty() {
                uri.push('?');
                uri.push_str(&query);
            }
            builder.uri(uri).body(Body::empty())
        };
        request.map_err(|e| EngineError::BadRequest(e.to_string()))
    }
}

pub async fn execute(
    State(api): State<Router>,
    Path(db): Path<String>,
    Json(body): Json<BatchBody>,
) -> Result<Json<Vec<Value>>, EngineError> {
    if body.requests.len() > MAX_BATCH_SIZE {
        return Err(EngineError::BadRequest(format!(
            "batch holds {} requests, the limit is {MAX_BATCH_SIZE}",
            body.requests.len()
        )));
    }
    tracing::debug!(database = %db, size = body.requests.len(), "executing batch");

    let mut outcomes = Vec::with_capacity(body.requests.len());
    for sub in body.requests {
        let request = match sub.into_http(&db) {
            Ok(request) => request,
            Err(err) => {
                outcomes.push(json!({"code": err.status().as_u16(), "json": err_body(&err)}));
                continue;
            }
        };
        let response = match api.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        let code = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| EngineError::BadRequest(e.to_string()))?;
        let json = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        outcomes.push(json!({"code": code, "json": json}));
    }
    Ok(Json(outcomes))
}

fn err_body(err: &EngineError) -> Value {
    let message = match err {
        EngineError::BadRequest(m) | EngineError::NotFound(m) | EngineError::Conflict(m) => m,
    };
    json!({"statusCode": err.status().as_u16(), "message": message})
}

fn encode_query(params: &Values) -> String {
    params
        .iter()
        .filter_map(|(key, value)| {
            render(value).map(|v| format!("{}={}", urlencoding::encode(key), urlencoding::encode(&v)))
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(items.iter().filter_map(render).collect::<Vec<_>>().join(",")),
        other => Some(other.to_string()),
    }
}
