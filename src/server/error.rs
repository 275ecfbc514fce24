use crate::config::ConfigError;
use crate::types::{AgentError, ToolError};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

/// Error response of the HTTP layer, serialized as `{ "error": "<message>" }`.
///
/// Core failures are reported with a fixed message; the cause is only logged.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    body: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::bad_request(format!("Missing '{field}'"))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        Self::bad_request("Invalid JSON body")
    }
}

impl From<ConfigError> for HttpError {
    fn from(err: ConfigError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<AgentError> for HttpError {
    fn from(err: AgentError) -> Self {
        error!("Chat request failed: {:#}", anyhow::Error::new(err));
        Self::internal("Error generating response")
    }
}

impl From<ToolError> for HttpError {
    fn from(err: ToolError) -> Self {
        error!("Tool request failed: {:#}", anyhow::Error::new(err));
        Self::internal("Internal error")
    }
}
