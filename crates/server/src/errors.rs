use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use service::errors::ServiceError;

/// Either a single human-readable message or one per failed constraint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

/// JSON error envelope: `{"message": ..., "error": ..., "statusCode": ...}`.
#[derive(Debug, Clone)]
pub struct JsonApiError {
    status: StatusCode,
    error: &'static str,
    message: ErrorMessage,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a ErrorMessage,
    error: &'a str,
    #[serde(rename = "statusCode")]
    status_code: u16,
}

impl JsonApiError {
    /// `message` falls back to the `error` label when absent.
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        let message = ErrorMessage::One(message.unwrap_or_else(|| error.to_string()));
        Self { status, error, message }
    }

    pub fn validation(messages: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Bad Request",
            message: ErrorMessage::Many(messages),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &ErrorMessage {
        &self.message
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => {
                JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(err.to_string()))
            }
            // already logged by the service
            ServiceError::DuplicateName(_) => {
                JsonApiError::new(StatusCode::BAD_REQUEST, "Bad Request", Some(err.to_string()))
            }
            ServiceError::Upstream(_) => {
                error!(error = %err, "upstream failure");
                JsonApiError::new(StatusCode::BAD_GATEWAY, "Bad Gateway", Some(err.to_string()))
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: &self.message,
            error: self.error,
            status_code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}
