use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use inboxcal_core::contacts::DirectoryError;
use inboxcal_core::error::{self, ApiError};
use inboxcal_core::tools::ToolName;

use crate::extraction::ExtractionError;

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Missing or mistyped input (400)
    Validation {
        message: String,
        field: Option<String>,
        docs_hint: Option<String>,
    },
    /// Lookup miss (404)
    NotFound { message: String },
    /// A2A task name that maps to no tool (404)
    UnknownTask { task: String },
    /// Scheduling failure: upstream (500) or unusable completion (400)
    Extraction(ExtractionError),
    /// Internal error (500)
    Internal(String),
}

impl AppError {
    pub fn missing_field(field: &str) -> Self {
        AppError::Validation {
            message: format!("Missing required input field '{field}'"),
            field: Some(field.to_string()),
            docs_hint: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } | AppError::UnknownTask { .. } => StatusCode::NOT_FOUND,
            AppError::Extraction(ExtractionError::Upstream(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Extraction(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let request_id = uuid::Uuid::now_v7().to_string();

        let api_error = match self {
            AppError::Validation {
                message,
                field,
                docs_hint,
            } => ApiError {
                error: message,
                error_code: error::codes::VALIDATION_FAILED.to_string(),
                field,
                raw: None,
                request_id,
                docs_hint,
            },
            AppError::NotFound { message } => ApiError {
                error: message,
                error_code: error::codes::NOT_FOUND.to_string(),
                field: None,
                raw: None,
                request_id,
                docs_hint: None,
            },
            AppError::UnknownTask { task } => ApiError {
                error: format!("Unknown task '{task}'"),
                error_code: error::codes::UNKNOWN_TASK.to_string(),
                field: Some("task".to_string()),
                raw: None,
                request_id,
                docs_hint: Some(format!(
                    "Supported tasks: {}",
                    ToolName::ALL.map(|tool| tool.as_str()).join(", ")
                )),
            },
            AppError::Extraction(ExtractionError::Upstream(err)) => {
                tracing::error!(request_id = %request_id, error = %err, "Completion call failed");
                ApiError {
                    error: "Completion service failed".to_string(),
                    error_code: error::codes::UPSTREAM_ERROR.to_string(),
                    field: None,
                    raw: None,
                    request_id,
                    docs_hint: None,
                }
            }
            AppError::Extraction(ExtractionError::MalformedResponse { raw }) => ApiError {
                error: "Completion service returned text that is not JSON".to_string(),
                error_code: error::codes::MALFORMED_RESPONSE.to_string(),
                field: None,
                raw: Some(serde_json::Value::String(raw)),
                request_id,
                docs_hint: None,
            },
            AppError::Extraction(ExtractionError::InvalidShape { reason, raw }) => ApiError {
                error: format!("Completion did not describe a valid meeting: {reason}"),
                error_code: error::codes::INVALID_SHAPE.to_string(),
                field: None,
                raw: Some(serde_json::Value::String(raw)),
                request_id,
                docs_hint: Some(
                    "Rephrase the request with an explicit time range and attendee emails."
                        .to_string(),
                ),
            },
            AppError::Internal(msg) => {
                tracing::error!(request_id = %request_id, "Internal error: {}", msg);
                ApiError {
                    error: "An internal error occurred".to_string(),
                    error_code: error::codes::INTERNAL_ERROR.to_string(),
                    field: None,
                    raw: None,
                    request_id,
                    docs_hint: None,
                }
            }
        };

        (status, Json(api_error)).into_response()
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound { .. } => AppError::NotFound {
                message: "Contact not found".to_string(),
            },
            DirectoryError::InvalidSource(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::Extraction(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("serialization failed: {err}"))
    }
}
