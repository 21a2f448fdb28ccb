use serde::Serialize;
use utoipa::ToSchema;

/// Structured error response returned by every tool endpoint.
/// Agents read `error` as the message and branch on `error_code`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Human/agent-readable description of what went wrong
    pub error: String,
    /// Machine-readable error code (e.g. "not_found", "malformed_response")
    pub error_code: String,
    /// Which input field caused the error (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Offending upstream text, echoed for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
    /// Request ID for tracing and debugging
    pub request_id: String,
    /// Hint about what the correct usage looks like
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

/// Error codes used across the API
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const NOT_FOUND: &str = "not_found";
    pub const UNKNOWN_TASK: &str = "unknown_task";
    pub const UPSTREAM_ERROR: &str = "upstream_error";
    pub const MALFORMED_RESPONSE: &str = "malformed_response";
    pub const INVALID_SHAPE: &str = "invalid_shape";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const RATE_LIMITED: &str = "rate_limited";
}
