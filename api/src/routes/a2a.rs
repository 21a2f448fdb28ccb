use axum::extract::State;
use axum::{Json, Router, routing::post};
use inboxcal_core::tools::{ToolName, ToolResponse};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::dispatch;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

const INVALID_PAYLOAD: &str = "Invalid A2A payload";

/// Agent-to-agent envelope: `{"a2a.performTask": {"task": ..., "input": ...}}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct A2aRequest {
    #[serde(rename = "a2a.performTask", default)]
    pub perform_task: Option<PerformTask>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PerformTask {
    #[schema(example = "sendEmail")]
    pub task: Option<String>,
    #[schema(value_type = Object)]
    pub input: Option<serde_json::Value>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/a2a", post(perform_task))
}

fn invalid_payload(field: &str) -> AppError {
    AppError::Validation {
        message: INVALID_PAYLOAD.to_string(),
        field: Some(field.to_string()),
        docs_hint: Some(
            "Expected {\"a2a.performTask\": {\"task\": \"<toolName>\", \"input\": ...}}".to_string(),
        ),
    }
}

/// Run the tool named by `task` with `input`, same as calling `/tools/{task}` directly
#[utoipa::path(
    post,
    path = "/a2a",
    request_body = A2aRequest,
    responses(
        (status = 200, description = "Task performed", body = ToolResponse),
        (status = 400, description = "Invalid A2A payload or tool input", body = inboxcal_core::error::ApiError),
        (status = 404, description = "Unknown task", body = inboxcal_core::error::ApiError)
    ),
    tag = "a2a"
)]
pub async fn perform_task(
    State(state): State<AppState>,
    AppJson(req): AppJson<A2aRequest>,
) -> Result<Json<ToolResponse>, AppError> {
    let envelope = req
        .perform_task
        .ok_or_else(|| invalid_payload("a2a.performTask"))?;
    let task = envelope
        .task
        .filter(|task| !task.trim().is_empty())
        .ok_or_else(|| invalid_payload("task"))?;
    let input = envelope
        .input
        .filter(|input| !input.is_null())
        .ok_or_else(|| invalid_payload("input"))?;

    let tool: ToolName = task
        .trim()
        .parse()
        .map_err(|_| AppError::UnknownTask { task: task.clone() })?;

    tracing::info!(task = %tool, "A2A task dispatched");
    dispatch::invoke(&state, tool, &input).await.map(Json)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::extraction::tests::FixedCompletion;
    use crate::routes::test_support::{app, app_with, post_json};

    #[tokio::test]
    async fn send_email_task_matches_direct_call() {
        let input = json!({"to": "x@y.com", "subject": "Hello"});
        let (status, via_a2a) = post_json(
            app(),
            "/a2a",
            json!({"a2a.performTask": {"task": "sendEmail", "input": input.clone()}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(via_a2a["output"].as_str().expect("ack").contains("x@y.com"));

        let (_, direct) = post_json(app(), "/tools/sendEmail", json!({"input": input})).await;
        assert_eq!(via_a2a, direct);
    }

    #[tokio::test]
    async fn schedule_task_passes_text_input() {
        let reply = r#"{"summary":"Sync","startTime":"2025-05-01T09:00:00Z","endTime":"2025-05-01T09:30:00Z","attendees":["sarah@company.com"]}"#;
        let (status, body) = post_json(
            app_with(FixedCompletion::text(reply)),
            "/a2a",
            json!({"a2a.performTask": {"task": "scheduleMeeting", "input": "sync with sarah at 9"}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tool_name"], "scheduleMeeting");
        assert_eq!(body["output"]["endTime"], "2025-05-01T09:30:00Z");
    }

    #[tokio::test]
    async fn missing_envelope_parts_are_invalid_payload() {
        for payload in [
            json!({}),
            json!({"a2a.performTask": {"input": {"to": "x@y.com"}}}),
            json!({"a2a.performTask": {"task": "sendEmail"}}),
            json!({"a2a.performTask": {"task": "", "input": {}}}),
        ] {
            let (status, body) = post_json(app(), "/a2a", payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Invalid A2A payload");
        }
    }

    #[tokio::test]
    async fn unknown_task_field_is_named_in_error() {
        let (status, body) = post_json(
            app(),
            "/a2a",
            json!({"a2a.performTask": {"tsak": "sendEmail", "input": {"to": "x@y.com"}}}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "validation_failed");
        assert_eq!(body["field"], "tsak");
    }

    #[tokio::test]
    async fn unknown_task_is_404() {
        let (status, body) = post_json(
            app(),
            "/a2a",
            json!({"a2a.performTask": {"task": "bookFlight", "input": {}}}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error_code"], "unknown_task");
    }

    #[tokio::test]
    async fn tool_input_errors_pass_through() {
        let (status, body) = post_json(
            app(),
            "/a2a",
            json!({"a2a.performTask": {"task": "resolveContact", "input": {"name": "nobody"}}}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Contact not found");
    }
}
