use axum::extract::State;
use axum::{Json, Router, routing::post};
use inboxcal_core::tools::{ToolName, ToolResponse};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::dispatch;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

/// Body of every `/tools/*` call. `input` is an object for the email and
/// contact tools and free text for `scheduleMeeting`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ToolRequest {
    #[serde(default)]
    #[schema(value_type = Object, example = json!({"name": "alex"}))]
    pub input: serde_json::Value,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tools/resolveContact", post(resolve_contact))
        .route("/tools/sendEmail", post(send_email))
        .route("/tools/replyToEmail", post(reply_to_email))
        .route("/tools/labelEmail", post(label_email))
}

/// The completion-backed tool, kept apart so it can carry its own rate limit.
pub fn scheduling_router() -> Router<AppState> {
    Router::new().route("/tools/scheduleMeeting", post(schedule_meeting))
}

async fn call(
    state: &AppState,
    tool: ToolName,
    req: ToolRequest,
) -> Result<Json<ToolResponse>, AppError> {
    dispatch::invoke(state, tool, &req.input).await.map(Json)
}

/// Map a contact name to its email address
#[utoipa::path(
    post,
    path = "/tools/resolveContact",
    request_body = ToolRequest,
    responses(
        (status = 200, description = "Contact resolved", body = ToolResponse),
        (status = 400, description = "Missing name", body = inboxcal_core::error::ApiError),
        (status = 404, description = "Unknown contact", body = inboxcal_core::error::ApiError)
    ),
    tag = "tools"
)]
pub async fn resolve_contact(
    State(state): State<AppState>,
    AppJson(req): AppJson<ToolRequest>,
) -> Result<Json<ToolResponse>, AppError> {
    call(&state, ToolName::ResolveContact, req).await
}

/// Turn a free-text meeting request into a validated meeting record
#[utoipa::path(
    post,
    path = "/tools/scheduleMeeting",
    request_body = ToolRequest,
    responses(
        (status = 200, description = "Meeting extracted", body = ToolResponse),
        (status = 400, description = "Missing input or unusable completion", body = inboxcal_core::error::ApiError),
        (status = 429, description = "Rate limited", body = inboxcal_core::error::ApiError),
        (status = 500, description = "Completion service failed", body = inboxcal_core::error::ApiError)
    ),
    tag = "tools"
)]
pub async fn schedule_meeting(
    State(state): State<AppState>,
    AppJson(req): AppJson<ToolRequest>,
) -> Result<Json<ToolResponse>, AppError> {
    call(&state, ToolName::ScheduleMeeting, req).await
}

/// Acknowledge an outgoing email
#[utoipa::path(
    post,
    path = "/tools/sendEmail",
    request_body = ToolRequest,
    responses(
        (status = 200, description = "Email acknowledged", body = ToolResponse),
        (status = 400, description = "Missing recipient", body = inboxcal_core::error::ApiError)
    ),
    tag = "tools"
)]
pub async fn send_email(
    State(state): State<AppState>,
    AppJson(req): AppJson<ToolRequest>,
) -> Result<Json<ToolResponse>, AppError> {
    call(&state, ToolName::SendEmail, req).await
}

/// Acknowledge a reply to an existing message
#[utoipa::path(
    post,
    path = "/tools/replyToEmail",
    request_body = ToolRequest,
    responses(
        (status = 200, description = "Reply acknowledged", body = ToolResponse),
        (status = 400, description = "Missing messageId or body", body = inboxcal_core::error::ApiError)
    ),
    tag = "tools"
)]
pub async fn reply_to_email(
    State(state): State<AppState>,
    AppJson(req): AppJson<ToolRequest>,
) -> Result<Json<ToolResponse>, AppError> {
    call(&state, ToolName::ReplyToEmail, req).await
}

/// Acknowledge a label applied to a message
#[utoipa::path(
    post,
    path = "/tools/labelEmail",
    request_body = ToolRequest,
    responses(
        (status = 200, description = "Label acknowledged", body = ToolResponse),
        (status = 400, description = "Missing messageId or labelName", body = inboxcal_core::error::ApiError)
    ),
    tag = "tools"
)]
pub async fn label_email(
    State(state): State<AppState>,
    AppJson(req): AppJson<ToolRequest>,
) -> Result<Json<ToolResponse>, AppError> {
    call(&state, ToolName::LabelEmail, req).await
}
