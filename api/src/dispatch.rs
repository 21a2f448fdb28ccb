//! Tool invocation shared by the per-tool routes and A2A task dispatch.
//!
//! Every tool takes the request's `input` value, checks its required fields and
//! answers with a `ToolResponse`. Nothing here keeps state between calls.

use inboxcal_core::tools::{ToolName, ToolResponse};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::mailbox::OutgoingEmail;
use crate::state::AppState;

pub async fn invoke(
    state: &AppState,
    tool: ToolName,
    input: &Value,
) -> Result<ToolResponse, AppError> {
    tracing::debug!(tool = %tool, "Invoking tool");
    match tool {
        ToolName::ResolveContact => resolve_contact(state, input),
        ToolName::ScheduleMeeting => schedule_meeting(state, input).await,
        ToolName::SendEmail => send_email(state, input),
        ToolName::ReplyToEmail => reply_to_email(state, input),
        ToolName::LabelEmail => label_email(state, input),
    }
}

fn resolve_contact(state: &AppState, input: &Value) -> Result<ToolResponse, AppError> {
    let fields = object_input(input)?;
    let name = required(fields, "name")?;
    let email = state.contacts.resolve(name)?;
    Ok(ToolResponse::new(ToolName::ResolveContact, &email)?)
}

async fn schedule_meeting(state: &AppState, input: &Value) -> Result<ToolResponse, AppError> {
    let raw_text = match input {
        Value::String(text) if !text.trim().is_empty() => text.as_str(),
        Value::String(_) | Value::Null => return Err(AppError::missing_field("input")),
        _ => {
            return Err(AppError::Validation {
                message: "input must be the meeting request as plain text".to_string(),
                field: Some("input".to_string()),
                docs_hint: Some(
                    "Example: {\"input\": \"Lunch with Alex tomorrow 12:00-13:00\"}".to_string(),
                ),
            });
        }
    };

    let record = state.extractor.extract_meeting(raw_text).await?;
    tracing::info!(
        attendees = record.attendees.len(),
        start = record.start_time.as_str(),
        "Meeting extracted"
    );
    Ok(ToolResponse::new(ToolName::ScheduleMeeting, &record)?)
}

fn send_email(state: &AppState, input: &Value) -> Result<ToolResponse, AppError> {
    let fields = object_input(input)?;
    let email = OutgoingEmail {
        to: required(fields, "to")?,
        subject: optional(fields, "subject")?,
        body: optional(fields, "body")?,
    };
    let ack = state.mailbox.send(&email);
    Ok(ToolResponse::new(ToolName::SendEmail, &ack)?)
}

fn reply_to_email(state: &AppState, input: &Value) -> Result<ToolResponse, AppError> {
    let fields = object_input(input)?;
    let message_id = required(fields, "messageId")?;
    let body = required(fields, "body")?;
    let ack = state.mailbox.reply(message_id, body);
    Ok(ToolResponse::new(ToolName::ReplyToEmail, &ack)?)
}

fn label_email(state: &AppState, input: &Value) -> Result<ToolResponse, AppError> {
    let fields = object_input(input)?;
    let message_id = required(fields, "messageId")?;
    let label_name = required(fields, "labelName")?;
    let ack = state.mailbox.label(message_id, label_name);
    Ok(ToolResponse::new(ToolName::LabelEmail, &ack)?)
}

fn object_input(input: &Value) -> Result<&Map<String, Value>, AppError> {
    match input {
        Value::Object(fields) => Ok(fields),
        Value::Null => Err(AppError::missing_field("input")),
        _ => Err(AppError::Validation {
            message: "input must be a JSON object".to_string(),
            field: Some("input".to_string()),
            docs_hint: None,
        }),
    }
}

/// A present, non-blank string field.
fn required<'a>(fields: &'a Map<String, Value>, field: &str) -> Result<&'a str, AppError> {
    optional(fields, field)?.ok_or_else(|| AppError::missing_field(field))
}

/// Absent, null and blank all read as `None`; any other non-string is rejected.
fn optional<'a>(
    fields: &'a Map<String, Value>,
    field: &str,
) -> Result<Option<&'a str>, AppError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(AppError::Validation {
            message: format!("Input field '{field}' must be a string"),
            field: Some(field.to_string()),
            docs_hint: None,
        }),
    }
}
