use std::sync::Arc;

use inboxcal_core::meeting::{MeetingRecord, ShapeError};
use serde_json::Value;

use crate::completion::{CompletionClient, CompletionError, CompletionRequest};

/// Sampling temperature for meeting extraction.
pub const EXTRACTION_TEMPERATURE: f64 = 0.3;

const MEETING_SYSTEM_PROMPT: &str = "You only return valid JSON objects with meeting info. \
     Never add explanations, prose or markdown code fences.";

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Upstream(#[from] CompletionError),
    #[error("completion response was not valid JSON")]
    MalformedResponse { raw: String },
    #[error("completion JSON is not a valid meeting: {reason}")]
    InvalidShape { reason: ShapeError, raw: String },
}

/// Turns free text into a validated `MeetingRecord` through one completion call.
pub struct MeetingExtractor {
    client: Arc<dyn CompletionClient>,
}

impl MeetingExtractor {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn extract_meeting(&self, raw_text: &str) -> Result<MeetingRecord, ExtractionError> {
        let prompt = meeting_prompt(raw_text);
        let raw = self
            .client
            .complete(CompletionRequest {
                system_prompt: MEETING_SYSTEM_PROMPT,
                user_prompt: &prompt,
                temperature: EXTRACTION_TEMPERATURE,
            })
            .await?;

        let parsed: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(err) => {
                tracing::info!(
                    error = %err,
                    raw_len = raw.len(),
                    "Completion response is not JSON"
                );
                return Err(ExtractionError::MalformedResponse { raw });
            }
        };

        MeetingRecord::from_value(&parsed).map_err(|reason| {
            tracing::info!(reason = %reason, "Completion JSON failed meeting validation");
            ExtractionError::InvalidShape { reason, raw }
        })
    }
}

/// The user prompt for meeting extraction. Deterministic in `raw_text`.
pub fn meeting_prompt(raw_text: &str) -> String {
    format!(
        "Extract a meeting object from this input:\n\n\"{raw_text}\"\n\n\
         Respond ONLY with one valid JSON object and nothing else, shaped exactly like:\n\
         {{\n  \"summary\": \"...\",\n  \"startTime\": \"2025-04-12T18:00:00\",\n  \
         \"endTime\": \"2025-04-12T18:30:00\",\n  \"attendees\": [\"alina@example.com\"]\n}}"
    )
}
