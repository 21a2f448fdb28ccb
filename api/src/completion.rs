//! Client for an OpenAI-compatible chat-completions endpoint.
//!
//! One request per call: no retries, no streaming. The only hardening is the
//! request timeout configured on the underlying `reqwest::Client`.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::CompletionConfig;

/// Upper bound on how much of an upstream error body is kept for logs.
const MAX_ERROR_BODY_CHARS: usize = 2_000;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("OPENAI_API_KEY is not configured")]
    MissingApiKey,
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected completion envelope: {0}")]
    Envelope(String),
}

/// A single chat-style prompt.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system_prompt: &'a str,
    pub user_prompt: &'a str,
    pub temperature: f64,
}

/// Anything that turns a prompt into raw completion text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, CompletionError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
}

pub struct OpenAiCompletionClient {
    http: reqwest::Client,
    config: CompletionConfig,
}

impl OpenAiCompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn request_body<'a>(&'a self, request: &CompletionRequest<'a>) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: request.user_prompt,
                },
            ],
            temperature: request.temperature,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, CompletionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingApiKey)?;

        let response = self
            .http
            .post(self.config.api_url.clone())
            .bearer_auth(api_key)
            .json(&self.request_body(&request))
            .send()
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    timeout = e.is_timeout(),
                    error = %e,
                    "Completion request did not complete"
                );
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            tracing::warn!(
                status = status.as_u16(),
                body = %body,
                "Completion service returned non-success status"
            );
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| CompletionError::Envelope(format!("body is not JSON: {e}")))?;

        message_content(&envelope)
    }
}

/// Pull `choices[0].message.content` out of a chat-completions envelope.
fn message_content(envelope: &Value) -> Result<String, CompletionError> {
    envelope
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            CompletionError::Envelope("missing choices[0].message.content".to_string())
        })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    fn config_for(url: &str, api_key: Option<&str>) -> CompletionConfig {
        CompletionConfig {
            api_url: url.parse().expect("valid test url"),
            api_key: api_key.map(str::to_string),
            model: "gpt-4".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    fn sample_request() -> CompletionRequest<'static> {
        CompletionRequest {
            system_prompt: "Only JSON.",
            user_prompt: "Lunch with Alex tomorrow at noon",
            temperature: 0.3,
        }
    }

    #[test]
    fn message_content_reads_first_choice() {
        let envelope = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "{\"ok\":true}"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        });
        assert_eq!(
            message_content(&envelope).expect("content present"),
            "{\"ok\":true}"
        );
    }

    #[test]
    fn message_content_rejects_incomplete_envelopes() {
        for envelope in [
            json!({}),
            json!({"choices": []}),
            json!({"choices": [{"message": {}}]}),
            json!({"choices": [{"message": {"content": null}}]}),
        ] {
            assert!(matches!(
                message_content(&envelope),
                Err(CompletionError::Envelope(_))
            ));
        }
    }

    #[tokio::test]
    async fn complete_posts_chat_request_and_returns_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4",
                "temperature": 0.3,
                "messages": [
                    {"role": "system", "content": "Only JSON."},
                    {"role": "user", "content": "Lunch with Alex tomorrow at noon"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"choices": [{"message": {"role": "assistant", "content": "  {}  "}}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let client = OpenAiCompletionClient::new(config_for(
            &format!("{}/v1/chat/completions", server.url()),
            Some("sk-test"),
        ))
        .expect("client builds");

        let text = client.complete(sample_request()).await.expect("completion");
        assert_eq!(text, "  {}  ");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn complete_maps_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
            .create_async()
            .await;

        let client = OpenAiCompletionClient::new(config_for(
            &format!("{}/v1/chat/completions", server.url()),
            Some("sk-wrong"),
        ))
        .expect("client builds");

        match client.complete(sample_request()).await {
            Err(CompletionError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Incorrect API key"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_maps_malformed_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"id": "cmpl-1", "choices": []}"#)
            .create_async()
            .await;

        let client = OpenAiCompletionClient::new(config_for(
            &format!("{}/v1/chat/completions", server.url()),
            Some("sk-test"),
        ))
        .expect("client builds");

        assert!(matches!(
            client.complete(sample_request()).await,
            Err(CompletionError::Envelope(_))
        ));
    }

    #[tokio::test]
    async fn complete_without_api_key_fails_before_sending() {
        let client = OpenAiCompletionClient::new(config_for(
            "http://127.0.0.1:9/v1/chat/completions",
            None,
        ))
        .expect("client builds");

        assert!(matches!(
            client.complete(sample_request()).await,
            Err(CompletionError::MissingApiKey)
        ));
    }
}
