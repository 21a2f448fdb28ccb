//! JSON extractor that turns axum's plain-text rejections into `AppError` bodies.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::error::AppError;

/// Drop-in replacement for `axum::Json<T>` in handler signatures.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}

pub fn map_json_rejection(rejection: JsonRejection) -> AppError {
    let body_text = rejection.body_text();
    let field = field_from_serde_message(&body_text).unwrap_or_else(|| "body".to_string());

    AppError::Validation {
        message: format!("Invalid request body: {body_text}"),
        field: Some(field),
        docs_hint: Some(
            "Send a JSON body with Content-Type: application/json, e.g. {\"input\": {...}}. \
             Schemas are listed at GET /api-doc/openapi.json."
                .to_string(),
        ),
    }
}

/// Pull the field name out of serde's "missing field `x`" / "unknown field `x`" messages.
fn field_from_serde_message(msg: &str) -> Option<String> {
    ["missing field `", "unknown field `"].iter().find_map(|marker| {
        let start = msg.find(marker)? + marker.len();
        let rest = &msg[start..];
        rest.find('`').map(|end| rest[..end].to_string())
    })
}
