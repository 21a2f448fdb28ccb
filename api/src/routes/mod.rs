pub mod a2a;
pub mod health;
pub mod sse;
pub mod tools;

use axum::Router;

use crate::config::RateLimitSettings;
use crate::middleware::rate_limit;
use crate::state::AppState;

/// Every public route. Routes that reach the completion service carry the
/// per-IP limit when one is configured.
pub fn api_router(schedule_limit: Option<&RateLimitSettings>) -> Router<AppState> {
    let limited = || schedule_limit.and_then(rate_limit::schedule_layer);

    let mut scheduling = tools::scheduling_router();
    let mut delegation = a2a::router();
    if let Some(layer) = limited() {
        scheduling = scheduling.layer(layer);
    }
    if let Some(layer) = limited() {
        delegation = delegation.layer(layer);
    }

    Router::new()
        .merge(health::router())
        .merge(sse::router())
        .merge(tools::router())
        .merge(scheduling)
        .merge(delegation)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use inboxcal_core::contacts::ContactDirectory;
    use tower::ServiceExt;

    use crate::completion::CompletionError;
    use crate::extraction::tests::FixedCompletion;
    use crate::state::AppState;

    pub fn app_with(completion: FixedCompletion) -> Router {
        super::api_router(None).with_state(AppState::new(
            ContactDirectory::builtin(),
            Arc::new(completion),
        ))
    }

    /// App whose completion service is never expected to answer.
    pub fn app() -> Router {
        app_with(FixedCompletion::failing(CompletionError::MissingApiKey))
    }

    pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn post_json(
        app: Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        post_json_from(app, uri, body, None).await
    }

    /// POST with an optional `x-forwarded-for` client address.
    pub async fn post_json_from(
        app: Router,
        uri: &str,
        body: serde_json::Value,
        forwarded_for: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(addr) = forwarded_for {
            request = request.header("x-forwarded-for", addr);
        }
        let response = app
            .oneshot(
                request
                    .body(Body::from(body.to_string()))
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        (
            status,
            serde_json::from_slice(&bytes).expect("response body is JSON"),
        )
    }
}
