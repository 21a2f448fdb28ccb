use axum::http::{HeaderValue, Response, StatusCode};
use inboxcal_core::error::{ApiError, codes};
use tower_governor::{
    GovernorError, GovernorLayer, governor::GovernorConfigBuilder,
    key_extractor::SmartIpKeyExtractor,
};

use crate::config::RateLimitSettings;

pub type RateLimitLayer =
    GovernorLayer<SmartIpKeyExtractor, governor::middleware::NoOpMiddleware, axum::body::Body>;

/// Per-IP limit for the routes that call the completion service.
///
/// Returns `None` when the settings cannot form a valid quota (zero burst or
/// zero replenish period).
pub fn schedule_layer(settings: &RateLimitSettings) -> Option<RateLimitLayer> {
    if settings.burst == 0 || settings.replenish.is_zero() {
        return None;
    }
    let config = GovernorConfigBuilder::default()
        .period(settings.replenish)
        .burst_size(settings.burst)
        .key_extractor(SmartIpKeyExtractor)
        .finish()?;
    Some(GovernorLayer::new(config).error_handler(json_error_handler))
}

/// Renders governor rejections in the `ApiError` shape with a Retry-After header.
fn json_error_handler(err: GovernorError) -> Response<axum::body::Body> {
    let (status, retry_after, message) = match err {
        GovernorError::TooManyRequests { wait_time, .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            Some(wait_time),
            format!("Too many requests. Retry after {wait_time} seconds."),
        ),
        GovernorError::UnableToExtractKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
            "Unable to determine client identity for rate limiting".to_string(),
        ),
        GovernorError::Other { code, msg, .. } => {
            (code, None, msg.unwrap_or_default().to_string())
        }
    };

    let body = ApiError {
        error: message,
        error_code: codes::RATE_LIMITED.to_string(),
        field: None,
        raw: None,
        request_id: uuid::Uuid::now_v7().to_string(),
        docs_hint: None,
    };
    let json = serde_json::to_string(&body).unwrap_or_else(|_| "{}".to_string());

    let mut response = Response::new(axum::body::Body::from(json));
    *response.status_mut() = status;
    response.headers_mut().insert(
        axum::http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if let Some(seconds) = retry_after {
        response
            .headers_mut()
            .insert(axum::http::header::RETRY_AFTER, HeaderValue::from(seconds));
    }
    response
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn zero_burst_disables_limit() {
        let settings = RateLimitSettings {
            burst: 0,
            replenish: Duration::from_secs(6),
        };
        assert!(schedule_layer(&settings).is_none());
    }

    #[test]
    fn valid_settings_build_a_layer() {
        let settings = RateLimitSettings {
            burst: 10,
            replenish: Duration::from_secs(6),
        };
        assert!(schedule_layer(&settings).is_some());
    }

    #[tokio::test]
    async fn rejection_uses_api_error_shape() {
        let response = json_error_handler(GovernorError::TooManyRequests {
            wait_time: 4,
            headers: None,
        });
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok()),
            Some("4")
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["error_code"], "rate_limited");
        assert!(body["request_id"].is_string());
    }
}
