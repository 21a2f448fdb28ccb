use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

/// Build the CORS layer from the configured origin list.
///
/// - No list: any origin, any header
/// - List: only those origins (unparseable entries are skipped)
/// - Methods: GET, POST, OPTIONS
pub fn build_cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    match origins {
        None => layer.allow_origin(Any),
        Some(origins) => {
            let values: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(values)
        }
    }
}
