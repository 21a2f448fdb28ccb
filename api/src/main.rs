use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Json, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

mod completion;
mod config;
mod dispatch;
mod error;
mod extract;
mod extraction;
mod mailbox;
mod middleware;
mod routes;
mod state;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inbox & Calendar Tool Server",
        version = "0.1.0",
        description = "Email and calendar tools for AI agents: contact lookup, meeting extraction, email actions, A2A dispatch and an SSE discovery feed."
    ),
    paths(
        routes::health::liveness,
        routes::health::health_check,
        routes::sse::tool_feed,
        routes::tools::resolve_contact,
        routes::tools::schedule_meeting,
        routes::tools::send_email,
        routes::tools::reply_to_email,
        routes::tools::label_email,
        routes::a2a::perform_task,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::tools::ToolRequest,
        routes::a2a::A2aRequest,
        routes::a2a::PerformTask,
        inboxcal_core::tools::ToolResponse,
        inboxcal_core::meeting::MeetingRecord,
        inboxcal_core::error::ApiError,
    )),
    tags(
        (name = "system", description = "Liveness and health"),
        (name = "discovery", description = "Tool catalog feed"),
        (name = "tools", description = "Direct tool calls"),
        (name = "a2a", description = "Agent-to-agent task dispatch"),
    )
)]
struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn app(state: state::AppState, config: &config::Config) -> Router {
    Router::new()
        .route("/api-doc/openapi.json", get(openapi_json))
        .merge(routes::api_router(config.schedule_rate_limit.as_ref()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::cors::build_cors_layer(
                    config.cors_origins.as_deref(),
                )),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inboxcal_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "Configuration loaded");

    let contacts = match config.load_contacts() {
        Ok(contacts) => contacts,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load contacts");
            std::process::exit(1);
        }
    };

    if config.completion.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; scheduleMeeting will fail until it is");
    }
    if config.schedule_rate_limit.is_none() {
        tracing::info!("Rate limiting for completion-backed routes is disabled");
    }

    let completion = match completion::OpenAiCompletionClient::new(config.completion.clone()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build completion client");
            std::process::exit(1);
        }
    };

    tracing::info!(contacts = contacts.len(), "Contact directory ready");
    let app_state = state::AppState::new(contacts, Arc::new(completion));
    let app = app(app_state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!("MCP tool server listening on {}", addr);

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
