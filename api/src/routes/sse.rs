use std::convert::Infallible;

use axum::response::sse::{Event, Sse};
use axum::{Router, routing::get};
use futures::Stream;
use inboxcal_core::tools::{self, ToolDescriptor};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/sse", get(tool_feed))
}

/// Tool discovery feed: one `tool` event per catalog entry, then a single `end` event.
/// The stream closes after `end`.
#[utoipa::path(
    get,
    path = "/sse",
    responses((status = 200, description = "Tool descriptors as server-sent events", body = String, content_type = "text/event-stream")),
    tag = "discovery"
)]
pub async fn tool_feed() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events: Vec<Event> = tools::catalog()
        .iter()
        .filter_map(tool_event)
        .chain(std::iter::once(Event::default().event("end").data("end")))
        .collect();
    tracing::debug!(events = events.len(), "Serving tool discovery feed");

    Sse::new(futures::stream::iter(events.into_iter().map(Ok)))
}

fn tool_event(descriptor: &ToolDescriptor) -> Option<Event> {
    match serde_json::to_string(descriptor) {
        Ok(json) => Some(Event::default().event("tool").data(json)),
        Err(e) => {
            tracing::error!(tool = %descriptor.name, error = %e, "Skipping tool descriptor");
            None
        }
    }
}
