use std::sync::Arc;

use axum::{Router, routing::get};

use crate::{
    handlers::{events as event_handlers, health as health_handlers},
    state::AppState,
};

pub const EVENTS_PATH: &str = "/v3/OS-REVOKE/events";

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(EVENTS_PATH, get(event_handlers::list_events))
        .route("/healthz", get(health_handlers::healthz))
        .with_state(state)
}
