//! HTTP API module
//!
//! Local control surface standing in for the tray menu: the same start/stop
//! and skip-rest requests, plus status and settings.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start-stop", post(start_stop_handler))
        .route("/skip-rest", post(skip_rest_handler))
        .route("/notification/action", post(notification_action_handler))
        .route("/status", get(status_handler))
        .route("/settings", get(get_settings_handler).patch(update_settings_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
