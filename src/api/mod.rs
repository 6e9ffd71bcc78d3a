//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and request/response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/session", post(create_session_handler).delete(dispose_session_handler))
        .route("/session/plan", post(create_plan_session_handler))
        .route("/session/start", post(start_handler))
        .route("/session/pause", post(pause_handler))
        .route("/session/resume", post(resume_handler))
        .route("/session/advance", post(advance_handler))
        .route("/session/skip", post(skip_handler))
        .route("/session/finish", post(finish_handler))
        .route("/sets", post(open_sets_handler).get(get_sets_handler))
        .route("/sets/:set_number/complete", post(complete_set_handler))
        .route("/sets/:set_number/weight", put(set_weight_handler))
        .route("/preferences", get(get_preferences_handler))
        .route("/preferences/:key", put(set_preference_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
