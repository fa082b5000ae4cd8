//! Route definitions
//!
//! The store API under `/api/messages`, standalone uploads, and the
//! viewer-facing feed under `/api/viewers`.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{health, messages, upload, viewers};
use crate::state::AppState;

/// Create the main API router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api", api_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(message_routes())
        .merge(viewer_routes())
        .route("/upload", post(upload::upload_media))
}

/// Admin store API
fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/messages",
            get(messages::list_messages)
                .post(messages::create_message)
                .patch(messages::update_message)
                .delete(messages::delete_message),
        )
        .route("/messages/:id", get(messages::get_message))
        .route("/messages/:id/counters", post(messages::apply_counters))
}

/// Viewer-facing feed
fn viewer_routes() -> Router<AppState> {
    Router::new()
        .route("/viewers/:viewer/feed", get(viewers::get_feed))
        .route(
            "/viewers/:viewer/messages/:id/reactions/:kind",
            post(viewers::toggle_reaction),
        )
        .route(
            "/viewers/:viewer/messages/:id/view",
            post(viewers::register_view),
        )
}
