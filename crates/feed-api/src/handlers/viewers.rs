//! Viewer-facing handlers
//!
//! The viewer id in the path keys every piece of per-viewer state.

use axum::{
    extract::{Path, State},
    Json,
};
use feed_service::dto::{FeedResponse, ReactionToggleResponse, ViewResponse};
use feed_service::ViewerService;

use crate::extractors::{ReactionPath, ViewerMessagePath, ViewerPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Feed grouped by day, with this viewer's reactions and view marks
///
/// GET /api/viewers/:viewer/feed
pub async fn get_feed(
    State(state): State<AppState>,
    Path(path): Path<ViewerPath>,
) -> ApiResult<Json<FeedResponse>> {
    let viewer = path.viewer_id()?;
    let feed = ViewerService::new(state.service_context()).feed(viewer).await?;
    Ok(Json(feed))
}

/// Toggle a reaction
///
/// POST /api/viewers/:viewer/messages/:id/reactions/:kind
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Path(path): Path<ReactionPath>,
) -> ApiResult<Json<ReactionToggleResponse>> {
    let viewer = path.viewer_id()?;
    let message_id = path.message_id()?;
    let kind = path.kind()?;

    let response = ViewerService::new(state.service_context())
        .toggle_reaction(viewer, message_id, kind)
        .await?;
    Ok(Json(response))
}

/// Register a view
///
/// POST /api/viewers/:viewer/messages/:id/view
pub async fn register_view(
    State(state): State<AppState>,
    Path(path): Path<ViewerMessagePath>,
) -> ApiResult<Json<ViewResponse>> {
    let viewer = path.viewer_id()?;
    let message_id = path.message_id()?;

    let response = ViewerService::new(state.service_context())
        .register_view(viewer, message_id)
        .await?;
    Ok(Json(response))
}
