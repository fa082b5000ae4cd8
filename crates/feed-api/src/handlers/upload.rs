//! Standalone media upload

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use feed_service::dto::UploadResponse;
use feed_service::MediaService;

use crate::extractors::read_upload;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Store a file and return its URL
///
/// POST /api/upload (multipart, part `file`)
pub async fn upload_media(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let multipart = multipart.map_err(|e| ApiError::invalid_body(e.body_text()))?;
    let upload = read_upload(multipart).await?;
    let response = MediaService::new(state.service_context())
        .upload(upload)
        .await?;
    Ok(Json(response))
}
