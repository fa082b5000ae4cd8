//! Message bodies that may carry a file
//!
//! The editor either posts plain JSON or a multipart form with the JSON in a
//! `message` part and the media in a `file` part.

use axum::{
    async_trait,
    extract::{
        multipart::{Field, MultipartError},
        FromRequest, Multipart, Request,
    },
    http::{header, StatusCode},
    Json,
};
use feed_core::MediaUpload;
use serde::de::DeserializeOwned;

use super::validated::json_rejection;
use crate::response::ApiError;

/// Multipart part holding the JSON message
pub const MESSAGE_FIELD: &str = "message";
/// Multipart part holding the media file
pub const FILE_FIELD: &str = "file";

/// A JSON message body plus an optional uploaded file
#[derive(Debug)]
pub struct MessageForm<T> {
    pub body: T,
    pub upload: Option<MediaUpload>,
}

#[async_trait]
impl<S, T> FromRequest<S> for MessageForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Json(body) = Json::<T>::from_request(req, state)
                .await
                .map_err(json_rejection)?;
            return Ok(Self { body, upload: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_body(e.body_text()))?;

        let mut body = None;
        let mut upload = None;
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            match field.name() {
                Some(MESSAGE_FIELD) => {
                    let text = field.text().await.map_err(multipart_error)?;
                    let parsed = serde_json::from_str::<T>(&text)
                        .map_err(|e| ApiError::invalid_body(format!("message part: {e}")))?;
                    body = Some(parsed);
                }
                Some(FILE_FIELD) => upload = Some(read_field(field).await?),
                _ => {}
            }
        }

        let body = body.ok_or_else(|| {
            ApiError::invalid_body(format!("multipart body needs a '{MESSAGE_FIELD}' part"))
        })?;
        Ok(Self { body, upload })
    }
}

/// Read the `file` part of a standalone upload
pub async fn read_upload(mut multipart: Multipart) -> Result<Option<MediaUpload>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(FILE_FIELD) {
            return read_field(field).await.map(Some);
        }
    }
    Ok(None)
}

async fn read_field(field: Field<'_>) -> Result<MediaUpload, ApiError> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;
    Ok(MediaUpload::new(file_name, content_type, bytes.to_vec()))
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

pub(crate) fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::invalid_body(err.body_text())
    }
}
