//! Path parameter extractors
//!
//! Ids arrive as raw strings so a malformed one becomes a 400 with our error
//! body instead of axum's plain-text rejection.

use feed_core::{MessageId, ReactionKind, ViewerId};
use serde::Deserialize;

use crate::response::ApiError;

fn message_id(raw: &str) -> Result<MessageId, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::invalid_path(format!("message id '{raw}': {e}")))
}

fn viewer_id(raw: &str) -> Result<ViewerId, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::invalid_path(format!("viewer id '{raw}': {e}")))
}

/// `/api/messages/:id`
#[derive(Debug, Deserialize)]
pub struct MessageIdPath {
    pub id: String,
}

impl MessageIdPath {
    pub fn message_id(&self) -> Result<MessageId, ApiError> {
        message_id(&self.id)
    }
}

/// `/api/viewers/:viewer/...`
#[derive(Debug, Deserialize)]
pub struct ViewerPath {
    pub viewer: String,
}

impl ViewerPath {
    pub fn viewer_id(&self) -> Result<ViewerId, ApiError> {
        viewer_id(&self.viewer)
    }
}

/// `/api/viewers/:viewer/messages/:id/...`
#[derive(Debug, Deserialize)]
pub struct ViewerMessagePath {
    pub viewer: String,
    pub id: String,
}

impl ViewerMessagePath {
    pub fn viewer_id(&self) -> Result<ViewerId, ApiError> {
        viewer_id(&self.viewer)
    }

    pub fn message_id(&self) -> Result<MessageId, ApiError> {
        message_id(&self.id)
    }
}

/// `/api/viewers/:viewer/messages/:id/reactions/:kind`
#[derive(Debug, Deserialize)]
pub struct ReactionPath {
    pub viewer: String,
    pub id: String,
    pub kind: String,
}

impl ReactionPath {
    pub fn viewer_id(&self) -> Result<ViewerId, ApiError> {
        viewer_id(&self.viewer)
    }

    pub fn message_id(&self) -> Result<MessageId, ApiError> {
        message_id(&self.id)
    }

    pub fn kind(&self) -> Result<ReactionKind, ApiError> {
        self.kind
            .parse()
            .map_err(|_| ApiError::invalid_path(format!("unknown reaction '{}'", self.kind)))
    }
}
