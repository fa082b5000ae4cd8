//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.

use chrono::{DateTime, NaiveDate, Utc};
use feed_core::{MessageId, MessageType, ReactionCounts, ReactionKind};
use serde::Serialize;

use crate::services::ViewOutcome;

// ============================================================================
// Message Responses
// ============================================================================

/// Message response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: MessageId,
    pub author: String,
    pub content: Option<String>,
    pub media_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub reactions: ReactionCounts,
}

/// One span of tokenized message text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SegmentResponse {
    Literal { text: String },
    Link { text: String, href: String },
}

/// Message as one viewer sees it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItemResponse {
    #[serde(flatten)]
    pub message: MessageResponse,
    pub segments: Vec<SegmentResponse>,
    pub my_reaction: Option<ReactionKind>,
    pub viewed: bool,
}

/// Messages posted on one day
#[derive(Debug, Clone, Serialize)]
pub struct FeedDayResponse {
    pub date: NaiveDate,
    pub messages: Vec<FeedItemResponse>,
}

/// Viewer feed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub days: Vec<FeedDayResponse>,
    pub fetched_at: DateTime<Utc>,
}

/// Result of a reaction toggle, with optimistic counts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionToggleResponse {
    pub message_id: MessageId,
    pub my_reaction: Option<ReactionKind>,
    pub reactions: ReactionCounts,
}

/// Result of a view registration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    pub message_id: MessageId,
    /// `registered`, `already_viewed` or `dropped`
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
}

impl ViewResponse {
    pub fn from_outcome(message_id: MessageId, outcome: ViewOutcome) -> Self {
        let (status, views) = match outcome {
            ViewOutcome::Registered { views } => ("registered", Some(views)),
            ViewOutcome::AlreadyViewed => ("already_viewed", None),
            ViewOutcome::Dropped => ("dropped", None),
        };
        Self {
            message_id,
            status,
            views,
        }
    }
}

/// Stored media location
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Delete acknowledgment
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// ============================================================================
// Health Responses
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each backend
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub store: String,
    pub viewer_storage: String,
}

fn health_label(healthy: bool) -> String {
    if healthy { "healthy" } else { "unhealthy" }.to_string()
}

impl ReadinessResponse {
    pub fn ready(store_healthy: bool, viewer_storage_healthy: bool) -> Self {
        let all_healthy = store_healthy && viewer_storage_healthy;
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                store: health_label(store_healthy),
                viewer_storage: health_label(viewer_storage_healthy),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
