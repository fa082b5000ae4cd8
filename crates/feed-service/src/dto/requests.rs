//! Request DTOs for API endpoints
//!
//! Request bodies implement `Deserialize`; those with field rules also
//! implement `Validate`.

use chrono::{DateTime, Utc};
use feed_core::{MessageId, MessageType, ReactionCounts};
use serde::{Deserialize, Deserializer};
use validator::Validate;

/// Upper bound on message text
pub const MAX_CONTENT_LEN: usize = 4000;

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`)
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Message Requests
// ============================================================================

/// Create message request (admin composer)
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    #[validate(length(min = 1, max = 64, message = "Author must be 1-64 characters"))]
    pub author: String,

    pub content: Option<String>,

    #[validate(length(min = 1, max = 2048, message = "Media URL must be 1-2048 characters"))]
    pub media_url: Option<String>,

    /// Derived from the media when omitted
    #[serde(rename = "type")]
    pub kind: Option<MessageType>,

    /// Backdate the post
    pub created_at: Option<DateTime<Utc>>,

    /// Initial view count
    #[serde(default)]
    pub views: u64,

    /// Initial reaction counts
    #[serde(default)]
    pub reactions: ReactionCounts,
}

/// Update message request (admin editor).
///
/// Omitted fields are left unchanged; `null` clears `content` or `mediaUrl`.
/// Counter fields are not accepted here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessageRequest {
    pub id: Option<MessageId>,

    #[validate(length(min = 1, max = 64, message = "Author must be 1-64 characters"))]
    pub author: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub content: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub media_url: Option<Option<String>>,

    #[serde(rename = "type")]
    pub kind: Option<MessageType>,

    pub created_at: Option<DateTime<Utc>>,
}

/// Delete target, from the query string or the body
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct DeleteMessageRequest {
    pub id: Option<MessageId>,
}

/// Single-message lookup via `?id=`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MessageQuery {
    pub id: Option<MessageId>,
}
