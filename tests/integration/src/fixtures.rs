//! Test fixtures and data generators
//!
//! Request bodies the tests send and the response shapes they read back.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Create message body
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            author: "Admin".to_string(),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn unique() -> Self {
        Self::text(format!("announcement #{}", unique_suffix()))
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Reaction counts as serialized by the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reactions {
    pub mind_blown: u64,
    pub fire: u64,
    pub hundred: u64,
    pub flex: u64,
    pub dash: u64,
    pub heart: u64,
}

/// Message response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    pub id: String,
    pub author: String,
    pub content: Option<String>,
    pub media_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub reactions: Reactions,
}

/// One tokenized span
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    Literal { text: String },
    Link { text: String, href: String },
}

/// Feed item as one viewer sees it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    #[serde(flatten)]
    pub message: MessageBody,
    pub segments: Vec<Segment>,
    pub my_reaction: Option<String>,
    pub viewed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedDay {
    pub date: String,
    pub messages: Vec<FeedItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub days: Vec<FeedDay>,
    pub fetched_at: DateTime<Utc>,
}

impl Feed {
    pub fn items(&self) -> impl Iterator<Item = &FeedItem> {
        self.days.iter().flat_map(|day| day.messages.iter())
    }

    pub fn find(&self, id: &str) -> Option<&FeedItem> {
        self.items().find(|item| item.message.id == id)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionToggle {
    pub message_id: String,
    pub my_reaction: Option<String>,
    pub reactions: Reactions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResult {
    pub message_id: String,
    pub status: String,
    pub views: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Upload {
    pub url: String,
}
