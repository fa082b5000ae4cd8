//! Message database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Columns selected for every message query
pub const MESSAGE_COLUMNS: &str = "id, author, content, media_url, message_type, views, \
     react_mind_blown, react_fire, react_hundred, react_flex, react_dash, react_heart, created_at";

/// Database model for messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub author: String,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub message_type: String,
    pub views: i64,
    pub react_mind_blown: i64,
    pub react_fire: i64,
    pub react_hundred: i64,
    pub react_flex: i64,
    pub react_dash: i64,
    pub react_heart: i64,
    pub created_at: DateTime<Utc>,
}

impl MessageModel {
    /// Reaction columns in `ReactionKind::ALL` order
    pub fn reaction_slots(&self) -> [i64; 6] {
        [
            self.react_mind_blown,
            self.react_fire,
            self.react_hundred,
            self.react_flex,
            self.react_dash,
            self.react_heart,
        ]
    }
}
