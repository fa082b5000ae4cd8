//! Message entity - one post in the broadcast feed

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::reaction::{CounterDelta, ReactionCounts};
use crate::text::{tokenize, Segment};
use crate::value_objects::MessageId;

/// What a message carries besides its text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    Video,
}

impl MessageType {
    /// Derive the type of an uploaded file from its MIME type.
    /// Anything that is not `video/*` is treated as an image.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.trim().to_ascii_lowercase().starts_with("video") {
            Self::Video
        } else {
            Self::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    #[inline]
    pub fn is_media(&self) -> bool {
        !matches!(self, Self::Text)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            _ => Err(format!("Invalid message type: {s}")),
        }
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub author: String,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub kind: MessageType,
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub reactions: ReactionCounts,
}

impl Message {
    /// Create a text message with zeroed counters
    pub fn new(id: MessageId, author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            author: author.into(),
            content: Some(content.into()),
            media_url: None,
            kind: MessageType::Text,
            views: 0,
            created_at: Utc::now(),
            reactions: ReactionCounts::new(),
        }
    }

    #[inline]
    pub fn has_media(&self) -> bool {
        self.media_url.is_some()
    }

    /// Check if the message has neither text nor media
    pub fn is_empty(&self) -> bool {
        self.content.as_deref().map_or(true, |c| c.trim().is_empty()) && !self.has_media()
    }

    /// Text split into literal and link segments (empty when there is no text)
    pub fn segments(&self) -> Vec<Segment<'_>> {
        self.content.as_deref().map(tokenize).unwrap_or_default()
    }

    /// Calendar day (UTC) the message is grouped under
    pub fn day(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    /// Apply a counter delta locally. Reaction counters floor at zero.
    pub fn apply_delta(&mut self, delta: &CounterDelta) {
        self.views = self.views.saturating_add(delta.views);
        self.reactions.apply(delta);
    }

    /// Get a truncated preview of the message text
    pub fn preview(&self, max_len: usize) -> &str {
        let content = self.content.as_deref().unwrap_or_default();
        if content.len() <= max_len {
            content
        } else {
            let mut end = max_len;
            while !content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &content[..end]
        }
    }
}

/// Input for creating a message.
///
/// `created_at` may backdate the post and the counters may start non-zero;
/// both come from the admin composer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewMessage {
    pub author: String,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub kind: MessageType,
    pub created_at: Option<DateTime<Utc>>,
    pub views: u64,
    pub reactions: ReactionCounts,
}

impl NewMessage {
    pub fn text(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn media(author: impl Into<String>, media_url: impl Into<String>, kind: MessageType) -> Self {
        Self {
            author: author.into(),
            media_url: Some(media_url.into()),
            kind,
            ..Self::default()
        }
    }

    /// Materialize into a stored message with the given id
    pub fn into_message(self, id: MessageId, now: DateTime<Utc>) -> Message {
        Message {
            id,
            author: self.author,
            content: self.content,
            media_url: self.media_url,
            kind: self.kind,
            views: self.views,
            created_at: self.created_at.unwrap_or(now),
            reactions: self.reactions,
        }
    }
}

/// Partial update of a message's editable fields.
///
/// `None` leaves a field unchanged; `Some(None)` clears a nullable field.
/// Counters are not part of a patch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessagePatch {
    pub author: Option<String>,
    pub content: Option<Option<String>>,
    pub media_url: Option<Option<String>>,
    pub kind: Option<MessageType>,
    pub created_at: Option<DateTime<Utc>>,
}

impl MessagePatch {
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.content.is_none()
            && self.media_url.is_none()
            && self.kind.is_none()
            && self.created_at.is_none()
    }

    /// Apply the patch in place
    pub fn apply_to(&self, message: &mut Message) {
        if let Some(author) = &self.author {
            message.author.clone_from(author);
        }
        if let Some(content) = &self.content {
            message.content.clone_from(content);
        }
        if let Some(media_url) = &self.media_url {
            message.media_url.clone_from(media_url);
        }
        if let Some(kind) = self.kind {
            message.kind = kind;
        }
        if let Some(created_at) = self.created_at {
            message.created_at = created_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ReactionKind;
    use chrono::TimeZone;

    #[test]
    fn test_message_type_from_content_type() {
        assert_eq!(MessageType::from_content_type("video/mp4"), MessageType::Video);
        assert_eq!(MessageType::from_content_type("image/png"), MessageType::Image);
        assert_eq!(MessageType::from_content_type("application/pdf"), MessageType::Image);
    }

    #[test]
    fn test_message_type_serde() {
        assert_eq!(serde_json::to_string(&MessageType::Video).unwrap(), "\"video\"");
        let parsed: MessageType = serde_json::from_str("\"image\"").unwrap();
        assert_eq!(parsed, MessageType::Image);
    }

    #[test]
    fn test_message_is_empty() {
        let mut msg = Message::new(MessageId::new(1), "Admin", "   ");
        assert!(msg.is_empty());

        msg.media_url = Some("/media/a.png".to_string());
        assert!(!msg.is_empty());
    }

    #[test]
    fn test_message_segments() {
        let msg = Message::new(MessageId::new(1), "Admin", "go to example.com");
        let segments = msg.segments();
        assert_eq!(segments.len(), 2);
        assert!(segments[1].is_link());

        let mut media_only = msg.clone();
        media_only.content = None;
        assert!(media_only.segments().is_empty());
    }

    #[test]
    fn test_message_apply_delta() {
        let mut msg = Message::new(MessageId::new(1), "Admin", "hi");
        msg.apply_delta(&CounterDelta::view().with_reaction(ReactionKind::Fire, 1));
        msg.apply_delta(&CounterDelta::reaction(ReactionKind::Heart, -1));

        assert_eq!(msg.views, 1);
        assert_eq!(msg.reactions.get(ReactionKind::Fire), 1);
        assert_eq!(msg.reactions.get(ReactionKind::Heart), 0);
    }

    #[test]
    fn test_message_preview() {
        let msg = Message::new(MessageId::new(1), "Admin", "Hello, world!");
        assert_eq!(msg.preview(5), "Hello");
        assert_eq!(msg.preview(100), "Hello, world!");
    }

    #[test]
    fn test_new_message_backdating() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let backdated = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();

        let plain = NewMessage::text("Admin", "a").into_message(MessageId::new(1), now);
        assert_eq!(plain.created_at, now);

        let old = NewMessage {
            created_at: Some(backdated),
            views: 12,
            ..NewMessage::text("Admin", "b")
        }
        .into_message(MessageId::new(2), now);
        assert_eq!(old.created_at, backdated);
        assert_eq!(old.views, 12);
    }

    #[test]
    fn test_patch_leaves_omitted_fields() {
        let mut msg = Message::new(MessageId::new(1), "Admin", "original");
        msg.media_url = Some("/media/x.png".to_string());
        msg.views = 9;

        let patch = MessagePatch {
            content: Some(Some("edited".to_string())),
            ..MessagePatch::default()
        };
        patch.apply_to(&mut msg);

        assert_eq!(msg.content.as_deref(), Some("edited"));
        assert_eq!(msg.author, "Admin");
        assert_eq!(msg.media_url.as_deref(), Some("/media/x.png"));
        assert_eq!(msg.views, 9);
    }

    #[test]
    fn test_patch_clears_nullable_field() {
        let mut msg = Message::new(MessageId::new(1), "Admin", "text");
        msg.media_url = Some("/media/x.png".to_string());

        let patch = MessagePatch {
            media_url: Some(None),
            kind: Some(MessageType::Text),
            ..MessagePatch::default()
        };
        assert!(!patch.is_empty());
        patch.apply_to(&mut msg);

        assert!(msg.media_url.is_none());
        assert_eq!(msg.kind, MessageType::Text);
    }
}
