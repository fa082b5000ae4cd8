//! Message entity <-> model mapper

use feed_core::entities::{CounterDelta, Message, MessageType, NewMessage, ReactionCounts, ReactionKind};
use feed_core::error::DomainError;
use feed_core::traits::RepoResult;
use feed_core::value_objects::MessageId;

use crate::models::MessageModel;

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn to_column(value: u64, field: &str) -> RepoResult<i64> {
    i64::try_from(value)
        .map_err(|_| DomainError::InvalidArgument(format!("{field} out of range: {value}")))
}

/// Convert MessageModel to Message entity
impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        let slots = model.reaction_slots().map(non_negative);
        Message {
            id: MessageId::new(model.id),
            author: model.author,
            content: model.content,
            media_url: model.media_url,
            kind: model.message_type.parse().unwrap_or_else(|_| {
                tracing::warn!(message_id = model.id, message_type = %model.message_type, "Unknown message type, treating as text");
                MessageType::Text
            }),
            views: non_negative(model.views),
            created_at: model.created_at,
            reactions: ReactionCounts::from_slots(slots),
        }
    }
}

/// Values bound when inserting a new message
pub struct MessageInsert<'a> {
    pub author: &'a str,
    pub content: Option<&'a str>,
    pub media_url: Option<&'a str>,
    pub message_type: &'static str,
    pub views: i64,
    pub reactions: [i64; ReactionKind::COUNT],
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a NewMessage) -> RepoResult<Self> {
        let mut reactions = [0; ReactionKind::COUNT];
        for (kind, count) in message.reactions.iter() {
            reactions[kind.index()] = to_column(count, kind.column())?;
        }

        Ok(Self {
            author: &message.author,
            content: message.content.as_deref(),
            media_url: message.media_url.as_deref(),
            message_type: message.kind.as_str(),
            views: to_column(message.views, "views")?,
            reactions,
        })
    }
}

/// Signed per-column increments of a counter delta
pub struct DeltaBinds {
    pub views: i64,
    pub reactions: [i64; ReactionKind::COUNT],
}

impl DeltaBinds {
    pub fn new(delta: &CounterDelta) -> RepoResult<Self> {
        Ok(Self {
            views: to_column(delta.views, "views")?,
            reactions: ReactionKind::ALL.map(|kind| delta.reaction_delta(kind)),
        })
    }
}
