//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use feed_core::{Message, ReactionKind, Segment};

use super::responses::{FeedItemResponse, MessageResponse, SegmentResponse};

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            author: message.author.clone(),
            content: message.content.clone(),
            media_url: message.media_url.clone(),
            kind: message.kind,
            views: message.views,
            created_at: message.created_at,
            reactions: message.reactions,
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            author: message.author,
            content: message.content,
            media_url: message.media_url,
            kind: message.kind,
            views: message.views,
            created_at: message.created_at,
            reactions: message.reactions,
        }
    }
}

impl From<&Segment<'_>> for SegmentResponse {
    fn from(segment: &Segment<'_>) -> Self {
        match segment {
            Segment::Literal { text } => Self::Literal {
                text: (*text).to_string(),
            },
            Segment::Link { text, href } => Self::Link {
                text: (*text).to_string(),
                href: href.to_string(),
            },
        }
    }
}

impl FeedItemResponse {
    pub fn new(message: &Message, my_reaction: Option<ReactionKind>, viewed: bool) -> Self {
        Self {
            segments: message.segments().iter().map(SegmentResponse::from).collect(),
            message: MessageResponse::from(message),
            my_reaction,
            viewed,
        }
    }
}
