//! Message service
//!
//! Store-facing CRUD for the admin composer and editor, plus direct counter
//! deltas.

use feed_core::{
    CounterDelta, DomainError, MediaUpload, MessageId, MessagePatch, MessageType, NewMessage,
    ReactionKind,
};
use tracing::{info, instrument};
use validator::Validate;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use crate::dto::{CreateMessageRequest, MessageResponse, UpdateMessageRequest, MAX_CONTENT_LEN};

/// Message service for handling message-related operations
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// All messages, ascending by creation time
    #[instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<Vec<MessageResponse>> {
        let messages = self.ctx.message_repo().list().await?;
        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }

    /// Get a single message
    #[instrument(skip(self), fields(message_id = %id))]
    pub async fn get(&self, id: MessageId) -> ServiceResult<MessageResponse> {
        let message = self
            .ctx
            .message_repo()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::MessageNotFound(id))?;
        Ok(message.into())
    }

    /// Create a message.
    ///
    /// An upload is ingested before anything is written; if ingestion fails
    /// the message is not created.
    #[instrument(skip(self, request, upload), fields(author = %request.author))]
    pub async fn create(
        &self,
        request: CreateMessageRequest,
        upload: Option<MediaUpload>,
    ) -> ServiceResult<MessageResponse> {
        request.validate()?;

        let content = normalize_content(request.content)?;
        if content.is_none() && request.media_url.is_none() && upload.is_none() {
            return Err(ServiceError::invalid_argument(
                "Message must have content or media",
            ));
        }

        let (media_url, kind) = match upload {
            Some(upload) => {
                let kind = MessageType::from_content_type(&upload.content_type);
                let url = self.ctx.media_ingestor().ingest(upload).await?;
                (Some(url), kind)
            }
            None => {
                let kind = request.kind.unwrap_or(if request.media_url.is_some() {
                    MessageType::Image
                } else {
                    MessageType::Text
                });
                (request.media_url, kind)
            }
        };

        let new_message = NewMessage {
            author: request.author.trim().to_string(),
            content,
            media_url,
            kind,
            created_at: request.created_at,
            views: request.views,
            reactions: request.reactions,
        };

        let message = self.ctx.message_repo().create(&new_message).await?;
        info!(message_id = %message.id, kind = %message.kind, "Message created");
        Ok(message.into())
    }

    /// Partially update a message. The id comes from the request body.
    #[instrument(skip(self, request, upload), fields(message_id = ?request.id))]
    pub async fn update(
        &self,
        request: UpdateMessageRequest,
        upload: Option<MediaUpload>,
    ) -> ServiceResult<MessageResponse> {
        let id = request
            .id
            .ok_or_else(|| ServiceError::invalid_argument("Message ID required"))?;
        request.validate()?;

        let content = match request.content {
            Some(content) => Some(normalize_content(content)?),
            None => None,
        };

        let mut patch = MessagePatch {
            author: request.author.map(|a| a.trim().to_string()),
            content,
            media_url: request.media_url,
            kind: request.kind,
            created_at: request.created_at,
        };

        if let Some(upload) = upload {
            patch.kind = Some(MessageType::from_content_type(&upload.content_type));
            let url = self.ctx.media_ingestor().ingest(upload).await?;
            patch.media_url = Some(Some(url));
        }

        if patch.is_empty() {
            return self.get(id).await;
        }

        let message = self.ctx.message_repo().update(id, &patch).await?;
        info!(message_id = %id, "Message updated");
        Ok(message.into())
    }

    /// Delete a message
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Option<MessageId>) -> ServiceResult<()> {
        let id = id.ok_or_else(|| ServiceError::invalid_argument("Message ID required"))?;
        self.ctx.message_repo().delete(id).await?;
        info!(message_id = %id, "Message deleted");
        Ok(())
    }

    /// Apply one atomic counter delta and wait for the store.
    ///
    /// A delta may add at most one view and move each reaction by at most one.
    #[instrument(skip(self), fields(message_id = %id))]
    pub async fn apply_counters(
        &self,
        id: MessageId,
        delta: CounterDelta,
    ) -> ServiceResult<MessageResponse> {
        if delta.is_empty() {
            return Err(ServiceError::invalid_argument("Counter delta is empty"));
        }
        if delta.views > 1 {
            return Err(ServiceError::validation("views may only grow by 1"));
        }
        if let Some(kind) = ReactionKind::ALL
            .into_iter()
            .find(|kind| !(-1..=1).contains(&delta.reaction_delta(*kind)))
        {
            return Err(ServiceError::validation(format!(
                "{kind} may only change by 1"
            )));
        }

        let message = self.ctx.message_repo().apply_delta(id, &delta).await?;
        Ok(message.into())
    }
}

/// Trim surrounding whitespace, treat blank as absent, and enforce the length cap
fn normalize_content(content: Option<String>) -> ServiceResult<Option<String>> {
    let Some(content) = content else {
        return Ok(None);
    };
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_CONTENT_LEN {
        return Err(DomainError::ContentTooLong {
            max: MAX_CONTENT_LEN,
        }
        .into());
    }
    Ok(Some(trimmed.to_string()))
}
