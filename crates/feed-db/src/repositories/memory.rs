//! In-memory implementation of MessageRepository
//!
//! Used for development and tests. Counter deltas are applied under the
//! write lock, so concurrent deltas never lose an update.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::instrument;

use feed_core::entities::{CounterDelta, Message, MessagePatch, NewMessage};
use feed_core::traits::{MessageRepository, RepoResult};
use feed_core::value_objects::MessageId;

use super::error::message_not_found;

/// In-memory message store
#[derive(Debug)]
pub struct MemoryMessageRepository {
    messages: RwLock<HashMap<MessageId, Message>>,
    next_id: AtomicI64,
}

impl Default for MemoryMessageRepository {
    fn default() -> Self {
        Self {
            messages: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl MemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages
    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn list(&self) -> RepoResult<Vec<Message>> {
        let mut messages: Vec<Message> = self.messages.read().values().cloned().collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<Message>> {
        Ok(self.messages.read().get(&id).cloned())
    }

    #[instrument(skip(self, message), fields(author = %message.author))]
    async fn create(&self, message: &NewMessage) -> RepoResult<Message> {
        let id = MessageId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let stored = message.clone().into_message(id, Utc::now());
        self.messages.write().insert(id, stored.clone());
        Ok(stored)
    }

    #[instrument(skip(self, patch), fields(message_id = %id))]
    async fn update(&self, id: MessageId, patch: &MessagePatch) -> RepoResult<Message> {
        let mut messages = self.messages.write();
        let message = messages.get_mut(&id).ok_or_else(|| message_not_found(id))?;
        patch.apply_to(message);
        Ok(message.clone())
    }

    #[instrument(skip(self), fields(message_id = %id))]
    async fn apply_delta(&self, id: MessageId, delta: &CounterDelta) -> RepoResult<Message> {
        let mut messages = self.messages.write();
        let message = messages.get_mut(&id).ok_or_else(|| message_not_found(id))?;
        message.apply_delta(delta);
        Ok(message.clone())
    }

    #[instrument(skip(self), fields(message_id = %id))]
    async fn delete(&self, id: MessageId) -> RepoResult<()> {
        self.messages
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| message_not_found(id))
    }
}
