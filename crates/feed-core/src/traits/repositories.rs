//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL or in-memory).

use async_trait::async_trait;

use crate::entities::{CounterDelta, Message, MessagePatch, NewMessage};
use crate::error::DomainError;
use crate::value_objects::MessageId;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// List every message, ascending by `created_at` (ties by id)
    async fn list(&self) -> RepoResult<Vec<Message>>;

    /// Find message by ID
    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<Message>>;

    /// Create a new message; the store assigns the id
    async fn create(&self, message: &NewMessage) -> RepoResult<Message>;

    /// Apply a partial update to the editable fields
    async fn update(&self, id: MessageId, patch: &MessagePatch) -> RepoResult<Message>;

    /// Atomically add a counter delta and return the updated message.
    ///
    /// Reaction counters are floored at zero. Concurrent deltas must all land.
    async fn apply_delta(&self, id: MessageId, delta: &CounterDelta) -> RepoResult<Message>;

    /// Hard delete a message
    async fn delete(&self, id: MessageId) -> RepoResult<()>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> RepoResult<()> {
        Ok(())
    }
}
