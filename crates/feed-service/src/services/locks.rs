//! Per-(viewer, message) serialization of reaction toggles.
//!
//! A toggle reads the viewer's stored reaction and then writes the next one.
//! Two requests for the same viewer and message must not overlap, or both
//! read `Unreacted` and both increment.

use std::sync::Arc;

use dashmap::DashMap;
use feed_core::{MessageId, ViewerId};
use tokio::sync::{Mutex, OwnedMutexGuard};

type Key = (ViewerId, MessageId);

#[derive(Clone, Default)]
pub struct ReactionLocks {
    slots: Arc<DashMap<Key, Arc<Mutex<()>>>>,
}

impl ReactionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other toggle for this viewer and message is running.
    pub async fn acquire(&self, viewer: &ViewerId, message_id: MessageId) -> ReactionGuard {
        let key = (viewer.clone(), message_id);
        let slot = Arc::clone(self.slots.entry(key.clone()).or_default().value());
        let guard = slot.lock_owned().await;
        ReactionGuard {
            guard: Some(guard),
            slots: Arc::clone(&self.slots),
            key,
        }
    }

    /// Number of keys with a live or waiting toggle
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl std::fmt::Debug for ReactionLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionLocks")
            .field("held", &self.slots.len())
            .finish()
    }
}

/// Held for the duration of one toggle. The slot is dropped from the map
/// once nobody holds or waits on it.
pub struct ReactionGuard {
    guard: Option<OwnedMutexGuard<()>>,
    slots: Arc<DashMap<Key, Arc<Mutex<()>>>>,
    key: Key,
}

impl Drop for ReactionGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.slots
            .remove_if(&self.key, |_, slot| Arc::strong_count(slot) == 1);
    }
}
