//! Service context - dependency container for services
//!
//! Holds the store, viewer storage, media ingestion, and the background
//! workers (delta dispatcher, feed polling) shared by every service.

use std::sync::Arc;
use std::time::Duration;

use feed_common::FeedConfig;
use feed_core::{MediaIngestor, MessageRepository, ViewerId, ViewerStorage};

use super::dispatch::{DeltaDispatcher, RetryPolicy};
use super::error::{ServiceError, ServiceResult};
use super::feed::{FeedSync, FeedSyncHandle, DEFAULT_POLL_INTERVAL};
use super::locks::ReactionLocks;
use super::view::ViewTracker;
use super::viewer::ViewerState;

/// Service context containing all dependencies
///
/// Built once at startup and cloned into request handlers. Cloning shares
/// the same store handles and background workers.
#[derive(Clone)]
pub struct ServiceContext {
    // Backends
    message_repo: Arc<dyn MessageRepository>,
    viewer_storage: Arc<dyn ViewerStorage>,
    media_ingestor: Arc<dyn MediaIngestor>,

    // Background workers
    dispatcher: DeltaDispatcher,
    feed: FeedSyncHandle,

    reaction_locks: ReactionLocks,
    retry_policy: RetryPolicy,
}

impl ServiceContext {
    /// Create a builder
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Backends ===

    /// Get the message store
    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    /// Get the viewer key/value storage
    pub fn viewer_storage(&self) -> &dyn ViewerStorage {
        self.viewer_storage.as_ref()
    }

    /// Get the media ingestor
    pub fn media_ingestor(&self) -> &dyn MediaIngestor {
        self.media_ingestor.as_ref()
    }

    // === Workers ===

    /// Get the counter delta dispatcher
    pub fn dispatcher(&self) -> &DeltaDispatcher {
        &self.dispatcher
    }

    /// Get the running feed poller
    pub fn feed(&self) -> &FeedSyncHandle {
        &self.feed
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Serializes toggles per viewer and message
    pub fn reaction_locks(&self) -> &ReactionLocks {
        &self.reaction_locks
    }

    // === Per-viewer helpers ===

    /// Viewer-local state for one viewer
    pub fn viewer_state(&self, viewer: ViewerId) -> ViewerState {
        ViewerState::new(Arc::clone(&self.viewer_storage), viewer)
    }

    /// View tracker over the shared store
    pub fn view_tracker(&self) -> ViewTracker {
        ViewTracker::new(Arc::clone(&self.message_repo), self.retry_policy)
    }

    /// Stop feed polling and drain queued counter deltas
    pub async fn shutdown(&self) {
        self.feed.shutdown().await;
        self.dispatcher.shutdown().await;
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("backends", &"...")
            .field("dispatcher", &self.dispatcher)
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    message_repo: Option<Arc<dyn MessageRepository>>,
    viewer_storage: Option<Arc<dyn ViewerStorage>>,
    media_ingestor: Option<Arc<dyn MediaIngestor>>,
    retry_policy: RetryPolicy,
    poll_interval: Duration,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            message_repo: None,
            viewer_storage: None,
            media_ingestor: None,
            retry_policy: RetryPolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn viewer_storage(mut self, storage: Arc<dyn ViewerStorage>) -> Self {
        self.viewer_storage = Some(storage);
        self
    }

    pub fn media_ingestor(mut self, ingestor: Arc<dyn MediaIngestor>) -> Self {
        self.media_ingestor = Some(ingestor);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Take retry and polling settings from configuration
    pub fn feed_config(self, config: &FeedConfig) -> Self {
        self.retry_policy(RetryPolicy::from_config(config))
            .poll_interval(config.poll_interval())
    }

    /// Build the ServiceContext and start its background workers.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let message_repo = self
            .message_repo
            .ok_or_else(|| ServiceError::validation("message_repo is required"))?;
        let viewer_storage = self
            .viewer_storage
            .ok_or_else(|| ServiceError::validation("viewer_storage is required"))?;
        let media_ingestor = self
            .media_ingestor
            .ok_or_else(|| ServiceError::validation("media_ingestor is required"))?;

        let dispatcher = DeltaDispatcher::spawn(Arc::clone(&message_repo), self.retry_policy);
        let feed = FeedSync::new(Arc::clone(&message_repo))
            .with_dispatcher(dispatcher.clone())
            .spawn(self.poll_interval);

        Ok(ServiceContext {
            message_repo,
            viewer_storage,
            media_ingestor,
            dispatcher,
            feed,
            reaction_locks: ReactionLocks::new(),
            retry_policy: self.retry_policy,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
