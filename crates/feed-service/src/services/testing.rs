//! Test doubles shared by the service tests

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use feed_core::{
    CounterDelta, DomainError, MediaIngestor, MediaUpload, Message, MessageId, MessagePatch,
    MessageRepository, NewMessage, RepoResult, ViewerStorage,
};
use feed_cache::MemoryViewerStorage;
use feed_db::MemoryMessageRepository;

fn take_failure(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// In-memory store that can be told to fail `apply_delta` and `list`
#[derive(Default)]
pub(crate) struct FlakyRepository {
    inner: MemoryMessageRepository,
    delta_failures: AtomicU32,
    list_failures: AtomicU32,
    delta_calls: AtomicU32,
    ack_delay_ms: AtomicU64,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_deltas(&self, times: u32) {
        self.delta_failures.store(times, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, times: u32) {
        self.list_failures.store(times, Ordering::SeqCst);
    }

    /// Commit deltas at once but hold back the reply
    pub fn delay_acks(&self, delay: Duration) {
        self.ack_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn delta_calls(&self) -> u32 {
        self.delta_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageRepository for FlakyRepository {
    async fn list(&self) -> RepoResult<Vec<Message>> {
        if take_failure(&self.list_failures) {
            return Err(DomainError::DatabaseError("connection refused".into()));
        }
        self.inner.list().await
    }

    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<Message>> {
        self.inner.find_by_id(id).await
    }

    async fn create(&self, message: &NewMessage) -> RepoResult<Message> {
        self.inner.create(message).await
    }

    async fn update(&self, id: MessageId, patch: &MessagePatch) -> RepoResult<Message> {
        self.inner.update(id, patch).await
    }

    async fn apply_delta(&self, id: MessageId, delta: &CounterDelta) -> RepoResult<Message> {
        self.delta_calls.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.delta_failures) {
            return Err(DomainError::DatabaseError("connection reset".into()));
        }
        let applied = self.inner.apply_delta(id, delta).await;
        let delay = self.ack_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        applied
    }

    async fn delete(&self, id: MessageId) -> RepoResult<()> {
        self.inner.delete(id).await
    }
}

/// Viewer storage whose writes always fail
pub(crate) struct ReadOnlyViewerStorage;

#[async_trait]
impl ViewerStorage for ReadOnlyViewerStorage {
    async fn get(&self, _key: &str) -> RepoResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> RepoResult<()> {
        Err(DomainError::CacheError("storage is read-only".into()))
    }

    async fn remove(&self, _key: &str) -> RepoResult<()> {
        Err(DomainError::CacheError("storage is read-only".into()))
    }
}

/// In-memory viewer storage that yields to the scheduler before every call,
/// so concurrent callers interleave between a read and the following write
#[derive(Default)]
pub(crate) struct YieldingViewerStorage {
    inner: MemoryViewerStorage,
}

#[async_trait]
impl ViewerStorage for YieldingViewerStorage {
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        tokio::task::yield_now().await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        tokio::task::yield_now().await;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> RepoResult<()> {
        tokio::task::yield_now().await;
        self.inner.remove(key).await
    }
}

/// Ingestor that hands back a fixed URL, or fails when built with `failing`
pub(crate) struct StubIngestor {
    url: Option<String>,
}

impl StubIngestor {
    pub fn ok(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { url: None }
    }
}

#[async_trait]
impl MediaIngestor for StubIngestor {
    async fn ingest(&self, _upload: MediaUpload) -> RepoResult<String> {
        self.url
            .clone()
            .ok_or_else(|| DomainError::UploadFailed("bucket unavailable".into()))
    }
}
