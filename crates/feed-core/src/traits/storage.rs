//! Viewer-local key/value storage

use async_trait::async_trait;

use super::repositories::RepoResult;

/// Persisted per-viewer facts (viewed markers, active reaction).
///
/// Keys are namespaced by the caller; values are short strings.
#[async_trait]
pub trait ViewerStorage: Send + Sync {
    async fn get(&self, key: &str) -> RepoResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> RepoResult<()>;

    /// Remove a key; removing a missing key is not an error
    async fn remove(&self, key: &str) -> RepoResult<()>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> RepoResult<()> {
        Ok(())
    }
}
