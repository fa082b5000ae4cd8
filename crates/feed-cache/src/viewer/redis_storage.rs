//! Viewer-local state persisted in Redis.

use async_trait::async_trait;
use tracing::{debug, instrument};

use feed_core::traits::{RepoResult, ViewerStorage};

use crate::pool::SharedRedisPool;

/// Namespace prepended to every viewer key
const KEY_PREFIX: &str = "feed:";

/// Redis-backed [`ViewerStorage`]. Markers never expire.
#[derive(Debug, Clone)]
pub struct RedisViewerStorage {
    pool: SharedRedisPool,
}

impl RedisViewerStorage {
    pub fn new(pool: SharedRedisPool) -> Self {
        Self { pool }
    }

    fn key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl ViewerStorage for RedisViewerStorage {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.pool.read(&Self::key(key)).await?)
    }

    #[instrument(skip(self))]
    async fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.pool.write(&Self::key(key), value).await?;
        debug!("Viewer key stored");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> RepoResult<()> {
        let existed = self.pool.remove(&Self::key(key)).await?;
        debug!(existed, "Viewer key removed");
        Ok(())
    }

    async fn health_check(&self) -> RepoResult<()> {
        Ok(self.pool.ping().await?)
    }
}
