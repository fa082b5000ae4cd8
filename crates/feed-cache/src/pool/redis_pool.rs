//! deadpool-redis pool for viewer state.
//!
//! Viewer state is a flat set of string keys, so the pool offers checkout
//! plus the three string commands the storage backend issues.

use std::sync::Arc;

use deadpool_redis::{Config, Connection, Pool, PoolError, Runtime};
use feed_common::RedisConfig;
use feed_core::DomainError;
use redis::AsyncCommands;

const DEFAULT_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_MAX_CONNECTIONS: usize = 10;

#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    pub url: String,
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl From<&RedisConfig> for RedisPoolConfig {
    fn from(config: &RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

impl RedisPoolConfig {
    /// Host part of the URL; credentials are never logged.
    fn redacted_url(&self) -> &str {
        self.url
            .rsplit_once('@')
            .map_or(self.url.as_str(), |(_, host)| host)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Invalid Redis pool settings: {0}")]
    Build(String),

    #[error("No Redis connection available: {0}")]
    Checkout(#[from] PoolError),

    #[error("Redis command failed: {0}")]
    Command(#[from] redis::RedisError),
}

impl From<RedisPoolError> for DomainError {
    fn from(err: RedisPoolError) -> Self {
        Self::CacheError(err.to_string())
    }
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

#[derive(Clone)]
pub struct RedisPool {
    inner: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.inner.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

impl RedisPool {
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let builder = Config::from_url(config.url.as_str())
            .builder()
            .map_err(|e| RedisPoolError::Build(e.to_string()))?;
        let inner = builder
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::Build(e.to_string()))?;

        tracing::info!(
            url = %config.redacted_url(),
            max_connections = config.max_connections,
            "Viewer storage pool ready"
        );
        Ok(Self { inner })
    }

    async fn connection(&self) -> RedisResult<Connection> {
        Ok(self.inner.get().await?)
    }

    /// PING round trip, used by readiness
    pub async fn ping(&self) -> RedisResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    pub async fn read(&self, key: &str) -> RedisResult<Option<String>> {
        let mut conn = self.connection().await?;
        Ok(conn.get(key).await?)
    }

    /// SET without expiry
    pub async fn write(&self, key: &str, value: &str) -> RedisResult<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    /// DEL; `true` if the key existed
    pub async fn remove(&self, key: &str) -> RedisResult<bool> {
        let mut conn = self.connection().await?;
        let removed: u32 = conn.del(key).await?;
        Ok(removed > 0)
    }
}

pub type SharedRedisPool = Arc<RedisPool>;

pub fn create_shared_pool(config: RedisPoolConfig) -> RedisResult<SharedRedisPool> {
    RedisPool::new(config).map(Arc::new)
}
