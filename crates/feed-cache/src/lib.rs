//! # feed-cache
//!
//! Key/value backends for viewer-local state (viewed markers and the active
//! reaction per message).
//!
//! ## Example
//!
//! ```ignore
//! use feed_cache::{create_shared_pool, RedisPoolConfig, RedisViewerStorage};
//!
//! let pool = create_shared_pool(RedisPoolConfig::default())?;
//! let storage = RedisViewerStorage::new(pool);
//! storage.set("viewer:tab-1:viewed:42", "true").await?;
//! ```

pub mod pool;
pub mod viewer;

// Re-export pool types
pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};

// Re-export storage backends
pub use viewer::{MemoryViewerStorage, RedisViewerStorage};
