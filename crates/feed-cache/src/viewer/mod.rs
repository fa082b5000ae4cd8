//! Viewer storage backends

mod memory_storage;
mod redis_storage;

pub use memory_storage::MemoryViewerStorage;
pub use redis_storage::RedisViewerStorage;
