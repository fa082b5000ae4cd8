//! Process-local viewer storage

use async_trait::async_trait;
use dashmap::DashMap;

use feed_core::traits::{RepoResult, ViewerStorage};

/// In-memory [`ViewerStorage`] for development and tests
#[derive(Debug, Default)]
pub struct MemoryViewerStorage {
    entries: DashMap<String, String>,
}

impl MemoryViewerStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ViewerStorage for MemoryViewerStorage {
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> RepoResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
