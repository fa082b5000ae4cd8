//! Traits (ports) implemented by the infrastructure crates

mod media;
mod repositories;
mod storage;

pub use media::{MediaIngestor, MediaUpload};
pub use repositories::{MessageRepository, RepoResult};
pub use storage::ViewerStorage;
