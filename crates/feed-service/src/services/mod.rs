//! Business logic services
//!
//! The feed engine (viewer state, reactions, views, polling, delta dispatch)
//! and the store-facing message and media use cases.

pub mod context;
pub mod dispatch;
pub mod error;
pub mod feed;
pub mod locks;
pub mod media;
pub mod message;
pub mod reaction;
pub mod view;
pub mod viewer;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use dispatch::{DeltaDispatcher, RetryPolicy};
pub use error::{ServiceError, ServiceResult};
pub use feed::{group_by_day, DayGroup, FeedSnapshot, FeedSync, FeedSyncHandle, DEFAULT_POLL_INTERVAL};
pub use locks::{ReactionGuard, ReactionLocks};
pub use media::{LocalMediaIngestor, MediaService};
pub use message::MessageService;
pub use reaction::ReactionController;
pub use view::{ViewOutcome, ViewTracker};
pub use viewer::{ViewerService, ViewerState};
