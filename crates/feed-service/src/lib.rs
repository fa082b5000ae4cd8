//! # feed-service
//!
//! Application layer: the feed interaction engine and message use cases.
//!
//! - [`ViewerState`], [`ReactionController`] and [`ViewTracker`] act for one
//!   viewer against the shared store
//! - [`DeltaDispatcher`] lands counter deltas in the background with retry
//! - [`FeedSync`] polls the store and overlays deltas still in flight
//! - [`MessageService`] and [`MediaService`] back the admin endpoints
//!
//! Everything hangs off a [`ServiceContext`].

pub mod dto;
pub mod services;

pub use services::{
    group_by_day, DayGroup, DeltaDispatcher, FeedSnapshot, FeedSync, FeedSyncHandle,
    LocalMediaIngestor, MediaService, MessageService, ReactionController, RetryPolicy,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, ViewOutcome,
    ViewTracker, ViewerService, ViewerState,
};
