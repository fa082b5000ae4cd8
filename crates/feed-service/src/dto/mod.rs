//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    CreateMessageRequest, DeleteMessageRequest, MessageQuery, UpdateMessageRequest,
    MAX_CONTENT_LEN,
};

pub use responses::{
    DeleteResponse, FeedDayResponse, FeedItemResponse, FeedResponse, HealthChecks,
    HealthResponse, MessageResponse, ReactionToggleResponse, ReadinessResponse, SegmentResponse,
    UploadResponse, ViewResponse,
};
