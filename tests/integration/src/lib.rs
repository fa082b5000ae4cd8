//! Integration test utilities for the feed server
//!
//! Servers run on the in-memory backends, so no external services are needed.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
