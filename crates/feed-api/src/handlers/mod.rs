//! Route handlers
//!
//! All HTTP request handlers organized by audience.

pub mod health;
pub mod messages;
pub mod upload;
pub mod viewers;
