//! # feed-api
//!
//! REST API server for the broadcast feed, built with Axum.
//!
//! The admin side manages messages through `/api/messages` and `/api/upload`;
//! viewers read the feed and react through `/api/viewers/:viewer/...`.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, run_server};
pub use state::AppState;
