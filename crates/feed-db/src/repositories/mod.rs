//! Repository implementations
//!
//! PostgreSQL and in-memory implementations of the repository traits defined
//! in feed-core.

mod error;
mod memory;
mod message;

pub use memory::MemoryMessageRepository;
pub use message::PgMessageRepository;
