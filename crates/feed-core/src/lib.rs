//! # feed-core
//!
//! Domain layer for the broadcast feed: message and reaction entities, value
//! objects, the link tokenizer, and the store/storage traits (ports).
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod text;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    CounterDelta, Message, MessagePatch, MessageType, NewMessage, ReactionCounts, ReactionKind,
    ReactionState, ReactionTransition,
};
pub use error::DomainError;
pub use text::{links, tokenize, Segment};
pub use traits::{MediaIngestor, MediaUpload, MessageRepository, RepoResult, ViewerStorage};
pub use value_objects::{IdParseError, MessageId, ViewerId};
