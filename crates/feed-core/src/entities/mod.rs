//! Domain entities - core business objects

mod message;
mod reaction;

pub use message::{Message, MessagePatch, MessageType, NewMessage};
pub use reaction::{CounterDelta, ReactionCounts, ReactionKind, ReactionState, ReactionTransition};
