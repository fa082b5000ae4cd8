//! Value objects - immutable types that represent domain concepts

mod message_id;
mod viewer_id;

pub use message_id::{IdParseError, MessageId};
pub use viewer_id::ViewerId;
