//! Axum extractors for request handling
//!
//! Custom extractors for validation, path ids, query strings and multipart
//! message forms.

mod form;
mod path;
mod query;
mod validated;

pub use form::{read_upload, MessageForm, FILE_FIELD, MESSAGE_FIELD};
pub use path::{MessageIdPath, ReactionPath, ViewerMessagePath, ViewerPath};
pub use query::QueryParams;
pub(crate) use validated::json_rejection;
pub use validated::{OptionalValidatedJson, ValidatedJson};
