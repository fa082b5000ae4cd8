//! Entity to model mappers
//!
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert`/`*Binds` structs: Prepare entity data for database operations

mod message;

pub use message::{DeltaBinds, MessageInsert};
