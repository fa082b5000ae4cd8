//! Viewer ID - opaque handle for a feed consumer

use serde::{Deserialize, Serialize};
use std::fmt;

use super::message_id::IdParseError;

/// Identifier of a single logical viewer.
///
/// There is no account model behind it; a viewer is whoever holds the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ViewerId(String);

impl ViewerId {
    /// Maximum accepted length
    pub const MAX_LEN: usize = 64;

    /// Parse and validate a viewer id
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        let valid = !s.is_empty()
            && s.len() <= Self::MAX_LEN
            && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(IdParseError::InvalidViewer)
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ViewerId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewerId::parse(s)
    }
}

impl TryFrom<String> for ViewerId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ViewerId::parse(&value)
    }
}

impl From<ViewerId> for String {
    fn from(id: ViewerId) -> Self {
        id.0
    }
}
