//! Backend-scoped identifiers for links and notices.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque identifier assigned by the active backend.
///
/// The local store hands out sequential integers; the realtime store and the
/// REST API use generated tokens. Serialized untagged, so stored documents
/// keep a bare JSON number or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Sequential(i64),
    Token(String),
}

impl EntityId {
    /// Parses an id carried as text (for example a `data-id` attribute).
    ///
    /// Integer-shaped values map to `Sequential`, everything else to `Token`.
    /// Returns `None` for blank input.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<i64>() {
            Ok(number) => Some(Self::Sequential(number)),
            Err(_) => Some(Self::Token(trimmed.to_string())),
        }
    }

    /// Returns the sequential value, if this is a local-store id.
    pub fn as_sequential(&self) -> Option<i64> {
        match self {
            Self::Sequential(value) => Some(*value),
            Self::Token(_) => None,
        }
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential(value) => write!(f, "{value}"),
            Self::Token(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Sequential(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::Token(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::Token(value)
    }
}
