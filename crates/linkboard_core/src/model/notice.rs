//! Notice domain model.

use super::id::EntityId;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Short announcement shown in the notices banner.
///
/// `content` may embed inline markup (cross-links produced by the notice
/// linker) and is rendered as trusted markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: EntityId,
    pub content: String,
    /// Unix epoch seconds, fractional. Legacy documents may omit it.
    #[serde(default)]
    pub created_at: f64,
}

impl Notice {
    pub fn new(id: EntityId, content: impl Into<String>, created_at: f64) -> Self {
        Self {
            id,
            content: content.into(),
            created_at,
        }
    }
}

/// Current wall-clock time in the unit stored in `Notice::created_at`.
pub fn epoch_seconds_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}
