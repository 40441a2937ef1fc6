//! Tagged backend errors.

use super::BackendKind;
use crate::model::id::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AdapterResult<T> = Result<T, AdapterError>;

/// Failure reported by a persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// Backend unavailable or network failure; the same call may succeed later.
    Transient {
        backend: BackendKind,
        message: String,
    },
    /// The backend refused the input (for example a malformed URL).
    Rejected {
        backend: BackendKind,
        message: String,
    },
    /// The targeted entity does not exist on the backend.
    NotFound { backend: BackendKind, id: EntityId },
}

impl AdapterError {
    pub fn transient(backend: BackendKind, message: impl Into<String>) -> Self {
        Self::Transient {
            backend,
            message: message.into(),
        }
    }

    pub fn rejected(backend: BackendKind, message: impl Into<String>) -> Self {
        Self::Rejected {
            backend,
            message: message.into(),
        }
    }

    pub fn not_found(backend: BackendKind, id: &EntityId) -> Self {
        Self::NotFound {
            backend,
            id: id.clone(),
        }
    }

    pub fn backend(&self) -> BackendKind {
        match self {
            Self::Transient { backend, .. }
            | Self::Rejected { backend, .. }
            | Self::NotFound { backend, .. } => *backend,
        }
    }

    /// Whether re-triggering the same action may succeed.
    pub fn is_retry_safe(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transient { .. } => "transient",
            Self::Rejected { .. } => "rejected",
            Self::NotFound { .. } => "not_found",
        }
    }
}

impl Display for AdapterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transient { message, .. } => write!(f, "backend unavailable: {message}"),
            Self::Rejected { message, .. } => write!(f, "{message}"),
            Self::NotFound { id, .. } => write!(f, "item not found: {id}"),
        }
    }
}

impl Error for AdapterError {}
