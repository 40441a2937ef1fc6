//! Core domain logic for linkboard.
//! Data sync and rendering layer of a bookmarking board, independent of
//! which backend holds the authoritative state.

pub mod adapter;
pub mod auth;
pub mod config;
pub mod edit;
pub mod export;
pub mod linker;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;
pub mod store;
pub mod ui;

pub use adapter::{
    AdapterError, AdapterResult, AnyAdapter, BackendKind, BootstrapError, ChangeEvent,
    PersistenceAdapter, RefreshTrigger, SnapshotOrder, Subscription,
};
pub use config::{BoardConfig, ConfigError, LogSettings};
pub use edit::{EditError, EditSession, EditSessions, EditState, OpenOutcome};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::id::EntityId;
pub use model::link::{Link, LinkDraft, ValidationError};
pub use model::notice::Notice;
pub use render::{render, render_board, UiAction, View};
pub use repo::kv_repo::{KeyValueRepository, RepoError, RepoResult, SqliteKeyValueRepository};
pub use service::board::{Board, BoardError, Outcome};
pub use store::{Committed, DataStore, Snapshot, StoreError, StoreUpdate};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
