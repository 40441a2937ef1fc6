//! Persistence adapters: one contract over three backend strategies.
//!
//! # Responsibility
//! - Define the capability set every backend satisfies.
//! - Tag each backend with how its refreshes are triggered and in which
//!   order it returns collections, so the store stays backend-agnostic.
//!
//! # Invariants
//! - Push backends deliver a full collection snapshot after every mutation,
//!   including mutations made by this client.
//! - Pull backends never push; callers re-fetch after each mutation.
//! - Errors are tagged transient (retry-safe) or rejected.

mod any;
mod error;
pub mod http;
pub mod local;
pub mod realtime;
pub mod rest;
mod subscription;

pub use any::{AnyAdapter, BootstrapError};
pub use error::{AdapterError, AdapterResult};
pub use subscription::{ChangeEvent, Subscription};

use crate::model::id::EntityId;
use crate::model::link::{Link, LinkDraft};
use crate::model::notice::Notice;
use std::fmt::{Display, Formatter};

/// Which persistence strategy is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Browser-local key-value store; completes synchronously.
    Local,
    /// Realtime document store; pushes snapshots.
    Realtime,
    /// Server-side REST API; request/response.
    Rest,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Realtime => "realtime",
            Self::Rest => "rest",
        }
    }

    /// Parses a configuration value (`local|realtime|rest`, case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "realtime" => Some(Self::Realtime),
            "rest" => Some(Self::Rest),
            _ => None,
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who drives a refresh after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// The backend's subscription delivers the new snapshot.
    Push,
    /// The mutating call site must re-fetch.
    CallSite,
}

/// Order in which a backend returns a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrder {
    /// Insertion order; presentation must reverse it.
    OldestFirst,
    /// Already in presentation order (newest creation time first).
    NewestFirst,
}

/// Capability set shared by every backend.
///
/// Futures are polled on a single logical thread and are not required to be
/// `Send`.
#[allow(async_fn_in_trait)]
pub trait PersistenceAdapter {
    fn backend_kind(&self) -> BackendKind;
    fn refresh_trigger(&self) -> RefreshTrigger;
    fn snapshot_order(&self) -> SnapshotOrder;

    async fn list_links(&self) -> AdapterResult<Vec<Link>>;
    /// Persists a normalized draft and returns it with its assigned id.
    async fn create_link(&self, draft: &LinkDraft) -> AdapterResult<Link>;
    async fn delete_link(&self, id: &EntityId) -> AdapterResult<()>;
    /// Replaces the note; an empty `note` clears it.
    async fn update_link_note(&self, id: &EntityId, note: &str) -> AdapterResult<()>;

    async fn list_notices(&self) -> AdapterResult<Vec<Notice>>;
    async fn create_notice(&self, text: &str) -> AdapterResult<()>;
    async fn delete_notice(&self, id: &EntityId) -> AdapterResult<()>;
    async fn clear_notices(&self) -> AdapterResult<()>;

    /// Attaches a change listener. Pull backends return an inactive handle.
    fn subscribe(&self) -> Subscription;
}
