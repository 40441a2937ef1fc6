//! Backend selection at bootstrap.

use super::http::HttpTransport;
use super::local::{LocalStoreAdapter, SeedData};
use super::realtime::{MemoryDocumentStore, RealtimeAdapter};
use super::rest::{RestAdapter, TransportError};
use super::{
    AdapterError, AdapterResult, BackendKind, PersistenceAdapter, RefreshTrigger, SnapshotOrder,
    Subscription,
};
use crate::config::BoardConfig;
use crate::model::id::EntityId;
use crate::model::link::{Link, LinkDraft};
use crate::model::notice::Notice;
use crate::repo::kv_repo::{RepoError, SqliteKeyValueRepository};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Failure to construct the configured backend.
#[derive(Debug)]
pub enum BootstrapError {
    Storage(RepoError),
    Seed(AdapterError),
    Transport(TransportError),
    MissingApiBase,
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "failed to open local store: {err}"),
            Self::Seed(err) => write!(f, "failed to seed local store: {err}"),
            Self::Transport(err) => write!(f, "{err}"),
            Self::MissingApiBase => write!(f, "rest backend requires an API base URL"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Seed(err) => Some(err),
            Self::Transport(err) => Some(err),
            Self::MissingApiBase => None,
        }
    }
}

/// The active backend, chosen from configuration.
pub enum AnyAdapter {
    Local(LocalStoreAdapter<SqliteKeyValueRepository>),
    Realtime(RealtimeAdapter),
    Rest(RestAdapter<HttpTransport>),
}

impl AnyAdapter {
    /// Builds the backend named by `config`.
    ///
    /// The local store opens `db_path` (in-memory when unset) and seeds absent
    /// keys from `links.json` / `notice.txt` in `seed_dir` when configured.
    pub fn from_config(config: &BoardConfig) -> Result<Self, BootstrapError> {
        let adapter = match config.backend {
            BackendKind::Local => {
                let repo = match &config.db_path {
                    Some(path) => SqliteKeyValueRepository::open(path),
                    None => SqliteKeyValueRepository::in_memory(),
                }
                .map_err(BootstrapError::Storage)?;
                let seed = match &config.seed_dir {
                    Some(dir) => read_seed(dir),
                    None => SeedData::default(),
                };
                Self::Local(LocalStoreAdapter::with_seed(repo, seed).map_err(BootstrapError::Seed)?)
            }
            BackendKind::Realtime => Self::Realtime(RealtimeAdapter::new(MemoryDocumentStore::new())),
            BackendKind::Rest => {
                let base = config
                    .api_base
                    .as_deref()
                    .ok_or(BootstrapError::MissingApiBase)?;
                let transport = HttpTransport::new(base).map_err(BootstrapError::Transport)?;
                Self::Rest(RestAdapter::new(transport))
            }
        };
        info!(
            "event=backend_select module=adapter status=ok backend={}",
            adapter.backend_kind()
        );
        Ok(adapter)
    }
}

fn read_seed(dir: &Path) -> SeedData {
    let read = |name: &str| match std::fs::read_to_string(dir.join(name)) {
        Ok(text) => Some(text),
        Err(err) => {
            warn!("event=seed_read module=adapter status=skip document={name} error={err}");
            None
        }
    };
    let links = read("links.json");
    let notices = read("notice.txt");
    SeedData::from_documents(links.as_deref(), notices.as_deref())
}

macro_rules! delegate {
    ($self:ident, $adapter:ident => $call:expr) => {
        match $self {
            AnyAdapter::Local($adapter) => $call,
            AnyAdapter::Realtime($adapter) => $call,
            AnyAdapter::Rest($adapter) => $call,
        }
    };
}

impl PersistenceAdapter for AnyAdapter {
    fn backend_kind(&self) -> BackendKind {
        delegate!(self, adapter => adapter.backend_kind())
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        delegate!(self, adapter => adapter.refresh_trigger())
    }

    fn snapshot_order(&self) -> SnapshotOrder {
        delegate!(self, adapter => adapter.snapshot_order())
    }

    async fn list_links(&self) -> AdapterResult<Vec<Link>> {
        delegate!(self, adapter => adapter.list_links().await)
    }

    async fn create_link(&self, draft: &LinkDraft) -> AdapterResult<Link> {
        delegate!(self, adapter => adapter.create_link(draft).await)
    }

    async fn delete_link(&self, id: &EntityId) -> AdapterResult<()> {
        delegate!(self, adapter => adapter.delete_link(id).await)
    }

    async fn update_link_note(&self, id: &EntityId, note: &str) -> AdapterResult<()> {
        delegate!(self, adapter => adapter.update_link_note(id, note).await)
    }

    async fn list_notices(&self) -> AdapterResult<Vec<Notice>> {
        delegate!(self, adapter => adapter.list_notices().await)
    }

    async fn create_notice(&self, text: &str) -> AdapterResult<()> {
        delegate!(self, adapter => adapter.create_notice(text).await)
    }

    async fn delete_notice(&self, id: &EntityId) -> AdapterResult<()> {
        delegate!(self, adapter => adapter.delete_notice(id).await)
    }

    async fn clear_notices(&self) -> AdapterResult<()> {
        delegate!(self, adapter => adapter.clear_notices().await)
    }

    fn subscribe(&self) -> Subscription {
        delegate!(self, adapter => adapter.subscribe())
    }
}
