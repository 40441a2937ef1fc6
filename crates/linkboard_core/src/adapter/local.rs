//! Browser-local key-value store backend.
//!
//! # Responsibility
//! - Keep both collections as JSON documents under fixed keys.
//! - Assign sequential link ids and random notice tokens.
//! - Seed empty keys once from server-provided data.
//!
//! # Invariants
//! - Every call completes without suspending; a successful return means the
//!   mutation is already committed (always-committed optimistic update).
//! - Stored order is insertion order (oldest first).
//! - Link ids are `max(existing) + 1`, starting at 1.

use super::{
    AdapterError, AdapterResult, BackendKind, PersistenceAdapter, RefreshTrigger, SnapshotOrder,
    Subscription,
};
use crate::model::id::EntityId;
use crate::model::link::{Link, LinkDraft};
use crate::model::notice::{epoch_seconds_now, Notice};
use crate::repo::kv_repo::{KeyValueRepository, RepoError, SqliteKeyValueRepository};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

/// Storage key holding the links document.
pub const LINKS_KEY: &str = "site_links";
/// Storage key holding the notices document.
pub const NOTICES_KEY: &str = "site_notices";

const BACKEND: BackendKind = BackendKind::Local;

/// Server-rendered data used to seed an empty local store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedData {
    pub links: Option<Vec<Link>>,
    pub notices: Option<Vec<Notice>>,
}

impl SeedData {
    /// Builds seed data from the exported `links.json` and `notice.txt`
    /// documents.
    ///
    /// An unreadable links document is ignored with a warning, matching a
    /// failed static fetch.
    pub fn from_documents(links_json: Option<&str>, notice_txt: Option<&str>) -> Self {
        let links = links_json.and_then(|text| match serde_json::from_str::<Vec<Link>>(text) {
            Ok(links) => Some(links),
            Err(err) => {
                warn!("event=seed_parse module=local status=error document=links error={err}");
                None
            }
        });
        let notices = notice_txt.map(|text| parse_notice_document(text, epoch_seconds_now()));
        Self { links, notices }
    }
}

/// Parses a `notice.txt` document.
///
/// Accepts the JSON list written by export, or legacy plain text, which
/// becomes one notice holding the trimmed text. Blank input yields nothing.
pub fn parse_notice_document(text: &str, now: f64) -> Vec<Notice> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if let Ok(notices) = serde_json::from_str::<Vec<Notice>>(trimmed) {
        return notices;
    }
    vec![Notice::new(new_token(), trimmed, now)]
}

/// Local backend over any key-value repository.
pub struct LocalStoreAdapter<R = SqliteKeyValueRepository> {
    repo: R,
}

impl<R: KeyValueRepository> LocalStoreAdapter<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates the adapter and seeds every absent key from `seed`.
    ///
    /// Keys that already exist keep their content; the browser copy wins over
    /// a fresh deployment once the user has edited anything.
    pub fn with_seed(repo: R, seed: SeedData) -> AdapterResult<Self> {
        let adapter = Self::new(repo);
        if let Some(links) = seed.links {
            adapter.seed_key(LINKS_KEY, &links)?;
        }
        if let Some(notices) = seed.notices {
            adapter.seed_key(NOTICES_KEY, &notices)?;
        }
        Ok(adapter)
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    fn seed_key<T: Serialize>(&self, key: &str, items: &[T]) -> AdapterResult<()> {
        if self.repo.get(key).map_err(storage_error)?.is_some() {
            debug!("event=seed_skip module=local status=ok key={key}");
            return Ok(());
        }
        self.write(key, items)?;
        info!(
            "event=seed_apply module=local status=ok key={key} count={}",
            items.len()
        );
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> AdapterResult<Vec<T>> {
        match self.repo.get(key).map_err(storage_error)? {
            None => Ok(Vec::new()),
            Some(text) => serde_json::from_str(&text).map_err(|err| {
                storage_error(RepoError::InvalidData(format!("`{key}`: {err}")))
            }),
        }
    }

    fn write<T: Serialize>(&self, key: &str, items: &[T]) -> AdapterResult<()> {
        let text = serde_json::to_string(items).map_err(|err| {
            AdapterError::transient(BACKEND, format!("failed to encode `{key}`: {err}"))
        })?;
        self.repo.set(key, &text).map_err(storage_error)
    }
}

impl<R: KeyValueRepository> PersistenceAdapter for LocalStoreAdapter<R> {
    fn backend_kind(&self) -> BackendKind {
        BACKEND
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::CallSite
    }

    fn snapshot_order(&self) -> SnapshotOrder {
        SnapshotOrder::OldestFirst
    }

    async fn list_links(&self) -> AdapterResult<Vec<Link>> {
        self.read(LINKS_KEY)
    }

    async fn create_link(&self, draft: &LinkDraft) -> AdapterResult<Link> {
        if Url::parse(&draft.url).is_err() {
            return Err(AdapterError::rejected(
                BACKEND,
                format!("malformed URL: {}", draft.url),
            ));
        }

        let mut links: Vec<Link> = self.read(LINKS_KEY)?;
        let next_id = links
            .iter()
            .filter_map(|link| link.id.as_sequential())
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| AdapterError::rejected(BACKEND, "link id space exhausted"))?;
        let link = Link::from_draft(EntityId::Sequential(next_id), draft.clone());
        links.push(link.clone());
        self.write(LINKS_KEY, &links)?;
        Ok(link)
    }

    async fn delete_link(&self, id: &EntityId) -> AdapterResult<()> {
        let mut links: Vec<Link> = self.read(LINKS_KEY)?;
        let before = links.len();
        links.retain(|link| &link.id != id);
        if links.len() == before {
            return Err(AdapterError::not_found(BACKEND, id));
        }
        self.write(LINKS_KEY, &links)
    }

    async fn update_link_note(&self, id: &EntityId, note: &str) -> AdapterResult<()> {
        let mut links: Vec<Link> = self.read(LINKS_KEY)?;
        let link = links
            .iter_mut()
            .find(|link| &link.id == id)
            .ok_or_else(|| AdapterError::not_found(BACKEND, id))?;
        link.note = Some(note.to_string()).filter(|text| !text.is_empty());
        self.write(LINKS_KEY, &links)
    }

    async fn list_notices(&self) -> AdapterResult<Vec<Notice>> {
        self.read(NOTICES_KEY)
    }

    async fn create_notice(&self, text: &str) -> AdapterResult<()> {
        let mut notices: Vec<Notice> = self.read(NOTICES_KEY)?;
        notices.push(Notice::new(new_token(), text, epoch_seconds_now()));
        self.write(NOTICES_KEY, &notices)
    }

    async fn delete_notice(&self, id: &EntityId) -> AdapterResult<()> {
        let mut notices: Vec<Notice> = self.read(NOTICES_KEY)?;
        let before = notices.len();
        notices.retain(|notice| &notice.id != id);
        if notices.len() == before {
            return Err(AdapterError::not_found(BACKEND, id));
        }
        self.write(NOTICES_KEY, &notices)
    }

    async fn clear_notices(&self) -> AdapterResult<()> {
        self.write::<Notice>(NOTICES_KEY, &[])
    }

    fn subscribe(&self) -> Subscription {
        Subscription::inactive()
    }
}

fn new_token() -> EntityId {
    EntityId::Token(Uuid::new_v4().to_string())
}

fn storage_error(err: RepoError) -> AdapterError {
    match err {
        RepoError::Sqlite(_) => AdapterError::transient(BACKEND, err.to_string()),
        RepoError::UnsupportedLayout { .. } | RepoError::InvalidData(_) => {
            AdapterError::rejected(BACKEND, err.to_string())
        }
    }
}
