//! In-memory mirror of backend state.
//!
//! # Responsibility
//! - Hold the current links and notices snapshots.
//! - Turn user intents into adapter calls and refresh afterwards.
//! - Apply pushed snapshots from subscribed backends.
//!
//! # Invariants
//! - Snapshots are only replaced wholesale, and only after the adapter call
//!   that produced the replacement succeeded. A failed call leaves the
//!   previous snapshot visible.
//! - Nothing is patched locally: after a committed mutation, call-site
//!   backends are re-fetched and push backends are left to their listener.
//! - Local validation failures never reach the adapter.
//! - A committed mutation whose re-fetch failed is reported to the caller
//!   and keeps the dirty flag set.

mod snapshot;

pub use snapshot::Snapshot;

use crate::adapter::{
    AdapterError, AdapterResult, ChangeEvent, PersistenceAdapter, RefreshTrigger,
};
use crate::model::id::EntityId;
use crate::model::link::{Link, LinkDraft, ValidationError};
use crate::model::notice::Notice;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a store intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Rejected locally; the adapter was not called.
    Validation(ValidationError),
    /// The id is not in the current links snapshot; the adapter was not called.
    UnknownLink(EntityId),
    /// The id is not in the current notices snapshot; the adapter was not called.
    UnknownNotice(EntityId),
    Adapter(AdapterError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UnknownLink(id) => write!(f, "link {id} is not on the board"),
            Self::UnknownNotice(id) => write!(f, "notice {id} is not on the board"),
            Self::Adapter(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Adapter(err) => Some(err),
            Self::UnknownLink(_) | Self::UnknownNotice(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AdapterError> for StoreError {
    fn from(value: AdapterError) -> Self {
        Self::Adapter(value)
    }
}

/// A committed mutation and the outcome of the re-fetch that followed it.
///
/// `reload` is `Ok` for push backends, which refresh through their listener.
/// An `Err` means the backend holds the change but the snapshot is stale.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    pub value: T,
    pub reload: AdapterResult<()>,
}

impl<T> Committed<T> {
    pub fn reload_error(&self) -> Option<&AdapterError> {
        self.reload.as_ref().err()
    }
}

/// What a pushed event changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUpdate {
    Links,
    Notices,
    /// The listener failed; both snapshots were kept.
    ListenerFailed(AdapterError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Links,
    Notices,
}

impl Collection {
    fn as_str(self) -> &'static str {
        match self {
            Self::Links => "links",
            Self::Notices => "notices",
        }
    }
}

/// Authoritative in-memory mirror over one adapter.
pub struct DataStore<A> {
    adapter: A,
    links: Snapshot<Link>,
    notices: Snapshot<Notice>,
    revision: u64,
    links_dirty: bool,
    notices_dirty: bool,
}

impl<A: PersistenceAdapter> DataStore<A> {
    /// Creates a store with empty snapshots; call `refresh_all` to load.
    pub fn new(adapter: A) -> Self {
        let order = adapter.snapshot_order();
        Self {
            adapter,
            links: Snapshot::empty(order),
            notices: Snapshot::empty(order),
            revision: 0,
            links_dirty: false,
            notices_dirty: false,
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn links(&self) -> &Snapshot<Link> {
        &self.links
    }

    pub fn notices(&self) -> &Snapshot<Notice> {
        &self.notices
    }

    pub fn find_link(&self, id: &EntityId) -> Option<&Link> {
        self.links.items().iter().find(|link| &link.id == id)
    }

    pub fn find_notice(&self, id: &EntityId) -> Option<&Notice> {
        self.notices.items().iter().find(|notice| &notice.id == id)
    }

    /// True when a committed mutation is not yet reflected in a snapshot.
    pub fn is_dirty(&self) -> bool {
        self.links_dirty || self.notices_dirty
    }

    /// Replaces the links snapshot with the adapter's current collection.
    pub async fn refresh_links(&mut self) -> AdapterResult<()> {
        match self.adapter.list_links().await {
            Ok(links) => {
                self.swap_links(links);
                Ok(())
            }
            Err(err) => {
                self.log_refresh_failure(Collection::Links, &err);
                Err(err)
            }
        }
    }

    /// Replaces the notices snapshot with the adapter's current collection.
    pub async fn refresh_notices(&mut self) -> AdapterResult<()> {
        match self.adapter.list_notices().await {
            Ok(notices) => {
                self.swap_notices(notices);
                Ok(())
            }
            Err(err) => {
                self.log_refresh_failure(Collection::Notices, &err);
                Err(err)
            }
        }
    }

    /// Refreshes both collections; the first failure is returned after both
    /// were attempted.
    pub async fn refresh_all(&mut self) -> AdapterResult<()> {
        let links = self.refresh_links().await;
        let notices = self.refresh_notices().await;
        links.and(notices)
    }

    /// Applies one pushed event.
    pub fn apply_event(&mut self, event: ChangeEvent) -> StoreUpdate {
        match event {
            ChangeEvent::Links(links) => {
                self.swap_links(links);
                StoreUpdate::Links
            }
            ChangeEvent::Notices(notices) => {
                self.swap_notices(notices);
                StoreUpdate::Notices
            }
            ChangeEvent::ListenerFailed(err) => {
                warn!(
                    "event=listener_failed module=store status=error backend={} error_code={}",
                    err.backend(),
                    err.code()
                );
                StoreUpdate::ListenerFailed(err)
            }
        }
    }

    /// Validates and publishes a new link.
    ///
    /// Returns the link as assigned by the backend.
    ///
    /// Mutations return `Err` only when nothing was committed. A failed
    /// re-fetch after a committed write is carried in `Committed::reload`.
    pub async fn create_link(&mut self, draft: &LinkDraft) -> StoreResult<Committed<Link>> {
        let draft = draft.normalized()?;
        let link = self.adapter.create_link(&draft).await?;
        info!(
            "event=link_create module=store status=ok backend={} link_id={}",
            self.adapter.backend_kind(),
            link.id
        );
        let reload = self.after_commit(Collection::Links).await;
        Ok(Committed {
            value: link,
            reload,
        })
    }

    pub async fn delete_link(&mut self, id: &EntityId) -> StoreResult<Committed<()>> {
        if self.find_link(id).is_none() {
            return Err(StoreError::UnknownLink(id.clone()));
        }
        self.adapter.delete_link(id).await?;
        info!(
            "event=link_delete module=store status=ok backend={} link_id={id}",
            self.adapter.backend_kind()
        );
        let reload = self.after_commit(Collection::Links).await;
        Ok(Committed { value: (), reload })
    }

    pub async fn update_link_note(&mut self, id: &EntityId, note: &str) -> StoreResult<Committed<()>> {
        if self.find_link(id).is_none() {
            return Err(StoreError::UnknownLink(id.clone()));
        }
        self.adapter.update_link_note(id, note).await?;
        info!(
            "event=link_note_update module=store status=ok backend={} link_id={id} note_chars={}",
            self.adapter.backend_kind(),
            note.chars().count()
        );
        let reload = self.after_commit(Collection::Links).await;
        Ok(Committed { value: (), reload })
    }

    /// Publishes a notice. Blank text is a validation error.
    pub async fn create_notice(&mut self, text: &str) -> StoreResult<Committed<()>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::Validation(ValidationError::EmptyNotice));
        }
        self.adapter.create_notice(text).await?;
        info!(
            "event=notice_create module=store status=ok backend={}",
            self.adapter.backend_kind()
        );
        let reload = self.after_commit(Collection::Notices).await;
        Ok(Committed { value: (), reload })
    }

    pub async fn delete_notice(&mut self, id: &EntityId) -> StoreResult<Committed<()>> {
        if self.find_notice(id).is_none() {
            return Err(StoreError::UnknownNotice(id.clone()));
        }
        self.adapter.delete_notice(id).await?;
        info!(
            "event=notice_delete module=store status=ok backend={} notice_id={id}",
            self.adapter.backend_kind()
        );
        let reload = self.after_commit(Collection::Notices).await;
        Ok(Committed { value: (), reload })
    }

    pub async fn clear_notices(&mut self) -> StoreResult<Committed<()>> {
        self.adapter.clear_notices().await?;
        info!(
            "event=notice_clear module=store status=ok backend={} cleared={}",
            self.adapter.backend_kind(),
            self.notices.len()
        );
        let reload = self.after_commit(Collection::Notices).await;
        Ok(Committed { value: (), reload })
    }

    async fn after_commit(&mut self, collection: Collection) -> AdapterResult<()> {
        if self.adapter.refresh_trigger() == RefreshTrigger::Push {
            debug!(
                "event=refresh_deferred module=store status=ok collection={}",
                collection.as_str()
            );
            return Ok(());
        }

        // Stays dirty until a later refresh succeeds.
        match collection {
            Collection::Links => {
                self.links_dirty = true;
                self.refresh_links().await
            }
            Collection::Notices => {
                self.notices_dirty = true;
                self.refresh_notices().await
            }
        }
    }

    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    fn swap_links(&mut self, links: Vec<Link>) {
        warn_on_duplicate_ids(Collection::Links, links.iter().map(|link| &link.id));
        let revision = self.next_revision();
        debug!(
            "event=store_refresh module=store status=ok collection=links count={} revision={revision}",
            links.len()
        );
        self.links = Snapshot::new(links, self.adapter.snapshot_order(), revision);
        self.links_dirty = false;
    }

    fn swap_notices(&mut self, notices: Vec<Notice>) {
        warn_on_duplicate_ids(Collection::Notices, notices.iter().map(|notice| &notice.id));
        let revision = self.next_revision();
        debug!(
            "event=store_refresh module=store status=ok collection=notices count={} revision={revision}",
            notices.len()
        );
        self.notices = Snapshot::new(notices, self.adapter.snapshot_order(), revision);
        self.notices_dirty = false;
    }

    fn log_refresh_failure(&self, collection: Collection, err: &AdapterError) {
        warn!(
            "event=store_refresh module=store status=error collection={} backend={} error_code={} retry_safe={}",
            collection.as_str(),
            err.backend(),
            err.code(),
            err.is_retry_safe()
        );
    }
}

fn warn_on_duplicate_ids<'a>(collection: Collection, ids: impl Iterator<Item = &'a EntityId>) {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            warn!(
                "event=duplicate_id module=store status=error collection={} id={id}",
                collection.as_str()
            );
        }
    }
}
