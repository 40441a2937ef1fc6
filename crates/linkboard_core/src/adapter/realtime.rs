//! Realtime document store backend.
//!
//! # Responsibility
//! - Hold the `links` and `notices` collections of a realtime document store.
//! - Push the full, newest-first collection to every attached listener after
//!   each mutation, including mutations made through the same adapter.
//!
//! # Invariants
//! - Documents are ordered by creation time, newest first; ties keep the
//!   later write first.
//! - Listeners receive the current collections as soon as they attach.
//! - A detached listener never receives another event.
//!
//! `MemoryDocumentStore` is the in-process store client. Clones share the
//! same documents, so several `RealtimeAdapter`s over clones model several
//! browser clients of one cloud project.

use super::{
    AdapterError, AdapterResult, BackendKind, ChangeEvent, PersistenceAdapter, RefreshTrigger,
    SnapshotOrder, Subscription,
};
use crate::model::id::EntityId;
use crate::model::link::{Link, LinkDraft};
use crate::model::notice::{epoch_seconds_now, Notice};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use url::Url;
use uuid::Uuid;

const BACKEND: BackendKind = BackendKind::Realtime;

#[derive(Debug, Clone)]
struct StoredLink {
    link: Link,
    created_at: f64,
    sequence: u64,
}

#[derive(Debug, Clone)]
struct StoredNotice {
    notice: Notice,
    sequence: u64,
}

#[derive(Default)]
struct DocumentState {
    links: Vec<StoredLink>,
    notices: Vec<StoredNotice>,
    listeners: BTreeMap<u64, UnboundedSender<ChangeEvent>>,
    next_listener_id: u64,
    next_sequence: u64,
    offline: bool,
}

impl DocumentState {
    fn next_sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    fn links_newest_first(&self) -> Vec<Link> {
        let mut stored: Vec<&StoredLink> = self.links.iter().collect();
        stored.sort_by(|a, b| {
            b.created_at
                .total_cmp(&a.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });
        stored.into_iter().map(|entry| entry.link.clone()).collect()
    }

    fn notices_newest_first(&self) -> Vec<Notice> {
        let mut stored: Vec<&StoredNotice> = self.notices.iter().collect();
        stored.sort_by(|a, b| {
            b.notice
                .created_at
                .total_cmp(&a.notice.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });
        stored.into_iter().map(|entry| entry.notice.clone()).collect()
    }

    fn broadcast(&mut self, event: ChangeEvent) {
        self.listeners
            .retain(|_, listener| listener.send(event.clone()).is_ok());
    }

    fn broadcast_links(&mut self) {
        let links = self.links_newest_first();
        self.broadcast(ChangeEvent::Links(links));
    }

    fn broadcast_notices(&mut self) {
        let notices = self.notices_newest_first();
        self.broadcast(ChangeEvent::Notices(notices));
    }
}

/// Shared handle to one realtime document store.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    state: Arc<Mutex<DocumentState>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing (or regaining) the connection to the store.
    ///
    /// While offline every call fails with a transient error.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.offline = offline;
        }
    }

    /// Delivers a listener failure to every attached listener.
    pub fn fail_listeners(&self, message: &str) {
        if let Ok(mut state) = self.state.lock() {
            warn!("event=listener_failed module=realtime status=error");
            state.broadcast(ChangeEvent::ListenerFailed(AdapterError::transient(
                BACKEND, message,
            )));
        }
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.state.lock().map(|state| state.listeners.len()).unwrap_or(0)
    }

    fn online(&self) -> AdapterResult<MutexGuard<'_, DocumentState>> {
        let state = self
            .state
            .lock()
            .map_err(|_| AdapterError::transient(BACKEND, "document store lock poisoned"))?;
        if state.offline {
            return Err(AdapterError::transient(
                BACKEND,
                "document store is unreachable",
            ));
        }
        Ok(state)
    }

    fn attach(&self) -> Subscription {
        let (sender, receiver) = unbounded_channel();
        let listener_id = match self.state.lock() {
            Ok(mut state) => {
                state.next_listener_id += 1;
                let listener_id = state.next_listener_id;
                // Initial snapshots, as a realtime listener reports on attach.
                let _ = sender.send(ChangeEvent::Links(state.links_newest_first()));
                let _ = sender.send(ChangeEvent::Notices(state.notices_newest_first()));
                state.listeners.insert(listener_id, sender);
                listener_id
            }
            Err(_) => {
                let _ = sender.send(ChangeEvent::ListenerFailed(AdapterError::transient(
                    BACKEND,
                    "document store lock poisoned",
                )));
                return Subscription::active(receiver, || {});
            }
        };
        debug!("event=listener_attach module=realtime status=ok listener_id={listener_id}");

        let state = Arc::downgrade(&self.state);
        Subscription::active(receiver, move || {
            if let Some(state) = state.upgrade() {
                if let Ok(mut state) = state.lock() {
                    state.listeners.remove(&listener_id);
                    debug!(
                        "event=listener_detach module=realtime status=ok listener_id={listener_id}"
                    );
                }
            }
        })
    }
}

/// Push backend over a realtime document store.
pub struct RealtimeAdapter {
    store: MemoryDocumentStore,
}

impl RealtimeAdapter {
    pub fn new(store: MemoryDocumentStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &MemoryDocumentStore {
        &self.store
    }
}

impl PersistenceAdapter for RealtimeAdapter {
    fn backend_kind(&self) -> BackendKind {
        BACKEND
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::Push
    }

    fn snapshot_order(&self) -> SnapshotOrder {
        SnapshotOrder::NewestFirst
    }

    async fn list_links(&self) -> AdapterResult<Vec<Link>> {
        Ok(self.store.online()?.links_newest_first())
    }

    async fn create_link(&self, draft: &LinkDraft) -> AdapterResult<Link> {
        if draft.url.trim().is_empty() || draft.title.trim().is_empty() {
            return Err(AdapterError::rejected(BACKEND, "url and title are required"));
        }
        if Url::parse(&draft.url).is_err() {
            return Err(AdapterError::rejected(
                BACKEND,
                format!("malformed URL: {}", draft.url),
            ));
        }

        let mut state = self.store.online()?;
        let link = Link::from_draft(new_token(), draft.clone());
        let sequence = state.next_sequence();
        state.links.push(StoredLink {
            link: link.clone(),
            created_at: epoch_seconds_now(),
            sequence,
        });
        state.broadcast_links();
        Ok(link)
    }

    async fn delete_link(&self, id: &EntityId) -> AdapterResult<()> {
        let mut state = self.store.online()?;
        let before = state.links.len();
        state.links.retain(|entry| &entry.link.id != id);
        if state.links.len() == before {
            return Err(AdapterError::not_found(BACKEND, id));
        }
        state.broadcast_links();
        Ok(())
    }

    async fn update_link_note(&self, id: &EntityId, note: &str) -> AdapterResult<()> {
        let mut state = self.store.online()?;
        let entry = state
            .links
            .iter_mut()
            .find(|entry| &entry.link.id == id)
            .ok_or_else(|| AdapterError::not_found(BACKEND, id))?;
        entry.link.note = Some(note.to_string()).filter(|text| !text.is_empty());
        state.broadcast_links();
        Ok(())
    }

    async fn list_notices(&self) -> AdapterResult<Vec<Notice>> {
        Ok(self.store.online()?.notices_newest_first())
    }

    async fn create_notice(&self, text: &str) -> AdapterResult<()> {
        let mut state = self.store.online()?;
        let sequence = state.next_sequence();
        state.notices.push(StoredNotice {
            notice: Notice::new(new_token(), text, epoch_seconds_now()),
            sequence,
        });
        state.broadcast_notices();
        Ok(())
    }

    async fn delete_notice(&self, id: &EntityId) -> AdapterResult<()> {
        let mut state = self.store.online()?;
        let before = state.notices.len();
        state.notices.retain(|entry| &entry.notice.id != id);
        if state.notices.len() == before {
            return Err(AdapterError::not_found(BACKEND, id));
        }
        state.broadcast_notices();
        Ok(())
    }

    async fn clear_notices(&self) -> AdapterResult<()> {
        let mut state = self.store.online()?;
        state.notices.clear();
        state.broadcast_notices();
        Ok(())
    }

    fn subscribe(&self) -> Subscription {
        self.store.attach()
    }
}

fn new_token() -> EntityId {
    EntityId::Token(Uuid::new_v4().simple().to_string())
}
