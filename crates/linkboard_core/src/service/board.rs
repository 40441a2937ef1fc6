//! Board application state and use-cases.
//!
//! # Responsibility
//! - Own the store, the open editors, the rendered view and the handles to
//!   auth, confirmation and status collaborators.
//! - Turn every user intent into store calls, status lines and a re-render.
//!
//! # Invariants
//! - Mutating intents require editor rights.
//! - The view is re-projected after every state change; a new links
//!   snapshot drops open editors that are not saving.
//! - User-initiated failures always reach the status sink.

use crate::adapter::{AdapterError, BackendKind, ChangeEvent, PersistenceAdapter, RefreshTrigger, Subscription};
use crate::edit::{EditError, EditSessions, OpenOutcome};
use crate::export::{ExportBundle, ExportError};
use crate::linker::derive_notice;
use crate::logging::{sanitize_message, MAX_LOGGED_TEXT_CHARS};
use crate::model::id::EntityId;
use crate::model::link::{Link, LinkDraft};
use crate::model::notice::Notice;
use crate::render::{render_board, RenderInput, UiAction, View};
use crate::store::{DataStore, Snapshot, StoreError, StoreUpdate};
use crate::ui::{AuthProvider, ConfirmPrompt, StatusMessage, StatusSink};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const CONFIRM_DELETE_LINK: &str = "Delete this link?";
pub const CONFIRM_CLEAR_NOTICES: &str = "Clear all notices?";

/// Board use-case error.
#[derive(Debug)]
pub enum BoardError {
    /// The intent needs editor rights.
    NotEditor,
    Store(StoreError),
    Edit(EditError),
    Export(ExportError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotEditor => write!(f, "editor login required"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Edit(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotEditor => None,
            Self::Store(err) => Some(err),
            Self::Edit(err) => Some(err),
            Self::Export(err) => Some(err),
        }
    }
}

impl From<StoreError> for BoardError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<EditError> for BoardError {
    fn from(value: EditError) -> Self {
        Self::Edit(value)
    }
}

impl From<ExportError> for BoardError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// How an intent ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The user declined the confirmation prompt.
    Declined,
    /// Nothing to do (e.g. blank notice text).
    Ignored,
    Exported(ExportBundle),
}

/// Application state for one board.
pub struct Board<A, P> {
    store: DataStore<A>,
    sessions: EditSessions,
    subscription: Subscription,
    auth: Box<dyn AuthProvider>,
    prompt: P,
    status: Box<dyn StatusSink>,
    is_editor: bool,
    view: View,
    rendered_links_revision: u64,
}

impl<A: PersistenceAdapter, P: ConfirmPrompt> Board<A, P> {
    /// Subscribes to the backend, loads both collections and renders.
    ///
    /// A failed initial load is reported and leaves the board empty.
    pub async fn start(
        adapter: A,
        auth: Box<dyn AuthProvider>,
        prompt: P,
        status: Box<dyn StatusSink>,
    ) -> Self {
        let subscription = adapter.subscribe();
        let store = DataStore::new(adapter);
        let is_editor = auth.is_editor();
        let view = render_board(&RenderInput {
            links: store.links(),
            notices: store.notices(),
            is_editor,
            sessions: &EditSessions::new(),
        });
        let mut board = Self {
            store,
            sessions: EditSessions::new(),
            subscription,
            auth,
            prompt,
            status,
            is_editor,
            view,
            rendered_links_revision: 0,
        };

        match board.store.adapter().refresh_trigger() {
            RefreshTrigger::Push if board.subscription.is_active() => {
                board.pump();
            }
            RefreshTrigger::Push | RefreshTrigger::CallSite => board.refresh().await,
        }
        info!(
            "event=board_start module=service status=ok backend={} is_editor={} links={} notices={}",
            board.backend_kind(),
            board.is_editor,
            board.store.links().len(),
            board.store.notices().len()
        );
        board.rerender();
        board
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn store(&self) -> &DataStore<A> {
        &self.store
    }

    pub fn links(&self) -> &Snapshot<Link> {
        self.store.links()
    }

    pub fn notices(&self) -> &Snapshot<Notice> {
        self.store.notices()
    }

    pub fn sessions(&self) -> &EditSessions {
        &self.sessions
    }

    pub fn is_editor(&self) -> bool {
        self.is_editor
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.store.adapter().backend_kind()
    }

    /// Re-fetches both collections; failures are reported and the previous
    /// snapshots stay visible.
    pub async fn refresh(&mut self) {
        if let Err(err) = self.store.refresh_all().await {
            self.status
                .show(StatusMessage::error(format!("Failed to load board: {err}")));
        }
        self.rerender();
    }

    /// Publishes a link and, when its note carries a date, a notice that
    /// links back to it.
    pub async fn submit_link(&mut self, draft: LinkDraft) -> Result<Link, BoardError> {
        self.require_editor()?;
        self.show_progress("Publishing...");

        let committed = match self.store.create_link(&draft).await {
            Ok(committed) => committed,
            Err(err) => return Err(self.fail(err.into())),
        };
        let mut reload = committed.reload;
        let link = committed.value;

        if let Some(content) = link
            .note
            .as_deref()
            .and_then(|note| derive_notice(note, &link.url, &link.title))
        {
            match self.store.create_notice(&content).await {
                Ok(notice) => reload = reload.and(notice.reload),
                Err(err) => {
                    warn!(
                        "event=notice_derive module=service status=error link_id={} error={}",
                        link.id,
                        sanitize_message(&err.to_string(), MAX_LOGGED_TEXT_CHARS)
                    );
                    self.status.show(StatusMessage::error(format!(
                        "Link published, but its notice failed: {err}"
                    )));
                    self.rerender();
                    return Ok(link);
                }
            }
        }

        self.finish("Published", reload);
        Ok(link)
    }

    /// Publishes a notice. Blank text is ignored.
    pub async fn submit_notice(&mut self, text: &str) -> Result<Outcome, BoardError> {
        self.require_editor()?;
        if text.trim().is_empty() {
            return Ok(Outcome::Ignored);
        }
        self.show_progress("Publishing notice...");
        match self.store.create_notice(text).await {
            Ok(committed) => self.finish("Notice published", committed.reload),
            Err(err) => return Err(self.fail(err.into())),
        }
        Ok(Outcome::Applied)
    }

    /// Deletes a link after confirmation.
    pub async fn delete_link(&mut self, id: &EntityId) -> Result<Outcome, BoardError> {
        self.require_editor()?;
        if !self.prompt.confirm(CONFIRM_DELETE_LINK).await {
            debug!("event=link_delete module=service status=declined link_id={id}");
            return Ok(Outcome::Declined);
        }
        self.show_progress("Deleting...");
        let committed = match self.store.delete_link(id).await {
            Ok(committed) => committed,
            Err(err) => return Err(self.fail(err.into())),
        };
        self.sessions.forget(id);
        self.finish("Link deleted", committed.reload);
        Ok(Outcome::Applied)
    }

    pub async fn delete_notice(&mut self, id: &EntityId) -> Result<Outcome, BoardError> {
        self.require_editor()?;
        self.show_progress("Deleting notice...");
        match self.store.delete_notice(id).await {
            Ok(committed) => self.finish("Notice deleted", committed.reload),
            Err(err) => return Err(self.fail(err.into())),
        }
        Ok(Outcome::Applied)
    }

    /// Removes every notice after confirmation.
    pub async fn clear_notices(&mut self) -> Result<Outcome, BoardError> {
        self.require_editor()?;
        if !self.prompt.confirm(CONFIRM_CLEAR_NOTICES).await {
            debug!("event=notice_clear module=service status=declined");
            return Ok(Outcome::Declined);
        }
        self.show_progress("Clearing notices...");
        match self.store.clear_notices().await {
            Ok(committed) => self.finish("Notices cleared", committed.reload),
            Err(err) => return Err(self.fail(err.into())),
        }
        Ok(Outcome::Applied)
    }

    /// Opens the inline note editor of a link.
    pub fn open_editor(&mut self, id: &EntityId) -> Result<OpenOutcome, BoardError> {
        self.require_editor()?;
        let note = match self.store.find_link(id) {
            Some(link) => link.note.clone(),
            None => return Err(BoardError::Store(StoreError::UnknownLink(id.clone()))),
        };
        let outcome = self.sessions.open(id, note.as_deref())?;
        if outcome == OpenOutcome::Opened {
            self.rerender();
        }
        Ok(outcome)
    }

    pub fn edit_draft(&mut self, id: &EntityId, text: &str) -> Result<(), BoardError> {
        self.sessions.set_draft(id, text)?;
        self.rerender();
        Ok(())
    }

    pub fn set_note_sync(&mut self, id: &EntityId, enabled: bool) -> Result<(), BoardError> {
        self.sessions.set_sync_to_notice(id, enabled)?;
        self.rerender();
        Ok(())
    }

    /// Discards the editor and shows the last known note again.
    pub fn cancel_edit(&mut self, id: &EntityId) -> Result<(), BoardError> {
        self.sessions.cancel(id)?;
        self.rerender();
        Ok(())
    }

    /// Saves the open editor of a link.
    ///
    /// With the sync toggle on, a dated note is also published as a notice.
    /// A failed save reopens the editor with the typed draft.
    pub async fn save_note(&mut self, id: &EntityId) -> Result<(), BoardError> {
        self.require_editor()?;
        let Some((url, title)) = self
            .store
            .find_link(id)
            .map(|link| (link.url.clone(), link.title.clone()))
        else {
            self.sessions.forget(id);
            self.rerender();
            return Err(self.fail(StoreError::UnknownLink(id.clone()).into()));
        };

        let request = self.sessions.begin_save(id)?;
        self.rerender();
        self.show_progress("Saving note...");

        let mut reload = match self.store.update_link_note(id, &request.note).await {
            Ok(committed) => committed.reload,
            Err(err) => {
                match &err {
                    StoreError::UnknownLink(_)
                    | StoreError::Adapter(AdapterError::NotFound { .. }) => {
                        self.sessions.forget(id);
                    }
                    _ => {
                        if let Err(edit_err) = self.sessions.abort_save(id) {
                            debug!(
                                "event=note_save module=service status=skipped link_id={id} error={edit_err}"
                            );
                        }
                    }
                }
                return Err(self.fail(err.into()));
            }
        };

        let mut notice_failure = None;
        if request.sync_to_notice {
            if let Some(content) = derive_notice(&request.note, &url, &title) {
                match self.store.create_notice(&content).await {
                    Ok(committed) => reload = reload.and(committed.reload),
                    Err(err) => notice_failure = Some(err),
                }
            }
        }

        if let Err(edit_err) = self.sessions.complete_save(id) {
            debug!(
                "event=note_save module=service status=skipped link_id={id} error={edit_err}"
            );
        }
        match notice_failure {
            Some(err) => {
                self.status.show(StatusMessage::error(format!(
                    "Note saved, but its notice failed: {err}"
                )));
                self.rerender();
            }
            None => self.finish("Note saved", reload),
        }
        Ok(())
    }

    /// Applies every queued push without waiting. Returns how many events
    /// were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.subscription.try_next() {
            self.apply_update(event);
            applied += 1;
        }
        if applied > 0 {
            self.rerender();
        }
        applied
    }

    /// Waits for the next push and applies it. `None` when the backend does
    /// not push or the listener is gone.
    pub async fn next_push(&mut self) -> Option<StoreUpdate> {
        let event = self.subscription.next().await?;
        let update = self.apply_update(event);
        self.rerender();
        Some(update)
    }

    /// Re-reads the editor flag and re-applies control visibility.
    pub fn refresh_auth(&mut self) {
        let is_editor = self.auth.is_editor();
        if is_editor == self.is_editor {
            return;
        }
        self.is_editor = is_editor;
        info!("event=auth_change module=service status=ok is_editor={is_editor}");
        if !is_editor && !self.sessions.is_empty() {
            self.sessions = EditSessions::new();
            self.rerender();
        } else {
            self.view.set_editor(is_editor);
        }
    }

    pub fn logout(&mut self) {
        if let Err(message) = self.auth.logout() {
            warn!("event=auth_logout module=service status=error");
            self.status
                .show(StatusMessage::error(format!("Logout failed: {message}")));
        }
        self.refresh_auth();
    }

    /// Builds the export documents from the current snapshots.
    pub fn export(&self) -> Result<ExportBundle, BoardError> {
        let bundle = ExportBundle::from_snapshots(self.store.links(), self.store.notices())?;
        info!(
            "event=board_export module=service status=ok documents={}",
            bundle.documents.len()
        );
        Ok(bundle)
    }

    /// Runs the intent behind a rendered control.
    pub async fn dispatch(&mut self, action: UiAction) -> Result<Outcome, BoardError> {
        if action.requires_editor() {
            self.require_editor()?;
        }
        debug!(
            "event=dispatch module=service status=start action={}",
            action.kind().as_str()
        );
        match action {
            UiAction::DeleteLink(id) => self.delete_link(&id).await,
            UiAction::EditNote(id) => match self.open_editor(&id)? {
                OpenOutcome::Opened => Ok(Outcome::Applied),
                OpenOutcome::AlreadyOpen => Ok(Outcome::Ignored),
            },
            UiAction::SaveNote(id) => self.save_note(&id).await.map(|()| Outcome::Applied),
            UiAction::CancelEdit(id) => self.cancel_edit(&id).map(|()| Outcome::Applied),
            UiAction::ToggleNoteSync(id) => {
                let enabled = self
                    .sessions
                    .get(&id)
                    .map(|session| !session.sync_to_notice())
                    .ok_or_else(|| EditError::NoSession(id.clone()))?;
                self.set_note_sync(&id, enabled).map(|()| Outcome::Applied)
            }
            UiAction::DeleteNotice(id) => self.delete_notice(&id).await,
            UiAction::ClearNotices => self.clear_notices().await,
            UiAction::Export => self.export().map(Outcome::Exported),
        }
    }

    fn apply_update(&mut self, event: ChangeEvent) -> StoreUpdate {
        let update = self.store.apply_event(event);
        if let StoreUpdate::ListenerFailed(err) = &update {
            self.status
                .show(StatusMessage::error(format!("Live updates failed: {err}")));
        }
        update
    }

    fn require_editor(&self) -> Result<(), BoardError> {
        if self.is_editor {
            Ok(())
        } else {
            Err(BoardError::NotEditor)
        }
    }

    fn show_progress(&self, text: &str) {
        if self.backend_kind() != BackendKind::Local {
            self.status.show(StatusMessage::progress(text));
        }
    }

    /// Reports a committed write. A failed re-fetch is shown as an error;
    /// the previous snapshot stays visible and the store stays dirty.
    fn finish(&mut self, done: &str, reload: Result<(), AdapterError>) {
        match reload {
            Ok(()) => self.status.show(StatusMessage::info(done)),
            Err(err) => {
                warn!(
                    "event=board_reload module=service status=error backend={} error_code={}",
                    err.backend(),
                    err.code()
                );
                self.status.show(StatusMessage::error(format!(
                    "{done}, but the board could not be reloaded: {err}"
                )));
            }
        }
        self.rerender();
    }

    /// Reports a user-initiated failure, re-renders and hands the error back.
    fn fail(&mut self, err: BoardError) -> BoardError {
        warn!(
            "event=board_action module=service status=error error={}",
            sanitize_message(&err.to_string(), MAX_LOGGED_TEXT_CHARS)
        );
        self.status.show(StatusMessage::error(err.to_string()));
        self.rerender();
        err
    }

    fn rerender(&mut self) {
        let revision = self.store.links().revision();
        if revision != self.rendered_links_revision {
            self.sessions.discard_editing();
            self.rendered_links_revision = revision;
        }
        self.view = render_board(&RenderInput {
            links: self.store.links(),
            notices: self.store.notices(),
            is_editor: self.is_editor,
            sessions: &self.sessions,
        });
    }
}
