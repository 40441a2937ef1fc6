//! Inline note editing.
//!
//! # Responsibility
//! - Track one editor per link through `Editing` and `Saving`.
//! - Reconcile open editors with incoming links snapshots.
//!
//! # Invariants
//! - At most one session per link. Reopening an open link is a no-op.
//! - No session may open or close while another one is saving.
//! - A links refresh drops every `Editing` session (last writer wins);
//!   sessions that are `Saving` survive until their save settles.

mod session;

pub use session::{EditError, EditSession, EditState, SaveRequest};

use crate::model::id::EntityId;
use log::debug;
use std::collections::BTreeMap;

/// Result of asking for an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    AlreadyOpen,
}

/// Every open editor, keyed by link id.
#[derive(Debug, Default, Clone)]
pub struct EditSessions {
    sessions: BTreeMap<EntityId, EditSession>,
}

impl EditSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, link_id: &EntityId) -> Option<&EditSession> {
        self.sessions.get(link_id)
    }

    pub fn state(&self, link_id: &EntityId) -> EditState {
        self.sessions
            .get(link_id)
            .map_or(EditState::Idle, EditSession::state)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditSession> {
        self.sessions.values()
    }

    /// Link id of the session currently saving, if any.
    pub fn saving(&self) -> Option<&EntityId> {
        self.sessions
            .values()
            .find(|session| session.state() == EditState::Saving)
            .map(EditSession::link_id)
    }

    /// Opens an editor for `link_id` prefilled with `current_note`.
    pub fn open(
        &mut self,
        link_id: &EntityId,
        current_note: Option<&str>,
    ) -> Result<OpenOutcome, EditError> {
        if let Some(saving) = self.saving() {
            return Err(EditError::SaveInFlight(saving.clone()));
        }
        if self.sessions.contains_key(link_id) {
            return Ok(OpenOutcome::AlreadyOpen);
        }
        self.sessions.insert(
            link_id.clone(),
            EditSession::open(link_id.clone(), current_note),
        );
        debug!("event=edit_open module=edit status=ok link_id={link_id}");
        Ok(OpenOutcome::Opened)
    }

    pub fn set_draft(&mut self, link_id: &EntityId, text: &str) -> Result<(), EditError> {
        self.session_mut(link_id)?.set_draft(text)
    }

    pub fn set_sync_to_notice(&mut self, link_id: &EntityId, enabled: bool) -> Result<(), EditError> {
        self.session_mut(link_id)?.set_sync_to_notice(enabled)
    }

    pub fn begin_save(&mut self, link_id: &EntityId) -> Result<SaveRequest, EditError> {
        let request = self.session_mut(link_id)?.begin_save()?;
        debug!(
            "event=edit_save module=edit status=start link_id={link_id} sync_to_notice={}",
            request.sync_to_notice
        );
        Ok(request)
    }

    /// Closes a session whose save was committed.
    pub fn complete_save(&mut self, link_id: &EntityId) -> Result<(), EditError> {
        match self.sessions.get(link_id).map(EditSession::state) {
            None => Err(EditError::NoSession(link_id.clone())),
            Some(EditState::Saving) => {
                self.sessions.remove(link_id);
                debug!("event=edit_save module=edit status=ok link_id={link_id}");
                Ok(())
            }
            Some(_) => Err(EditError::NotEditing(link_id.clone())),
        }
    }

    /// Reopens a session whose save failed.
    pub fn abort_save(&mut self, link_id: &EntityId) -> Result<(), EditError> {
        self.session_mut(link_id)?.abort_save()?;
        debug!("event=edit_save module=edit status=error link_id={link_id}");
        Ok(())
    }

    /// Discards the editor of `link_id` without saving.
    pub fn cancel(&mut self, link_id: &EntityId) -> Result<(), EditError> {
        match self.sessions.get(link_id).map(EditSession::state) {
            None => Err(EditError::NoSession(link_id.clone())),
            Some(EditState::Saving) => Err(EditError::SaveInFlight(link_id.clone())),
            Some(_) => {
                self.sessions.remove(link_id);
                debug!("event=edit_cancel module=edit status=ok link_id={link_id}");
                Ok(())
            }
        }
    }

    /// Drops every session that is only editing. Returns how many were dropped.
    pub fn discard_editing(&mut self) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.state() == EditState::Saving);
        let dropped = before - self.sessions.len();
        if dropped > 0 {
            debug!("event=edit_discard module=edit status=ok dropped={dropped}");
        }
        dropped
    }

    /// Drops the session of `link_id` whatever its state.
    pub fn forget(&mut self, link_id: &EntityId) -> bool {
        self.sessions.remove(link_id).is_some()
    }

    fn session_mut(&mut self, link_id: &EntityId) -> Result<&mut EditSession, EditError> {
        self.sessions
            .get_mut(link_id)
            .ok_or_else(|| EditError::NoSession(link_id.clone()))
    }
}
