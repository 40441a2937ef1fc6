use crate::model::id::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lifecycle of the inline note editor of one link.
///
/// `Idle` is never stored; a link without a session is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Idle,
    Editing,
    Saving,
}

impl EditState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Editing => "editing",
            Self::Saving => "saving",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// No editor is open for the link.
    NoSession(EntityId),
    /// A save is in flight; the editor is frozen until it settles.
    SaveInFlight(EntityId),
    /// The session is not in the state the transition needs.
    NotEditing(EntityId),
}

impl Display for EditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSession(id) => write!(f, "no editor is open for link {id}"),
            Self::SaveInFlight(id) => write!(f, "a save is in progress for link {id}"),
            Self::NotEditing(id) => write!(f, "editor for link {id} is not editing"),
        }
    }
}

impl Error for EditError {}

/// Snapshot of a session handed to the store when saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub link_id: EntityId,
    /// Draft with surrounding whitespace removed.
    pub note: String,
    pub sync_to_notice: bool,
}

/// Transient editor view for one link's note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    link_id: EntityId,
    draft: String,
    sync_to_notice: bool,
    state: EditState,
}

impl EditSession {
    /// Opens an editor prefilled with the link's current note.
    pub fn open(link_id: EntityId, current_note: Option<&str>) -> Self {
        Self {
            link_id,
            draft: current_note.unwrap_or_default().to_string(),
            sync_to_notice: false,
            state: EditState::Editing,
        }
    }

    pub fn link_id(&self) -> &EntityId {
        &self.link_id
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn sync_to_notice(&self) -> bool {
        self.sync_to_notice
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn set_draft(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        self.ensure_editing()?;
        self.draft = text.into();
        Ok(())
    }

    pub fn set_sync_to_notice(&mut self, enabled: bool) -> Result<(), EditError> {
        self.ensure_editing()?;
        self.sync_to_notice = enabled;
        Ok(())
    }

    /// Freezes the editor and returns what should be persisted.
    pub fn begin_save(&mut self) -> Result<SaveRequest, EditError> {
        self.ensure_editing()?;
        self.state = EditState::Saving;
        Ok(SaveRequest {
            link_id: self.link_id.clone(),
            note: self.draft.trim().to_string(),
            sync_to_notice: self.sync_to_notice,
        })
    }

    /// Returns a failed save to `Editing`; the draft is kept as typed.
    pub fn abort_save(&mut self) -> Result<(), EditError> {
        if self.state != EditState::Saving {
            return Err(EditError::NotEditing(self.link_id.clone()));
        }
        self.state = EditState::Editing;
        Ok(())
    }

    fn ensure_editing(&self) -> Result<(), EditError> {
        match self.state {
            EditState::Editing => Ok(()),
            EditState::Saving => Err(EditError::SaveInFlight(self.link_id.clone())),
            EditState::Idle => Err(EditError::NotEditing(self.link_id.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EditError, EditSession, EditState};
    use crate::model::id::EntityId;

    #[test]
    fn open_prefills_draft_from_current_note() {
        let session = EditSession::open(EntityId::from(3), Some("bring id"));
        assert_eq!(session.draft(), "bring id");
        assert_eq!(session.state(), EditState::Editing);
        assert!(!session.sync_to_notice());
    }

    #[test]
    fn begin_save_trims_and_freezes() {
        let mut session = EditSession::open(EntityId::from(3), None);
        session.set_draft("  5/1 closed  ").expect("draft");
        session.set_sync_to_notice(true).expect("sync");

        let request = session.begin_save().expect("save");
        assert_eq!(request.note, "5/1 closed");
        assert!(request.sync_to_notice);
        assert_eq!(session.state(), EditState::Saving);

        let err = session.set_draft("late").expect_err("frozen");
        assert_eq!(err, EditError::SaveInFlight(EntityId::from(3)));
        assert!(session.begin_save().is_err());
    }

    #[test]
    fn abort_save_keeps_untrimmed_draft() {
        let mut session = EditSession::open(EntityId::from("tok"), None);
        session.set_draft(" typed ").expect("draft");
        session.begin_save().expect("save");
        session.abort_save().expect("abort");

        assert_eq!(session.state(), EditState::Editing);
        assert_eq!(session.draft(), " typed ");
        assert!(session.abort_save().is_err());
    }
}
