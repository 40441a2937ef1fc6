//! Maps rendered controls back to board operations.

use super::node::Element;
use crate::model::id::EntityId;
use std::collections::BTreeMap;

/// Kind of control, as carried in the `data-action` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    DeleteLink,
    EditNote,
    SaveNote,
    CancelEdit,
    ToggleNoteSync,
    DeleteNotice,
    ClearNotices,
    Export,
}

impl ActionKind {
    pub const ALL: [ActionKind; 8] = [
        Self::DeleteLink,
        Self::EditNote,
        Self::SaveNote,
        Self::CancelEdit,
        Self::ToggleNoteSync,
        Self::DeleteNotice,
        Self::ClearNotices,
        Self::Export,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeleteLink => "delete-link",
            Self::EditNote => "edit-note",
            Self::SaveNote => "save-note",
            Self::CancelEdit => "cancel-edit",
            Self::ToggleNoteSync => "toggle-note-sync",
            Self::DeleteNotice => "delete-notice",
            Self::ClearNotices => "clear-notices",
            Self::Export => "export",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

/// A user intent resolved from a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    DeleteLink(EntityId),
    EditNote(EntityId),
    SaveNote(EntityId),
    CancelEdit(EntityId),
    ToggleNoteSync(EntityId),
    DeleteNotice(EntityId),
    ClearNotices,
    Export,
}

impl UiAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::DeleteLink(_) => ActionKind::DeleteLink,
            Self::EditNote(_) => ActionKind::EditNote,
            Self::SaveNote(_) => ActionKind::SaveNote,
            Self::CancelEdit(_) => ActionKind::CancelEdit,
            Self::ToggleNoteSync(_) => ActionKind::ToggleNoteSync,
            Self::DeleteNotice(_) => ActionKind::DeleteNotice,
            Self::ClearNotices => ActionKind::ClearNotices,
            Self::Export => ActionKind::Export,
        }
    }

    pub fn target(&self) -> Option<&EntityId> {
        match self {
            Self::DeleteLink(id)
            | Self::EditNote(id)
            | Self::SaveNote(id)
            | Self::CancelEdit(id)
            | Self::ToggleNoteSync(id)
            | Self::DeleteNotice(id) => Some(id),
            Self::ClearNotices | Self::Export => None,
        }
    }

    /// Everything except export changes board state.
    pub fn requires_editor(&self) -> bool {
        !matches!(self, Self::Export)
    }
}

/// `(action, entity id)` -> intent, rebuilt on every render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchTable {
    entries: BTreeMap<(ActionKind, String), UiAction>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `action` and returns the `data-id` value its control carries.
    pub(crate) fn register(&mut self, action: UiAction) -> String {
        let key = action.target().map(EntityId::to_string).unwrap_or_default();
        self.entries
            .insert((action.kind(), key.clone()), action);
        key
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an intent by action kind and the `data-id` text (empty for
    /// board-wide actions).
    pub fn resolve(&self, kind: ActionKind, id: &str) -> Option<&UiAction> {
        self.entries.get(&(kind, id.to_string()))
    }

    /// Looks up the intent behind a rendered control.
    pub fn resolve_element(&self, element: &Element) -> Option<&UiAction> {
        let kind = ActionKind::parse(element.get_attr("data-action")?)?;
        self.resolve(kind, element.get_attr("data-id").unwrap_or_default())
    }

    pub fn actions(&self) -> impl Iterator<Item = &UiAction> {
        self.entries.values()
    }
}
