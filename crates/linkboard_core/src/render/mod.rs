//! Snapshot-to-tree projection.
//!
//! # Responsibility
//! - Project links and notices snapshots into a fresh UI tree.
//! - Register every interactive control in a dispatch table.
//!
//! # Invariants
//! - Rendering never touches the store; output depends only on the inputs.
//! - Every call builds the whole tree from scratch.
//! - Editor-only controls are hidden exactly when `is_editor` is false.

pub mod dispatch;
pub mod node;

pub use dispatch::{ActionKind, DispatchTable, UiAction};
pub use node::{Element, Node};

use crate::edit::{EditSessions, EditState};
use crate::model::link::Link;
use crate::model::notice::Notice;
use crate::store::Snapshot;

pub const EDITOR_ONLY_CLASS: &str = "editor-only";
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/600x400/e5e5e0/111111?text=No+Image";
pub const NO_NOTICES_TEXT: &str = "(No important notices)";
const CATEGORY_LABEL: &str = "Web resource";

/// Everything a render reads.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub links: &'a Snapshot<Link>,
    pub notices: &'a Snapshot<Notice>,
    pub is_editor: bool,
    pub sessions: &'a EditSessions,
}

/// A rendered board with its dispatch table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    root: Node,
    dispatch: DispatchTable,
    is_editor: bool,
}

impl View {
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn dispatch(&self) -> &DispatchTable {
        &self.dispatch
    }

    pub fn is_editor(&self) -> bool {
        self.is_editor
    }

    pub fn card_count(&self) -> usize {
        self.root.find_by_class("news-card-wrapper").len()
    }

    pub fn notice_count(&self) -> usize {
        self.root.find_by_class("notice-item").len()
    }

    /// Headlines of the rendered cards, top to bottom.
    pub fn headlines(&self) -> Vec<String> {
        self.root
            .find_by_class("card-headline")
            .into_iter()
            .map(Element::text_content)
            .collect()
    }

    pub fn to_html(&self) -> String {
        self.root.to_html()
    }

    /// Re-applies editor visibility without re-projecting the snapshots.
    pub fn set_editor(&mut self, is_editor: bool) {
        apply_editor_visibility(&mut self.root, is_editor);
        self.is_editor = is_editor;
    }
}

/// Renders a board with no open editors.
pub fn render(links: &Snapshot<Link>, notices: &Snapshot<Notice>, is_editor: bool) -> View {
    let sessions = EditSessions::new();
    render_board(&RenderInput {
        links,
        notices,
        is_editor,
        sessions: &sessions,
    })
}

pub fn render_board(input: &RenderInput<'_>) -> View {
    let mut dispatch = DispatchTable::new();
    let hidden = !input.is_editor;

    let export_id = dispatch.register(UiAction::Export);
    let toolbar = Element::new("div").class("board-toolbar").child(
        control("button", "export-btn", ActionKind::Export, export_id, hidden).text("Export"),
    );

    let notices = notice_panel(input.notices, hidden, &mut dispatch);

    let cards = Element::new("div").class("cards-container").children(
        input
            .links
            .presentation()
            .into_iter()
            .map(|link| Node::from(card(link, input.sessions, hidden, &mut dispatch)))
            .collect::<Vec<_>>(),
    );

    let root = Element::new("div")
        .class("board")
        .child(toolbar)
        .child(notices)
        .child(cards)
        .into();

    View {
        root,
        dispatch,
        is_editor: input.is_editor,
    }
}

/// Shows or hides every editor-only control in an existing tree.
pub fn apply_editor_visibility(root: &mut Node, is_editor: bool) {
    root.for_each_element_mut(&mut |element| {
        if element.has_class(EDITOR_ONLY_CLASS) {
            element.set_hidden(!is_editor);
        }
    });
}

/// Upper-case host of `url` with a leading `www.` removed; empty when the
/// url has no host.
pub fn display_host(url: &str) -> String {
    let Some(host) = url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
    else {
        return String::new();
    };
    host.strip_prefix("www.").unwrap_or(&host).to_uppercase()
}

fn control(
    tag: &'static str,
    class: &'static str,
    kind: ActionKind,
    id: String,
    hidden: bool,
) -> Element {
    let element = Element::new(tag)
        .class(class)
        .class(EDITOR_ONLY_CLASS)
        .attr("type", "button")
        .attr("data-action", kind.as_str())
        .hidden(hidden);
    if id.is_empty() {
        element
    } else {
        element.attr("data-id", id)
    }
}

fn notice_panel(notices: &Snapshot<Notice>, hidden: bool, dispatch: &mut DispatchTable) -> Element {
    let clear_id = dispatch.register(UiAction::ClearNotices);
    let header = Element::new("div").class("notice-toolbar").child(
        control("button", "clear-notices-btn", ActionKind::ClearNotices, clear_id, hidden)
            .text("Clear notices"),
    );

    let display = Element::new("div").class("notice-display");
    let display = if notices.is_empty() {
        display.child(
            Element::new("span")
                .class("notice-placeholder")
                .text(NO_NOTICES_TEXT),
        )
    } else {
        let items = notices
            .presentation()
            .into_iter()
            .map(|notice| {
                let id = dispatch.register(UiAction::DeleteNotice(notice.id.clone()));
                Element::new("li")
                    .class("notice-item")
                    .child(Element::new("span").child(Node::markup(notice.content.as_str())))
                    .child(
                        control("button", "notice-delete-btn", ActionKind::DeleteNotice, id, hidden)
                            .text("×"),
                    )
                    .into()
            })
            .collect::<Vec<Node>>();
        display.child(Element::new("ul").class("notice-grid").children(items))
    };

    Element::new("section")
        .class("notice-panel")
        .child(header)
        .child(display)
}

fn card(link: &Link, sessions: &EditSessions, hidden: bool, dispatch: &mut DispatchTable) -> Element {
    let delete_id = dispatch.register(UiAction::DeleteLink(link.id.clone()));
    let image = link.image.as_deref().unwrap_or(PLACEHOLDER_IMAGE);

    let content = Element::new("div")
        .class("card-content")
        .child(
            Element::new("figure").class("card-figure").child(
                Element::new("img")
                    .class("card-img")
                    .attr("src", image)
                    .attr("alt", link.title.as_str()),
            ),
        )
        .child(Element::new("span").class("card-category").text(CATEGORY_LABEL))
        .child(Element::new("h3").class("card-headline").text(link.title.as_str()))
        .child(note_container(link, sessions, hidden, dispatch))
        .child(
            Element::new("div")
                .class("card-body")
                .child(
                    Element::new("p")
                        .class("card-summary")
                        .text(link.description.as_str()),
                )
                .child(
                    Element::new("div")
                        .class("card-meta")
                        .child(Element::new("span").text(display_host(&link.url))),
                ),
        );

    Element::new("div")
        .class("news-card-wrapper")
        .attr("data-id", delete_id.clone())
        .child(control("button", "delete-btn", ActionKind::DeleteLink, delete_id, hidden).text("×"))
        .child(
            Element::new("a")
                .class("news-card")
                .attr("href", link.url.as_str())
                .attr("target", "_blank")
                .child(content),
        )
}

fn note_container(
    link: &Link,
    sessions: &EditSessions,
    hidden: bool,
    dispatch: &mut DispatchTable,
) -> Element {
    let container = Element::new("div").class("note-container");
    match sessions.get(&link.id) {
        Some(session) => {
            let saving = session.state() == EditState::Saving;
            let save_id = dispatch.register(UiAction::SaveNote(link.id.clone()));
            let cancel_id = dispatch.register(UiAction::CancelEdit(link.id.clone()));
            let sync_id = dispatch.register(UiAction::ToggleNoteSync(link.id.clone()));

            container
                .class("editing")
                .child(
                    Element::new("input")
                        .class("note-edit-input")
                        .attr("type", "text")
                        .attr("value", session.draft())
                        .attr("placeholder", "Add a note...")
                        .flag("disabled", saving),
                )
                .child(
                    Element::new("label")
                        .class("note-sync-label")
                        .child(
                            Element::new("input")
                                .class("note-sync-checkbox")
                                .attr("type", "checkbox")
                                .attr("data-action", ActionKind::ToggleNoteSync.as_str())
                                .attr("data-id", sync_id)
                                .flag("checked", session.sync_to_notice())
                                .flag("disabled", saving),
                        )
                        .text("Sync to notice"),
                )
                .child(
                    Element::new("button")
                        .class("note-save-btn")
                        .attr("type", "button")
                        .attr("data-action", ActionKind::SaveNote.as_str())
                        .attr("data-id", save_id)
                        .flag("disabled", saving)
                        .text("✓"),
                )
                .child(
                    Element::new("button")
                        .class("note-cancel-btn")
                        .attr("type", "button")
                        .attr("data-action", ActionKind::CancelEdit.as_str())
                        .attr("data-id", cancel_id)
                        .flag("disabled", saving)
                        .text("✗"),
                )
        }
        None => {
            let edit_id = dispatch.register(UiAction::EditNote(link.id.clone()));
            let note = link.note.as_deref().unwrap_or_default();
            container
                .child(
                    Element::new("span")
                        .class("card-note")
                        .hidden(note.is_empty())
                        .text(if note.is_empty() {
                            String::new()
                        } else {
                            format!("⚠️ {note}")
                        }),
                )
                .child(
                    control("button", "edit-note-btn", ActionKind::EditNote, edit_id, hidden)
                        .attr("title", "Edit note")
                        .text("✎"),
                )
        }
    }
}
