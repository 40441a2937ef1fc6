mod common;

use common::{FakeRestServer, RecordingStatus, ScriptedPrompt, SwitchAuth};
use linkboard_core::adapter::local::LocalStoreAdapter;
use linkboard_core::adapter::realtime::{MemoryDocumentStore, RealtimeAdapter};
use linkboard_core::adapter::rest::HttpMethod;
use linkboard_core::edit::EditSessions;
use linkboard_core::export::LINKS_FILE;
use linkboard_core::render::{render_board, ActionKind, RenderInput, NO_NOTICES_TEXT};
use linkboard_core::service::board::{CONFIRM_CLEAR_NOTICES, CONFIRM_DELETE_LINK};
use linkboard_core::ui::StatusKind;
use linkboard_core::{
    Board, BoardError, EditState, EntityId, LinkDraft, OpenOutcome, Outcome, PersistenceAdapter,
    SqliteKeyValueRepository, StoreUpdate, UiAction,
};

struct Harness<A: PersistenceAdapter> {
    board: Board<A, ScriptedPrompt>,
    status: RecordingStatus,
    prompt: ScriptedPrompt,
    auth: SwitchAuth,
}

async fn start<A: PersistenceAdapter>(adapter: A, editor: bool) -> Harness<A> {
    let status = RecordingStatus::default();
    let prompt = ScriptedPrompt::default();
    let auth = SwitchAuth::new(editor);
    let board = Board::start(adapter, auth.boxed(), prompt.clone(), status.boxed()).await;
    Harness {
        board,
        status,
        prompt,
        auth,
    }
}

fn local_adapter() -> LocalStoreAdapter {
    LocalStoreAdapter::new(SqliteKeyValueRepository::in_memory().expect("repo"))
}

async fn run_board_scenario<A: PersistenceAdapter>(adapter: A) {
    let Harness {
        mut board, status, ..
    } = start(adapter, true).await;
    assert_eq!(board.view().card_count(), 0);

    let a = board
        .submit_link(LinkDraft::new("https://a.test", "A"))
        .await
        .expect("create a");
    board.pump();
    assert_eq!(board.links().len(), 1);
    assert_eq!(board.view().headlines(), vec!["A"]);

    board
        .submit_link(LinkDraft::new("https://b.test", "B"))
        .await
        .expect("create b");
    board.pump();
    assert_eq!(board.view().headlines(), vec!["B", "A"]);

    assert_eq!(board.delete_link(&a.id).await.expect("delete a"), Outcome::Applied);
    board.pump();
    assert_eq!(board.view().headlines(), vec!["B"]);

    board.submit_notice("first").await.expect("notice 1");
    board.submit_notice("second").await.expect("notice 2");
    board.pump();
    assert_eq!(board.notices().len(), 2);
    assert_eq!(board.view().notice_count(), 2);

    assert_eq!(board.clear_notices().await.expect("clear"), Outcome::Applied);
    board.pump();
    assert_eq!(board.notices().len(), 0);
    let placeholder = board.view().root().find_by_class("notice-placeholder");
    assert_eq!(placeholder.len(), 1);
    assert_eq!(placeholder[0].text_content(), NO_NOTICES_TEXT);

    assert!(status.errors().is_empty(), "unexpected errors: {:?}", status.errors());
}

#[tokio::test]
async fn scenario_on_local_store() {
    run_board_scenario(local_adapter()).await;
}

#[tokio::test]
async fn scenario_on_realtime_store() {
    run_board_scenario(RealtimeAdapter::new(MemoryDocumentStore::new())).await;
}

#[tokio::test]
async fn scenario_on_rest_api() {
    run_board_scenario(FakeRestServer::new().adapter()).await;
}

#[tokio::test]
async fn dated_note_publishes_cross_linked_notice() {
    let mut h = start(local_adapter(), true).await;

    h.board
        .submit_link(LinkDraft::new("https://x.test", "X").with_note("2024-05 maintenance"))
        .await
        .expect("dated");
    h.board
        .submit_link(LinkDraft::new("https://y.test", "Y").with_note("just a note"))
        .await
        .expect("plain");

    let notices = h.board.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(
        notices.items()[0].content,
        "2024-05 maintenance <a href='https://x.test' target='_blank' style='text-decoration: underline; color: inherit;'>[X]</a>"
    );
    assert!(h.board.view().to_html().contains("<a href='https://x.test'"));
}

#[tokio::test]
async fn validation_errors_surface_as_status() {
    let mut h = start(local_adapter(), true).await;

    let err = h
        .board
        .submit_link(LinkDraft::new("https://a.test", " "))
        .await
        .expect_err("missing title");
    assert!(matches!(err, BoardError::Store(_)));
    assert_eq!(h.status.errors(), vec!["URL and title are required".to_string()]);
    assert_eq!(h.board.submit_notice("  ").await.expect("ignored"), Outcome::Ignored);
    assert!(h.board.links().is_empty());
}

#[tokio::test]
async fn remote_calls_show_progress_first() {
    let mut h = start(FakeRestServer::new().adapter(), true).await;
    h.board
        .submit_link(LinkDraft::new("https://a.test", "A"))
        .await
        .expect("create");

    let kinds: Vec<StatusKind> = h.status.messages().into_iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![StatusKind::Progress, StatusKind::Info]);
    assert!(!h.status.messages()[0].auto_hide);

    let mut local = start(local_adapter(), true).await;
    local
        .board
        .submit_link(LinkDraft::new("https://a.test", "A"))
        .await
        .expect("create");
    assert_eq!(local.status.messages().len(), 1);
}

#[tokio::test]
async fn failed_reload_after_publish_is_reported() {
    let server = FakeRestServer::new();
    let mut h = start(server.adapter(), true).await;

    server.respond_on(HttpMethod::Get, "/api/links", 503, "");
    h.board
        .submit_link(LinkDraft::new("https://a.test", "A"))
        .await
        .expect("link is committed");

    assert_eq!(server.link_documents().len(), 1);
    assert_eq!(h.board.view().card_count(), 0);
    assert!(h.board.store().is_dirty());
    let last = h.status.last().expect("status");
    assert_eq!(last.kind, StatusKind::Error);
    assert!(
        last.text.starts_with("Published, but the board could not be reloaded"),
        "{}",
        last.text
    );
    assert!(!h.status.messages().iter().any(|m| m.text == "Published"));

    h.board.refresh().await;
    assert!(!h.board.store().is_dirty());
    assert_eq!(h.board.view().headlines(), vec!["A"]);
}

#[tokio::test]
async fn failed_reload_after_note_save_is_reported() {
    let server = FakeRestServer::new();
    let id = EntityId::Sequential(server.insert_link("https://a.test", "A", "old"));
    let mut h = start(server.adapter(), true).await;

    h.board.open_editor(&id).expect("open");
    h.board.edit_draft(&id, "new").expect("draft");
    server.respond_on(HttpMethod::Get, "/api/links", 500, "");
    h.board.save_note(&id).await.expect("note is committed");

    assert!(h.board.sessions().get(&id).is_none());
    assert_eq!(
        h.board.store().find_link(&id).and_then(|l| l.note.as_deref()),
        Some("old")
    );
    let last = h.status.last().expect("status");
    assert_eq!(last.kind, StatusKind::Error);
    assert!(last.text.starts_with("Note saved, but the board could not be reloaded"));
}

#[tokio::test]
async fn second_session_on_same_link_is_a_no_op() {
    let mut h = start(local_adapter(), true).await;
    let a = h
        .board
        .submit_link(LinkDraft::new("https://a.test", "A").with_note("old"))
        .await
        .expect("a");
    let b = h
        .board
        .submit_link(LinkDraft::new("https://b.test", "B"))
        .await
        .expect("b");

    assert_eq!(h.board.open_editor(&a.id).expect("open a"), OpenOutcome::Opened);
    h.board.edit_draft(&a.id, "typed on a").expect("draft a");
    assert_eq!(h.board.open_editor(&a.id).expect("reopen a"), OpenOutcome::AlreadyOpen);
    assert_eq!(h.board.open_editor(&b.id).expect("open b"), OpenOutcome::Opened);

    let session = h.board.sessions().get(&a.id).expect("a still open");
    assert_eq!(session.draft(), "typed on a");
    assert_eq!(h.board.view().root().find_by_class("note-edit-input").len(), 2);
}

#[tokio::test]
async fn save_with_sync_updates_note_and_publishes_notice() {
    let mut h = start(local_adapter(), true).await;
    let a = h
        .board
        .submit_link(LinkDraft::new("https://a.test", "A"))
        .await
        .expect("a");

    h.board.open_editor(&a.id).expect("open");
    h.board.edit_draft(&a.id, "  5/1 closed  ").expect("draft");
    h.board
        .dispatch(UiAction::ToggleNoteSync(a.id.clone()))
        .await
        .expect("toggle");
    h.board.save_note(&a.id).await.expect("save");

    assert_eq!(h.board.sessions().state(&a.id), EditState::Idle);
    let link = h.board.store().find_link(&a.id).expect("link");
    assert_eq!(link.note.as_deref(), Some("5/1 closed"));
    assert_eq!(h.board.notices().len(), 1);
    assert!(h.board.notices().items()[0].content.starts_with("5/1 closed <a href='https://a.test'"));
    assert_eq!(
        h.board.view().root().find_by_class("card-note")[0].text_content(),
        "⚠️ 5/1 closed"
    );
}

#[tokio::test]
async fn sync_toggle_leaves_undated_notes_alone() {
    let mut h = start(local_adapter(), true).await;
    let a = h
        .board
        .submit_link(LinkDraft::new("https://a.test", "A"))
        .await
        .expect("a");

    h.board.open_editor(&a.id).expect("open");
    h.board.edit_draft(&a.id, "bring id").expect("draft");
    h.board.set_note_sync(&a.id, true).expect("sync");
    h.board.save_note(&a.id).await.expect("save");

    assert!(h.board.notices().is_empty());
}

#[tokio::test]
async fn failed_save_keeps_the_draft() {
    let server = FakeRestServer::new();
    let id = EntityId::Sequential(server.insert_link("https://a.test", "A", "old"));
    let mut h = start(server.adapter(), true).await;

    h.board.open_editor(&id).expect("open");
    h.board.edit_draft(&id, "new note").expect("draft");
    server.respond_on(HttpMethod::Patch, "/api/links/1", 500, "");

    let err = h.board.save_note(&id).await.expect_err("server error");
    assert!(matches!(err, BoardError::Store(_)));

    let session = h.board.sessions().get(&id).expect("still open");
    assert_eq!(session.state(), EditState::Editing);
    assert_eq!(session.draft(), "new note");
    assert_eq!(h.status.errors().len(), 1);
    assert_eq!(
        h.board.store().find_link(&id).and_then(|l| l.note.as_deref()),
        Some("old")
    );
}

#[tokio::test]
async fn cancel_restores_last_known_note() {
    let mut h = start(local_adapter(), true).await;
    let a = h
        .board
        .submit_link(LinkDraft::new("https://a.test", "A").with_note("old"))
        .await
        .expect("a");

    h.board.open_editor(&a.id).expect("open");
    h.board.edit_draft(&a.id, "scratch").expect("draft");
    h.board.cancel_edit(&a.id).expect("cancel");

    assert!(h.board.sessions().is_empty());
    assert_eq!(
        h.board.view().root().find_by_class("card-note")[0].text_content(),
        "⚠️ old"
    );
}

#[tokio::test]
async fn remote_push_discards_open_editor() {
    let documents = MemoryDocumentStore::new();
    let other_client = RealtimeAdapter::new(documents.clone());
    let a = other_client
        .create_link(&LinkDraft::new("https://a.test", "A").with_note("old"))
        .await
        .expect("seed");
    let mut h = start(RealtimeAdapter::new(documents.clone()), true).await;
    assert_eq!(h.board.links().len(), 1);

    h.board.open_editor(&a.id).expect("open");
    h.board.edit_draft(&a.id, "mine").expect("draft");

    other_client.create_notice("unrelated").await.expect("notice");
    assert_eq!(h.board.next_push().await, Some(StoreUpdate::Notices));
    assert_eq!(h.board.sessions().state(&a.id), EditState::Editing);

    other_client
        .update_link_note(&a.id, "theirs")
        .await
        .expect("remote edit");
    assert_eq!(h.board.pump(), 1);

    assert_eq!(h.board.sessions().state(&a.id), EditState::Idle);
    assert_eq!(
        h.board.view().root().find_by_class("card-note")[0].text_content(),
        "⚠️ theirs"
    );
}

#[tokio::test]
async fn listener_failure_is_reported_and_data_kept() {
    let documents = MemoryDocumentStore::new();
    let mut h = start(RealtimeAdapter::new(documents.clone()), true).await;
    h.board
        .submit_link(LinkDraft::new("https://a.test", "A"))
        .await
        .expect("create");
    h.board.pump();

    documents.fail_listeners("permission denied");
    h.board.pump();

    assert_eq!(h.board.links().len(), 1);
    let errors = h.status.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Live updates failed"));
}

#[tokio::test]
async fn declined_confirmation_changes_nothing() {
    let server = FakeRestServer::new();
    server.insert_link("https://a.test", "A", "");
    let mut h = start(server.adapter(), true).await;
    h.board.submit_notice("n").await.expect("notice");

    h.prompt.answer_next(false);
    assert_eq!(
        h.board.delete_link(&EntityId::Sequential(1)).await.expect("declined"),
        Outcome::Declined
    );
    h.prompt.answer_next(false);
    assert_eq!(h.board.clear_notices().await.expect("declined"), Outcome::Declined);

    assert_eq!(
        h.prompt.asked(),
        vec![CONFIRM_DELETE_LINK.to_string(), CONFIRM_CLEAR_NOTICES.to_string()]
    );
    assert_eq!(server.count(HttpMethod::Delete, "/api/links/1"), 0);
    assert_eq!(server.count(HttpMethod::Delete, "/api/notice"), 0);
    assert_eq!(h.board.links().len(), 1);
    assert_eq!(h.board.notices().len(), 1);
}

#[tokio::test]
async fn editor_controls_follow_auth_state() {
    let mut h = start(local_adapter(), false).await;
    let err = h
        .board
        .submit_link(LinkDraft::new("https://a.test", "A"))
        .await
        .expect_err("not an editor");
    assert!(matches!(err, BoardError::NotEditor));

    h.auth.set(true);
    h.board.refresh_auth();
    let a = h
        .board
        .submit_link(LinkDraft::new("https://a.test", "A"))
        .await
        .expect("editor");
    let editor_only = |h: &Harness<LocalStoreAdapter>| {
        h.board
            .view()
            .root()
            .find_by_class("editor-only")
            .iter()
            .map(|element| element.is_hidden())
            .collect::<Vec<_>>()
    };
    assert!(editor_only(&h).iter().all(|hidden| !hidden));

    h.board.open_editor(&a.id).expect("open");
    h.board.logout();

    assert!(!h.board.is_editor());
    assert!(h.board.sessions().is_empty());
    assert!(editor_only(&h).iter().all(|hidden| *hidden));
    assert!(matches!(
        h.board.dispatch(UiAction::DeleteLink(a.id.clone())).await,
        Err(BoardError::NotEditor)
    ));
}

#[tokio::test]
async fn rendered_controls_dispatch_to_board() {
    let mut h = start(local_adapter(), true).await;
    let a = h
        .board
        .submit_link(LinkDraft::new("https://a.test", "A"))
        .await
        .expect("a");

    let id_text = a.id.to_string();
    let action = {
        let view = h.board.view();
        let button = view
            .root()
            .find_action(ActionKind::EditNote.as_str(), Some(id_text.as_str()))
            .expect("edit button");
        view.dispatch().resolve_element(button).cloned().expect("registered")
    };
    assert_eq!(h.board.dispatch(action).await.expect("edit"), Outcome::Applied);
    assert!(h
        .board
        .view()
        .root()
        .find_action(ActionKind::SaveNote.as_str(), Some(id_text.as_str()))
        .is_some());

    let action = h
        .board
        .view()
        .dispatch()
        .resolve(ActionKind::DeleteLink, &id_text)
        .cloned()
        .expect("delete registered");
    assert_eq!(h.board.dispatch(action).await.expect("delete"), Outcome::Applied);
    assert!(h.board.links().is_empty());
}

#[tokio::test]
async fn export_writes_links_in_storage_order() {
    let documents = MemoryDocumentStore::new();
    let mut h = start(RealtimeAdapter::new(documents), true).await;
    for title in ["A", "B"] {
        h.board
            .submit_link(LinkDraft::new(format!("https://{title}.test"), title))
            .await
            .expect("create");
    }
    h.board.pump();

    let bundle = match h.board.dispatch(UiAction::Export).await.expect("export") {
        Outcome::Exported(bundle) => bundle,
        other => panic!("unexpected outcome {other:?}"),
    };
    let links: serde_json::Value =
        serde_json::from_str(&bundle.get(LINKS_FILE).expect("links").contents).expect("json");
    assert_eq!(links[0]["title"], "A");
    assert_eq!(links[1]["title"], "B");
    assert_eq!(bundle.documents.len(), 1);
}

#[tokio::test]
async fn saving_editor_renders_disabled_controls() {
    let mut h = start(local_adapter(), true).await;
    let a = h
        .board
        .submit_link(LinkDraft::new("https://a.test", "A"))
        .await
        .expect("a");

    let mut sessions = EditSessions::new();
    sessions.open(&a.id, None).expect("open");
    sessions.begin_save(&a.id).expect("save");
    let view = render_board(&RenderInput {
        links: h.board.links(),
        notices: h.board.notices(),
        is_editor: true,
        sessions: &sessions,
    });

    let save = view
        .root()
        .find_action(ActionKind::SaveNote.as_str(), Some(a.id.to_string().as_str()))
        .expect("save button");
    assert!(save.has_flag("disabled"));
    h.board.refresh().await;
    assert!(h.status.errors().is_empty());
}
