mod common;

use common::FakeRestServer;
use linkboard_core::adapter::rest::HttpMethod;
use linkboard_core::{AdapterError, EntityId, LinkDraft, PersistenceAdapter, RefreshTrigger};

#[tokio::test]
async fn create_link_posts_and_returns_server_link() {
    let server = FakeRestServer::new();
    let adapter = server.adapter();
    assert_eq!(adapter.refresh_trigger(), RefreshTrigger::CallSite);

    let link = adapter
        .create_link(
            &LinkDraft::new("https://a.test", "A")
                .with_description("docs")
                .with_note("bring id"),
        )
        .await
        .expect("create");

    assert_eq!(link.id, EntityId::Sequential(1));
    assert_eq!(link.description, "docs");
    assert_eq!(link.note.as_deref(), Some("bring id"));
    assert_eq!(link.image, None);
    assert_eq!(server.count(HttpMethod::Post, "/api/links"), 1);

    let listed = adapter.list_links().await.expect("list");
    assert_eq!(listed, vec![link]);
}

#[tokio::test]
async fn note_update_and_notice_routes() {
    let server = FakeRestServer::new();
    let adapter = server.adapter();
    let id = EntityId::Sequential(server.insert_link("https://a.test", "A", ""));

    adapter.update_link_note(&id, "5/1 closed").await.expect("patch");
    assert_eq!(server.link_documents()[0]["note"], "5/1 closed");

    adapter.create_notice("first").await.expect("notice 1");
    adapter.create_notice("second").await.expect("notice 2");
    let notices = adapter.list_notices().await.expect("notices");
    assert_eq!(
        notices.iter().map(|n| n.content.as_str()).collect::<Vec<_>>(),
        vec!["first", "second"]
    );

    adapter.delete_notice(&notices[0].id).await.expect("delete");
    assert_eq!(server.count(HttpMethod::Delete, "/api/notice/notice-1"), 1);
    adapter.clear_notices().await.expect("clear");
    assert!(adapter.list_notices().await.expect("notices").is_empty());
}

#[tokio::test]
async fn status_codes_map_to_error_tags() {
    let server = FakeRestServer::new();
    let adapter = server.adapter();

    server.respond_next(400, r#"{"success": false, "message": "url is invalid"}"#);
    let err = adapter
        .create_link(&LinkDraft::new("https://a.test", "A"))
        .await
        .expect_err("400");
    assert_eq!(err.to_string(), "url is invalid");
    assert!(matches!(err, AdapterError::Rejected { .. }));

    let err = adapter
        .update_link_note(&EntityId::Sequential(42), "x")
        .await
        .expect_err("404");
    assert!(matches!(err, AdapterError::NotFound { .. }));

    server.respond_next(500, "Internal Server Error");
    let err = adapter.list_links().await.expect_err("500");
    assert!(err.is_retry_safe());

    server.respond_next(200, "<html>proxy page</html>");
    let err = adapter.list_links().await.expect_err("bad body");
    assert!(matches!(err, AdapterError::Transient { .. }));

    server.respond_next(200, r#"{"success": false, "message": "quota exceeded"}"#);
    let err = adapter.create_notice("x").await.expect_err("soft failure");
    assert_eq!(err.to_string(), "quota exceeded");
}

#[tokio::test]
async fn transport_failure_is_transient() {
    let server = FakeRestServer::new();
    let adapter = server.adapter();
    server.set_offline(true);

    let err = adapter.list_notices().await.expect_err("offline");
    assert!(err.is_retry_safe());
    assert!(err.to_string().contains("connection refused"));
}
