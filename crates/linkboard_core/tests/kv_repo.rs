use linkboard_core::repo::kv_repo::{KeyValueRepository, SqliteKeyValueRepository};

#[test]
fn set_overwrites_and_remove_is_idempotent() {
    let repo = SqliteKeyValueRepository::in_memory().unwrap();
    assert_eq!(repo.get("site_links").unwrap(), None);

    repo.set("site_links", "[]").unwrap();
    repo.set("site_links", "[1]").unwrap();
    assert_eq!(repo.get("site_links").unwrap().as_deref(), Some("[1]"));

    repo.remove("site_links").unwrap();
    repo.remove("site_links").unwrap();
    assert_eq!(repo.get("site_links").unwrap(), None);
}

#[test]
fn values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");

    let repo = SqliteKeyValueRepository::open(&path).unwrap();
    repo.set("is_editor", "true").unwrap();
    drop(repo);

    let reopened = SqliteKeyValueRepository::open(&path).unwrap();
    assert_eq!(reopened.get("is_editor").unwrap().as_deref(), Some("true"));
}
