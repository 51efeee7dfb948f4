use tempfile::TempDir;

use sqlite_browser::core::registry::{self, Paths};
use sqlite_browser::core::session::SessionHandle;
use sqlite_browser::core::types::{BrowseRequest, QueryOutcome};
use sqlite_browser::error::AppError;

fn test_paths(dir: &TempDir) -> Paths {
    Paths::new(dir.path().join("demo.sqlite"), dir.path().join("uploads"))
}

fn spawn_session(dir: &TempDir) -> SessionHandle {
    SessionHandle::spawn(test_paths(dir), true).expect("spawn session")
}

#[tokio::test]
async fn seeded_default_database_answers_queries() {
    let dir = TempDir::new().expect("tempdir");
    let session = spawn_session(&dir);

    match session
        .execute("SELECT count(*) as count FROM users".into())
        .await
        .expect("count")
    {
        QueryOutcome::Rows { rows, duration_ms } => {
            assert_eq!(rows[0]["count"], serde_json::json!(4));
            assert!(duration_ms >= 0.0);
        }
        other => panic!("expected rows, got {other:?}"),
    }

    let err = session.execute("   ".into()).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidRequest(_)));
    assert!(!err.to_string().is_empty());
}

#[tokio::test]
async fn schema_reflects_the_active_database() {
    let dir = TempDir::new().expect("tempdir");
    let session = spawn_session(&dir);

    let snapshot = session.schema().await.expect("schema");
    assert!(snapshot.contains_key("users"));
    assert!(snapshot.contains_key("orders"));
    assert!(snapshot["users"].iter().any(|c| c.name == "email"));
}

#[tokio::test]
async fn imported_dump_is_listed_and_queryable() {
    let dir = TempDir::new().expect("tempdir");
    let paths = test_paths(&dir);
    let session = spawn_session(&dir);

    let dump = "\
CREATE TABLE seed_table (id int unsigned AUTO_INCREMENT, note varchar(20)) ENGINE=InnoDB;
INSERT INTO seed_table VALUES (1, 'one');
INSERT INTO seed_table VALUES (2, 'two');
";
    let name = registry::import_sql_dump(&paths, "seed.sql", dump).expect("import");

    let files = session.list_databases().await.expect("list");
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].path, None);
    assert!(files[0].current);
    assert_eq!(files[1].name, name);

    let target = files[1].path.clone().expect("upload path");
    session.switch_to(target).await.expect("switch");

    let snapshot = session.schema().await.expect("schema");
    assert!(snapshot.contains_key("seed_table"));
    assert!(!snapshot.contains_key("users"));

    match session
        .execute("SELECT COUNT(*) as count FROM seed_table".into())
        .await
        .expect("count")
    {
        QueryOutcome::Rows { rows, .. } => assert_eq!(rows[0]["count"], serde_json::json!(2)),
        other => panic!("expected rows, got {other:?}"),
    }

    let files = session.list_databases().await.expect("list");
    assert!(!files[0].current);
    assert!(files[1].current);
}

#[tokio::test]
async fn switching_to_a_missing_file_leaves_the_session_unchanged() {
    let dir = TempDir::new().expect("tempdir");
    let session = spawn_session(&dir);

    let err = session
        .switch_to(dir.path().join("nope.sqlite").display().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let files = session.list_databases().await.expect("list");
    assert!(files[0].current);
    let outcome = session
        .execute("SELECT count(*) FROM users".into())
        .await
        .expect("still queryable");
    assert!(matches!(outcome, QueryOutcome::Rows { .. }));
}

#[tokio::test]
async fn deleting_the_active_upload_reverts_to_default() {
    let dir = TempDir::new().expect("tempdir");
    let paths = test_paths(&dir);
    let session = spawn_session(&dir);

    let name =
        registry::import_sql_dump(&paths, "extra.sql", "CREATE TABLE t (id INTEGER);").expect("import");
    let target = paths.uploads_dir.join(&name).display().to_string();

    session.switch_to(target.clone()).await.expect("switch");
    session.delete_database(target).await.expect("delete");

    let files = session.list_databases().await.expect("list");
    assert_eq!(files.len(), 1);
    assert!(files[0].current);

    let snapshot = session.schema().await.expect("schema");
    assert!(snapshot.contains_key("users"));
}

#[tokio::test]
async fn the_default_database_cannot_be_deleted() {
    let dir = TempDir::new().expect("tempdir");
    let paths = test_paths(&dir);
    let session = spawn_session(&dir);

    let err = session
        .delete_database(paths.default_db.display().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DefaultDbProtected));

    // Still protected while an upload is active.
    let name =
        registry::import_sql_dump(&paths, "x.sql", "CREATE TABLE t (id INTEGER);").expect("import");
    session
        .switch_to(paths.uploads_dir.join(&name).display().to_string())
        .await
        .expect("switch");
    let err = session
        .delete_database(paths.default_db.display().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DefaultDbProtected));
}

#[tokio::test]
async fn browse_pages_are_bounded_and_searchable() {
    let dir = TempDir::new().expect("tempdir");
    let session = spawn_session(&dir);

    let page = session
        .browse(BrowseRequest {
            table: "users".into(),
            page: 1,
            page_size: 3,
            search: String::new(),
        })
        .await
        .expect("page 1");
    assert_eq!(page.total_records, 4);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.rows.len(), 1);

    let filtered = session
        .browse(BrowseRequest {
            table: "users".into(),
            page: 0,
            page_size: 10,
            search: "bob".into(),
        })
        .await
        .expect("filtered");
    assert_eq!(filtered.total_records, 1);
    assert_eq!(filtered.rows[0]["email"], serde_json::json!("bob@example.com"));
}
