//! Database initialization: creation, reopening and schema shape

use mlib_common::db::init::{init_database, init_in_memory, CURRENT_SCHEMA_VERSION};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("mlib.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("mlib.db");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO artists (name, name_folded) VALUES ('Kept', 'kept')")
        .execute(&pool1)
        .await
        .unwrap();
    pool1.close().await;

    // Second open must keep existing rows
    let pool2 = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artists")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_all_tables_created() {
    let pool = init_in_memory().await.unwrap();

    for table in [
        "albums",
        "artists",
        "songs",
        "users",
        "user_authorities",
        "sessions",
        "schema_version",
    ] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "table {table} missing");
    }
}

#[tokio::test]
async fn test_schema_version_recorded_once() {
    let pool = init_in_memory().await.unwrap();
    mlib_common::db::init::create_schema(&pool).await.unwrap();

    let versions: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_version")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(versions, vec![CURRENT_SCHEMA_VERSION]);
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let pool = init_in_memory().await.unwrap();

    let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(enabled, 1);

    let orphan = sqlx::query("INSERT INTO songs (title, album_id) VALUES ('Orphan', 999)")
        .execute(&pool)
        .await;
    assert!(orphan.is_err(), "song without album should be rejected");
}
