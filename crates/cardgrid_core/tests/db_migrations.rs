use cardgrid_core::db::migrations::latest_version;
use cardgrid_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "card_layouts");
    assert_table_exists(&conn, "field_value_sets");
}

#[test]
fn reopening_file_database_keeps_version_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cardgrid.db");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO card_layouts (project_key, document, updated_at) VALUES ('p1', '{}', 0);",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let rows: i64 = second
        .query_row("SELECT COUNT(*) FROM card_layouts;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn partially_migrated_database_is_upgraded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v1.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE card_layouts (
            project_key TEXT PRIMARY KEY NOT NULL,
            document    TEXT NOT NULL,
            updated_at  INTEGER NOT NULL
        );
        PRAGMA user_version = 1;",
    )
    .unwrap();
    drop(conn);

    let upgraded = open_db(&path).unwrap();
    assert_eq!(schema_version(&upgraded), latest_version());
    assert_table_exists(&upgraded, "field_value_sets");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_migration_reports_version_and_keeps_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blocked.db");

    // An index already owns the name migration 2 wants for its table.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE card_layouts (
            project_key TEXT PRIMARY KEY NOT NULL,
            document    TEXT NOT NULL,
            updated_at  INTEGER NOT NULL
        );
        CREATE INDEX field_value_sets ON card_layouts (updated_at);
        PRAGMA user_version = 1;",
    )
    .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::MigrationFailed { version, .. } => assert_eq!(version, 2),
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 1);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
