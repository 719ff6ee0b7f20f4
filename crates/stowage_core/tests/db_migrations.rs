use rusqlite::Connection;
use stowage_core::db::migrations::latest_version;
use stowage_core::db::{open_db, open_db_in_memory, DbError};
use stowage_core::{
    CatalogError, CategoryService, NewCategory, OwnerId, SqliteCategoryRepository,
};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "categories");
    assert_table_exists(&conn, "bins");
    assert_table_exists(&conn, "items");
    assert_table_exists(&conn, "tags");
    assert_table_exists(&conn, "item_tags");
}

#[test]
fn opening_same_database_twice_is_idempotent_and_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stowage.db");
    let owner = OwnerId::new("owner-a");

    let created_id = {
        let conn = open_db(&path).unwrap();
        assert_eq!(schema_version(&conn), latest_version());
        let service = CategoryService::new(SqliteCategoryRepository::try_new(&conn).unwrap());
        service.create(&owner, &NewCategory::new("Tools")).unwrap().id
    };

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let service = CategoryService::new(SqliteCategoryRepository::try_new(&conn).unwrap());
    let reloaded = service.get(&owner, created_id).unwrap();
    assert_eq!(reloaded.name, "Tools");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
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
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteCategoryRepository::try_new(&conn);
    match result {
        Err(CatalogError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_tables() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCategoryRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(CatalogError::MissingRequiredTable("categories"))
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
