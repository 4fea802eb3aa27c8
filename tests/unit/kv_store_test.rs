//! Unit tests for the key-value backends and the SQLite layer beneath them.

use std::sync::Arc;

use tempfile::TempDir;

use redblue::database::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};
use redblue::database::{Database, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
use redblue::types::errors::KvError;

fn sqlite_store() -> SqliteKeyValueStore {
    let db = Arc::new(Database::open_in_memory().expect("open_in_memory failed"));
    SqliteKeyValueStore::new(db)
}

// ─── Migrations ───

#[test]
fn test_migrations_reach_current_version() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(get_schema_version(&db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_kv_table_exists() {
    let db = Database::open_in_memory().unwrap();
    let exists: bool = db
        .connection()
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='kv_store'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);
    assert!(exists, "kv_store table should exist after migrations");
}

// ─── SQLite backend ───

#[test]
fn test_sqlite_get_missing_key_is_none() {
    let kv = sqlite_store();
    assert_eq!(kv.get("absent").unwrap(), None);
}

#[test]
fn test_sqlite_set_then_get() {
    let kv = sqlite_store();
    kv.set("pwdb.v1", r#"{"records":[]}"#).unwrap();
    assert_eq!(kv.get("pwdb.v1").unwrap().as_deref(), Some(r#"{"records":[]}"#));
}

#[test]
fn test_sqlite_set_overwrites() {
    let kv = sqlite_store();
    kv.set("k", "first").unwrap();
    kv.set("k", "second").unwrap();
    assert_eq!(kv.get("k").unwrap().as_deref(), Some("second"));
}

#[test]
fn test_sqlite_remove() {
    let kv = sqlite_store();
    kv.set("k", "v").unwrap();
    kv.remove("k").unwrap();
    assert_eq!(kv.get("k").unwrap(), None);
    // removing an absent key is fine
    kv.remove("k").unwrap();
}

#[test]
fn test_sqlite_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("redblue.db");

    {
        let kv = SqliteKeyValueStore::new(Arc::new(Database::open(&path).unwrap()));
        kv.set("pwdb.v1", "persisted").unwrap();
    }

    let kv = SqliteKeyValueStore::new(Arc::new(Database::open(&path).unwrap()));
    assert_eq!(kv.get("pwdb.v1").unwrap().as_deref(), Some("persisted"));
}

// ─── Memory backend ───

#[test]
fn test_memory_with_entry() {
    let kv = MemoryKeyValueStore::with_entry("k", "v");
    assert_eq!(kv.get("k").unwrap().as_deref(), Some("v"));
    assert_eq!(kv.write_count(), 0);
}

#[test]
fn test_memory_counts_successful_writes() {
    let kv = MemoryKeyValueStore::new();
    kv.set("a", "1").unwrap();
    kv.set("b", "2").unwrap();
    assert_eq!(kv.write_count(), 2);
}

#[test]
fn test_memory_fail_writes() {
    let kv = MemoryKeyValueStore::new();
    kv.set_fail_writes(true);
    let err = kv.set("k", "v").unwrap_err();
    assert!(matches!(err, KvError::WriteFailed(_)));
    assert_eq!(kv.get("k").unwrap(), None);
    assert_eq!(kv.write_count(), 0);

    kv.set_fail_writes(false);
    kv.set("k", "v").unwrap();
    assert_eq!(kv.write_count(), 1);
}

#[test]
fn test_open_fails_when_parent_is_a_file() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();

    let result = Database::open(blocker.join("redblue.db"));
    assert!(result.is_err(), "opening beneath a regular file must fail");
}
