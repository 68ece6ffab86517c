//! On-disk durability tests for the `SQLite` store.

use engram::models::{Record, RecordId, RecordKind};
use engram::storage::SqliteStore;

fn record(id: &str, kind: RecordKind, body: &str, created_at: i64) -> Record {
    Record {
        id: RecordId::new(id),
        kind,
        body: body.to_string(),
        created_at,
        attributes: serde_json::Map::new(),
    }
}

#[test]
fn reopen_preserves_records_and_search() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("memory.db");

    {
        let store = SqliteStore::open(&db_path).unwrap();
        store
            .write(&record("r-1", RecordKind::Decision, "switch to tokio", 1))
            .unwrap();
        store
            .write(&record("r-2", RecordKind::Problem, "flaky integration test", 2))
            .unwrap();
        store.close();
    }

    let reopened = SqliteStore::open(&db_path).unwrap();
    assert_eq!(reopened.stats().count, 2);
    assert_eq!(reopened.read("r-1").unwrap().body, "switch to tokio");
    assert_eq!(reopened.search("flaky", 10).len(), 1);
}

#[test]
fn reopen_with_orphaned_wal_artifacts_does_not_hang_or_fail() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("memory.db");

    {
        let store = SqliteStore::open(&db_path).unwrap();
        store
            .write(&record("r-1", RecordKind::Success, "first run", 1))
            .unwrap();
        store.close();
    }

    // Simulate an unclean shutdown leaving garbage side files behind.
    std::fs::write(dir.path().join("memory.db-wal"), b"not a real wal").unwrap();
    std::fs::write(dir.path().join("memory.db-shm"), b"not a real shm").unwrap();

    let reopened = SqliteStore::open(&db_path).unwrap();
    assert_eq!(reopened.read("r-1").unwrap().body, "first run");

    reopened
        .write(&record("r-2", RecordKind::Success, "second run", 2))
        .unwrap();
    assert_eq!(reopened.stats().count, 2);
}

#[test]
fn overwrite_across_sessions_is_last_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("memory.db");

    {
        let store = SqliteStore::open(&db_path).unwrap();
        store
            .write(&record("same-id", RecordKind::Pattern, "stale body", 1))
            .unwrap();
        store.close();
    }

    {
        let store = SqliteStore::open(&db_path).unwrap();
        store
            .write(&record("same-id", RecordKind::Pattern, "fresh body", 2))
            .unwrap();
        store.close();
    }

    let store = SqliteStore::open(&db_path).unwrap();
    assert_eq!(store.stats().count, 1);
    assert_eq!(store.read("same-id").unwrap().body, "fresh body");
    assert!(store.search("stale", 10).is_empty());
    assert_eq!(store.search("fresh", 10).len(), 1);
}

#[test]
fn stats_grow_with_size() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("memory.db")).unwrap();

    let before = store.stats();
    for n in 0..50 {
        store
            .write(&record(
                &format!("r-{n}"),
                RecordKind::Discovery,
                &"body ".repeat(100),
                n,
            ))
            .unwrap();
    }
    let after = store.stats();

    assert_eq!(after.count, 50);
    assert!(after.approx_size_bytes >= before.approx_size_bytes);
    assert_eq!(after.oldest_timestamp, Some(0));
    assert_eq!(after.newest_timestamp, Some(49));
}
