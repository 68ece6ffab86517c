//! Shared connection handling for the `SQLite` store.
//!
//! Utilities for opening connections with proper mutex handling, durability
//! configuration, and recovery from artifacts of a prior unclean shutdown.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Helper to acquire mutex lock with poison recovery.
///
/// If the mutex is poisoned (due to a panic in a previous critical section),
/// we recover the inner value and log a warning. This prevents cascading
/// failures when one operation panics; the connection state is still valid.
pub(crate) fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            metrics::counter!("sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Configures a `SQLite` connection for durability and concurrency.
///
/// - **WAL mode**: write-ahead logging so readers never block the writer
/// - **NORMAL synchronous**: balances durability with performance
/// - **`busy_timeout`**: waits up to 5 seconds for locks instead of failing
///   immediately, bounding the wait rather than hanging
pub(crate) fn configure_connection(conn: &Connection) {
    // pragma_update returns the pragma's result value, which we ignore -
    // journal_mode returns a string like "wal" that would fail execute_batch
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    let _ = conn.pragma_update(None, "busy_timeout", "5000");
}

/// Removes WAL and shared-memory side files left by a prior unclean exit.
///
/// An orphaned `-wal`/`-shm` pair can hold a stale lock that makes the next
/// open hang; SQLite rebuilds both on demand, so removing them before open
/// is safe for a single-writer local store.
pub(crate) fn remove_stale_artifacts(db_path: &Path) {
    for suffix in ["-wal", "-shm"] {
        let mut side_file = db_path.as_os_str().to_owned();
        side_file.push(suffix);
        let side_file = PathBuf::from(side_file);

        if side_file.exists() {
            match std::fs::remove_file(&side_file) {
                Ok(()) => {
                    tracing::warn!(
                        path = %side_file.display(),
                        "removed stale durability artifact from prior unclean shutdown"
                    );
                },
                Err(e) => {
                    tracing::warn!(
                        path = %side_file.display(),
                        error = %e,
                        "failed to remove stale durability artifact"
                    );
                },
            }
        }
    }
}

/// Probes whether the FTS5 extension is available on this connection.
///
/// Creates and immediately drops a throwaway virtual index; the result is
/// cached by the caller for the connection's lifetime rather than re-probed
/// per operation.
pub(crate) fn probe_fts5(conn: &Connection) -> bool {
    let available = conn
        .execute_batch(
            "CREATE VIRTUAL TABLE fts5_probe USING fts5(probe);
             DROP TABLE fts5_probe;",
        )
        .is_ok();

    if !available {
        tracing::warn!("FTS5 unavailable, search will use substring scan");
    }

    available
}
