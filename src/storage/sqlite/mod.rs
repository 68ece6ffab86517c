//! `SQLite`-backed record store.
//!
//! One file at a configurable path, WAL-mode durability, an FTS5 secondary
//! index when the platform's `SQLite` build supports it, and a substring-scan
//! fallback when it does not. Cross-process coordination is delegated
//! entirely to `SQLite`'s own write-ahead locking.

mod connection;
mod row;
mod sql;

use crate::buffer::RecordSink;
use crate::models::{Record, StoreStats};
use crate::{Error, Result};
use connection::{acquire_lock, configure_connection, probe_fts5, remove_stale_artifacts};
use row::{RecordRow, record_from_row};
use rusqlite::{Connection, OptionalExtension, params};
use sql::{build_match_expression, escape_like_wildcards};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

/// Embedded persistent record store.
///
/// All operations are synchronous from the caller's view. Reads, searches,
/// and stats convert internal faults to empty/zero results; only `write`
/// reports failure, so the buffer can restore its batch for retry. Storage
/// faults never crash the host process.
pub struct SqliteStore {
    /// Connection to the `SQLite` database.
    ///
    /// Protected by Mutex because `rusqlite::Connection` is not `Sync`.
    /// WAL mode and `busy_timeout` handle concurrent access gracefully.
    conn: Mutex<Connection>,
    /// Path to the database file (None for in-memory).
    db_path: Option<PathBuf>,
    /// Whether FTS5 was detected at open. Probed once, cached for the
    /// connection's lifetime.
    fts_available: bool,
}

impl SqliteStore {
    /// Opens (or creates) the store at `db_path`.
    ///
    /// Stale `-wal`/`-shm` artifacts of a prior unclean shutdown are removed
    /// before open so the connection cannot hang on an orphaned lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized; the
    /// owning session should degrade to a no-op pipeline rather than crash.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                    operation: "create_store_dir".to_string(),
                    cause: e.to_string(),
                })?;
            }
        }

        remove_stale_artifacts(&db_path);

        let conn = Connection::open(&db_path).map_err(|e| Error::OperationFailed {
            operation: "open_sqlite".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_connection(conn, Some(db_path))
    }

    /// Creates an in-memory store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::OperationFailed {
            operation: "open_sqlite_in_memory".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_connection(conn, None)
    }

    fn from_connection(conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        configure_connection(&conn);

        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                body TEXT NOT NULL,
                attributes TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                session_id TEXT
            )",
            [],
        )
        .map_err(|e| Error::OperationFailed {
            operation: "create_records_table".to_string(),
            cause: e.to_string(),
        })?;

        Self::create_indexes(&conn);

        let fts_available = probe_fts5(&conn);
        if fts_available {
            // Standalone FTS5 table keyed by record id, not content-synced;
            // the MATCH result set is small so the id join stays cheap.
            conn.execute(
                "CREATE VIRTUAL TABLE IF NOT EXISTS records_fts USING fts5(
                    id,
                    body
                )",
                [],
            )
            .map_err(|e| Error::OperationFailed {
                operation: "create_fts_table".to_string(),
                cause: e.to_string(),
            })?;
        }

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            fts_available,
        })
    }

    /// Creates indexes for common query patterns.
    fn create_indexes(conn: &Connection) {
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind)",
            [],
        );
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_created_at ON records(created_at DESC)",
            [],
        );
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_session_id ON records(session_id)",
            [],
        );
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Returns whether indexed full-text search was detected at open.
    #[must_use]
    pub const fn fts_available(&self) -> bool {
        self.fts_available
    }

    /// Upserts a record by id (full replace on conflict).
    ///
    /// The FTS index is updated as part of the same logical operation when
    /// available; an index failure is logged and swallowed because the
    /// primary write has already succeeded and the index is a convenience,
    /// not a correctness-critical path.
    ///
    /// # Errors
    ///
    /// Returns an error if the primary write fails; the caller (normally the
    /// buffer) restores and retries, which is safe because the upsert is
    /// idempotent per id.
    pub fn write(&self, record: &Record) -> Result<()> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            let attributes_json =
                serde_json::to_string(&record.attributes).map_err(|e| Error::OperationFailed {
                    operation: "serialize_attributes".to_string(),
                    cause: e.to_string(),
                })?;

            conn.execute(
                "INSERT OR REPLACE INTO records (id, kind, body, attributes, created_at, session_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id.as_str(),
                    record.kind.as_str(),
                    record.body,
                    attributes_json,
                    record.created_at,
                    record.session_id(),
                ],
            )
            .map_err(|e| Error::OperationFailed {
                operation: "insert_record".to_string(),
                cause: e.to_string(),
            })?;

            if self.fts_available {
                if let Err(e) = Self::update_fts(&conn, record) {
                    tracing::warn!(
                        id = %record.id,
                        error = %e,
                        "full-text index update failed, record persisted without it"
                    );
                }
            }

            Ok(())
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("write", start, status);
        result
    }

    /// Replaces the FTS row for a record.
    fn update_fts(conn: &Connection, record: &Record) -> Result<()> {
        // FTS5 tables have no unique constraints, so delete-then-insert
        conn.execute(
            "DELETE FROM records_fts WHERE id = ?1",
            params![record.id.as_str()],
        )
        .map_err(|e| Error::OperationFailed {
            operation: "delete_fts".to_string(),
            cause: e.to_string(),
        })?;

        conn.execute(
            "INSERT INTO records_fts (id, body) VALUES (?1, ?2)",
            params![record.id.as_str(), record.body],
        )
        .map_err(|e| Error::OperationFailed {
            operation: "insert_fts".to_string(),
            cause: e.to_string(),
        })?;

        Ok(())
    }

    /// Reads a record by id.
    ///
    /// Returns `None` for a missing id and also on internal fault (logged).
    #[must_use]
    pub fn read(&self, id: &str) -> Option<Record> {
        let start = Instant::now();
        let result: Result<Option<Record>> = (|| {
            let conn = acquire_lock(&self.conn);
            let row = conn
                .query_row(
                    "SELECT id, kind, body, attributes, created_at FROM records WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok(RecordRow {
                            id: row.get(0)?,
                            kind: row.get(1)?,
                            body: row.get(2)?,
                            attributes: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    },
                )
                .optional()
                .map_err(|e| Error::OperationFailed {
                    operation: "read_record".to_string(),
                    cause: e.to_string(),
                })?;

            Ok(row.map(record_from_row))
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("read", start, status);

        match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(id, error = %e, "read failed");
                None
            },
        }
    }

    /// Searches record bodies, honoring `limit`.
    ///
    /// Uses the FTS5 index (relevance-ranked) when it was detected at open;
    /// falls back to an unindexed substring scan ordered by recency when FTS
    /// was never available or the indexed query itself fails. Empty queries
    /// and internal faults yield an empty result.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<Record> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let start = Instant::now();
        let conn = acquire_lock(&self.conn);

        if self.fts_available {
            match Self::search_fts(&conn, query, limit) {
                Ok(records) => {
                    record_operation_metrics("search", start, "success");
                    return records;
                },
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "indexed search failed, falling back to substring scan"
                    );
                },
            }
        }

        match Self::search_like(&conn, query, limit) {
            Ok(records) => {
                record_operation_metrics("search", start, "success");
                records
            },
            Err(e) => {
                tracing::warn!(error = %e, "substring search failed");
                record_operation_metrics("search", start, "error");
                Vec::new()
            },
        }
    }

    /// Relevance-ranked FTS5 search.
    fn search_fts(conn: &Connection, query: &str, limit: usize) -> Result<Vec<Record>> {
        let mut stmt = conn
            .prepare(
                "SELECT r.id, r.kind, r.body, r.attributes, r.created_at
                 FROM records_fts f
                 JOIN records r ON r.id = f.id
                 WHERE records_fts MATCH ?1
                 ORDER BY bm25(records_fts)
                 LIMIT ?2",
            )
            .map_err(|e| Error::OperationFailed {
                operation: "prepare_fts_search".to_string(),
                cause: e.to_string(),
            })?;

        let match_expression = build_match_expression(query);
        Self::collect_rows(&mut stmt, params![match_expression, limit_param(limit)])
    }

    /// Substring scan over bodies, newest first.
    ///
    /// `%`/`_` in the query are escaped so caller input cannot inject
    /// unintended wildcard behavior.
    fn search_like(conn: &Connection, query: &str, limit: usize) -> Result<Vec<Record>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, kind, body, attributes, created_at
                 FROM records
                 WHERE body LIKE ?1 ESCAPE '\\'
                 ORDER BY created_at DESC
                 LIMIT ?2",
            )
            .map_err(|e| Error::OperationFailed {
                operation: "prepare_like_search".to_string(),
                cause: e.to_string(),
            })?;

        let pattern = format!("%{}%", escape_like_wildcards(query));
        Self::collect_rows(&mut stmt, params![pattern, limit_param(limit)])
    }

    fn collect_rows(
        stmt: &mut rusqlite::Statement<'_>,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Record>> {
        let rows = stmt
            .query_map(params, |row| {
                Ok(RecordRow {
                    id: row.get(0)?,
                    kind: row.get(1)?,
                    body: row.get(2)?,
                    attributes: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .map_err(|e| Error::OperationFailed {
                operation: "execute_search".to_string(),
                cause: e.to_string(),
            })?;

        let mut records = Vec::new();
        for row in rows {
            let record_row = row.map_err(|e| Error::OperationFailed {
                operation: "read_search_row".to_string(),
                cause: e.to_string(),
            })?;
            records.push(record_from_row(record_row));
        }

        Ok(records)
    }

    /// Returns derived statistics.
    ///
    /// Well-defined zero values on a never-written store; never an error.
    /// The size figure is `page_count * page_size`, approximate by design.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let start = Instant::now();
        let conn = acquire_lock(&self.conn);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .unwrap_or(0);

        let (oldest_timestamp, newest_timestamp) = conn
            .query_row(
                "SELECT MIN(created_at), MAX(created_at) FROM records",
                [],
                |row| Ok((row.get::<_, Option<i64>>(0)?, row.get::<_, Option<i64>>(1)?)),
            )
            .unwrap_or((None, None));

        let mut counts_by_kind: HashMap<String, u64> = HashMap::new();
        if let Ok(mut stmt) = conn.prepare("SELECT kind, COUNT(*) FROM records GROUP BY kind") {
            if let Ok(rows) = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            }) {
                for row in rows.flatten() {
                    counts_by_kind.insert(row.0, u64::try_from(row.1).unwrap_or(0));
                }
            }
        }

        let page_count: i64 = conn
            .pragma_query_value(None, "page_count", |row| row.get(0))
            .unwrap_or(0);
        let page_size: i64 = conn
            .pragma_query_value(None, "page_size", |row| row.get(0))
            .unwrap_or(4096);

        record_operation_metrics("stats", start, "success");

        StoreStats {
            count: u64::try_from(count).unwrap_or(0),
            approx_size_bytes: u64::try_from(page_count.saturating_mul(page_size)).unwrap_or(0),
            oldest_timestamp,
            newest_timestamp,
            counts_by_kind,
        }
    }

    /// Closes the store, dropping the connection.
    ///
    /// Shutdown ordering is load-bearing: stop the buffer (with its final
    /// flush) before closing, so no write is attempted against a closed
    /// store.
    pub fn close(self) {
        tracing::debug!(path = ?self.db_path, "closing store");
        drop(self);
    }
}

impl RecordSink for SqliteStore {
    fn persist(&self, batch: &[Record]) -> Result<()> {
        for record in batch {
            self.write(record)?;
        }
        Ok(())
    }
}

fn record_operation_metrics(operation: &'static str, start: Instant, status: &'static str) {
    metrics::counter!(
        "storage_operations_total",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "storage_operation_duration_ms",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}

/// Converts a caller limit to a SQL parameter.
fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
