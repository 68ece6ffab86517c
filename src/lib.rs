//! # Engram
//!
//! Event capture and persistence pipeline for AI coding session memory.
//!
//! Engram receives discrete activity events (tool calls, file edits, errors)
//! from a host application, applies privacy redaction, accumulates records in
//! an in-memory buffer, and durably persists them to a local `SQLite`
//! database with full-text search.
//!
//! ## Features
//!
//! - Pre-storage secret redaction (a flush retry can never leak)
//! - Size- and time-triggered buffering with failure-safe restore
//! - WAL-mode `SQLite` persistence with stale-artifact recovery on open
//! - FTS5 full-text search with an automatic substring-scan fallback
//!
//! ## Example
//!
//! ```rust,ignore
//! use engram::{EventBuffer, SqliteStore, capture};
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteStore::open("./memory.db")?);
//! let mut buffer = EventBuffer::new(Arc::clone(&store), config.buffer);
//! buffer.start();
//!
//! if let Some(record) = capture::file_edit_record(&event, "session-1") {
//!     buffer.add(record);
//! }
//!
//! buffer.stop(true);
//! store.close();
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod buffer;
pub mod capture;
pub mod config;
pub mod models;
pub mod observability;
pub mod security;
pub mod storage;

// Re-exports for convenience
pub use buffer::{EventBuffer, RecordSink};
pub use config::{BufferConfig, EngramConfig};
pub use models::{
    ErrorInfo, FileEditEvent, Record, RecordId, RecordKind, SessionErrorEvent, StoreStats,
    ToolEvent,
};
pub use security::{ContentRedactor, admits_path};
pub use storage::SqliteStore;

/// Error type for engram operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when a caller-supplied value cannot be used, e.g. an empty
    /// record id or a storage path whose parent directory cannot be created.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` database operations fail
    /// - Filesystem I/O errors occur
    /// - A buffer sink rejects a batch
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for engram operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in milliseconds.
///
/// Centralized so every component stamps records the same way. Clamps to 0
/// if the system clock reports a time before the Unix epoch.
#[must_use]
pub fn current_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::OperationFailed {
            operation: "write".to_string(),
            cause: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'write' failed: disk full");
    }

    #[test]
    fn test_current_timestamp_millis() {
        let ts = current_timestamp_millis();
        // 2020-01-01 in millis; sanity check the clock is plausible
        assert!(ts > 1_577_836_800_000);
    }
}
