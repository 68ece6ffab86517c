//! Configuration for the capture pipeline.
//!
//! Configuration-file loading belongs to the host; this module only defines
//! the typed settings the pipeline consumes.

use std::path::PathBuf;
use std::time::Duration;

/// Buffer sizing and flush cadence.
#[derive(Debug, Clone)]
pub struct BufferConfig {
    /// Number of buffered records that triggers a synchronous flush.
    pub max_records: usize,
    /// Interval between timer-driven flushes.
    pub flush_interval: Duration,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_records: 20,
            flush_interval: Duration::from_secs(30),
        }
    }
}

/// Top-level configuration for an engram pipeline instance.
#[derive(Debug, Clone)]
pub struct EngramConfig {
    /// Path to the `SQLite` database file.
    pub db_path: PathBuf,
    /// Buffer settings.
    pub buffer: BufferConfig,
}

impl Default for EngramConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./engram.db"),
            buffer: BufferConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngramConfig::default();
        assert_eq!(config.buffer.max_records, 20);
        assert_eq!(config.buffer.flush_interval, Duration::from_secs(30));
        assert_eq!(config.db_path, PathBuf::from("./engram.db"));
    }
}
