//! Record types and identifiers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for a captured record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a new record ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh ID with a kind prefix, e.g. `refactor_<uuid>`.
    #[must_use]
    pub fn generate(kind: RecordKind) -> Self {
        Self(format!("{}_{}", kind.as_str(), uuid::Uuid::new_v4()))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Category of a captured record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Something learned about the codebase or environment.
    Discovery,
    /// A choice made and its direction.
    Decision,
    /// An error or failure that occurred.
    Problem,
    /// Work that resolved or produced something.
    Solution,
    /// A recurring approach or convention.
    #[default]
    Pattern,
    /// A caution worth surfacing later.
    Warning,
    /// A confirmed positive outcome.
    Success,
    /// A change to existing code.
    Refactor,
    /// A defect fix.
    Bugfix,
    /// New functionality.
    Feature,
}

impl RecordKind {
    /// Returns all kind variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Discovery,
            Self::Decision,
            Self::Problem,
            Self::Solution,
            Self::Pattern,
            Self::Warning,
            Self::Success,
            Self::Refactor,
            Self::Bugfix,
            Self::Feature,
        ]
    }

    /// Returns the kind as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Decision => "decision",
            Self::Problem => "problem",
            Self::Solution => "solution",
            Self::Pattern => "pattern",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Refactor => "refactor",
            Self::Bugfix => "bugfix",
            Self::Feature => "feature",
        }
    }

    /// Parses a kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "discovery" => Some(Self::Discovery),
            "decision" => Some(Self::Decision),
            "problem" => Some(Self::Problem),
            "solution" => Some(Self::Solution),
            "pattern" => Some(Self::Pattern),
            "warning" => Some(Self::Warning),
            "success" => Some(Self::Success),
            "refactor" => Some(Self::Refactor),
            "bugfix" => Some(Self::Bugfix),
            "feature" => Some(Self::Feature),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single normalized captured event, in transit or already stored.
///
/// The body is redacted before the record is constructed; nothing downstream
/// of an adapter ever sees unfiltered text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier. Writing an existing id replaces the prior record
    /// entirely (last-write-wins).
    pub id: RecordId,
    /// Record category.
    pub kind: RecordKind,
    /// Already-redacted free text.
    pub body: String,
    /// Creation timestamp (Unix epoch milliseconds).
    pub created_at: i64,
    /// Open string-keyed attribute map. Commonly holds `sessionId`, `tool`,
    /// `summary`, and `files`.
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    /// Creates a record with a generated id and the current timestamp.
    #[must_use]
    pub fn new(kind: RecordKind, body: impl Into<String>) -> Self {
        Self {
            id: RecordId::generate(kind),
            kind,
            body: body.into(),
            created_at: crate::current_timestamp_millis(),
            attributes: serde_json::Map::new(),
        }
    }

    /// Returns the session id attribute, if set.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.attributes.get("sessionId").and_then(|v| v.as_str())
    }
}

/// Derived statistics over a store.
///
/// Zero-valued on a store that has never been written; never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Total record count.
    pub count: u64,
    /// Approximate database size in bytes (`page_count * page_size`, not an
    /// exact on-disk measurement).
    pub approx_size_bytes: u64,
    /// Earliest `created_at` across all records.
    pub oldest_timestamp: Option<i64>,
    /// Latest `created_at` across all records.
    pub newest_timestamp: Option<i64>,
    /// Record counts grouped by kind.
    pub counts_by_kind: HashMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in RecordKind::all() {
            assert_eq!(RecordKind::parse(kind.as_str()), Some(*kind));
        }
    }

    #[test]
    fn test_kind_parse_unknown() {
        assert_eq!(RecordKind::parse("nonsense"), None);
        assert_eq!(RecordKind::parse(""), None);
    }

    #[test]
    fn test_kind_parse_case_insensitive() {
        assert_eq!(RecordKind::parse("Discovery"), Some(RecordKind::Discovery));
        assert_eq!(RecordKind::parse("REFACTOR"), Some(RecordKind::Refactor));
    }

    #[test]
    fn test_generated_id_prefix() {
        let id = RecordId::generate(RecordKind::Problem);
        assert!(id.as_str().starts_with("problem_"));
    }

    #[test]
    fn test_record_new() {
        let record = Record::new(RecordKind::Discovery, "found the config loader");
        assert_eq!(record.kind, RecordKind::Discovery);
        assert_eq!(record.body, "found the config loader");
        assert!(record.created_at > 0);
        assert!(record.attributes.is_empty());
        assert!(record.session_id().is_none());
    }

    #[test]
    fn test_record_session_id() {
        let mut record = Record::new(RecordKind::Pattern, "body");
        record
            .attributes
            .insert("sessionId".to_string(), serde_json::json!("s-42"));
        assert_eq!(record.session_id(), Some("s-42"));
    }
}
