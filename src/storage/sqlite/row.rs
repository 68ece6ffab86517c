//! Row mapping between the `records` table and the domain type.

use crate::models::{Record, RecordId, RecordKind};

/// Raw column values of one `records` row.
pub(crate) struct RecordRow {
    pub id: String,
    pub kind: String,
    pub body: String,
    pub attributes: String,
    pub created_at: i64,
}

/// Builds a domain record from a raw row.
///
/// Stored data is trusted but not assumed perfect: an unknown kind string
/// degrades to `Pattern` and unparseable attribute JSON degrades to an empty
/// map rather than failing the read.
pub(crate) fn record_from_row(row: RecordRow) -> Record {
    let kind = RecordKind::parse(&row.kind).unwrap_or_default();

    let attributes = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(
        &row.attributes,
    )
    .unwrap_or_else(|e| {
        tracing::warn!(id = %row.id, error = %e, "unparseable attributes column, dropping");
        serde_json::Map::new()
    });

    Record {
        id: RecordId::new(row.id),
        kind,
        body: row.body,
        created_at: row.created_at,
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_row() {
        let record = record_from_row(RecordRow {
            id: "r-1".to_string(),
            kind: "discovery".to_string(),
            body: "found it".to_string(),
            attributes: r#"{"sessionId":"s-1"}"#.to_string(),
            created_at: 1_700_000_000_000,
        });

        assert_eq!(record.id.as_str(), "r-1");
        assert_eq!(record.kind, RecordKind::Discovery);
        assert_eq!(record.body, "found it");
        assert_eq!(record.created_at, 1_700_000_000_000);
        assert_eq!(record.session_id(), Some("s-1"));
    }

    #[test]
    fn test_unknown_kind_degrades_to_pattern() {
        let record = record_from_row(RecordRow {
            id: "r-2".to_string(),
            kind: "mystery".to_string(),
            body: String::new(),
            attributes: "{}".to_string(),
            created_at: 0,
        });
        assert_eq!(record.kind, RecordKind::Pattern);
    }

    #[test]
    fn test_bad_attributes_degrade_to_empty() {
        let record = record_from_row(RecordRow {
            id: "r-3".to_string(),
            kind: "problem".to_string(),
            body: String::new(),
            attributes: "not json".to_string(),
            created_at: 0,
        });
        assert!(record.attributes.is_empty());
    }
}
