//! File-edit adapter.

use crate::models::{FileEditEvent, Record, RecordId, RecordKind};
use crate::security::admits_path;
use serde_json::json;

/// Maps a file edit to a refactor record.
///
/// Returns `None`, silently, when the path is not admitted — no log, since
/// the exclusion itself must not leak which files were excluded.
#[must_use]
pub fn file_edit_record(event: &FileEditEvent, session_id: &str) -> Option<Record> {
    if !admits_path(&event.path) {
        return None;
    }

    let normalized = event.path.replace('\\', "/");
    let base_name = normalized.rsplit('/').next().unwrap_or(normalized.as_str());
    let summary = format!("Edited {base_name}");

    let mut attributes = serde_json::Map::new();
    attributes.insert("sessionId".to_string(), json!(session_id));
    attributes.insert("summary".to_string(), json!(summary.clone()));
    attributes.insert("files".to_string(), json!([event.path.clone()]));

    Some(Record {
        id: RecordId::generate(RecordKind::Refactor),
        kind: RecordKind::Refactor,
        body: summary,
        created_at: crate::current_timestamp_millis(),
        attributes,
    })
}
