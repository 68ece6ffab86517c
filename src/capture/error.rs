//! Session-error adapter.

use crate::models::{Record, RecordId, RecordKind, SessionErrorEvent};
use crate::security::{ContentRedactor, REDACTED_MARKER};
use serde_json::json;

/// Maps a session error to a problem record.
///
/// Returns `None` when the event carries no error or a blank message. A
/// sensitive message is replaced wholesale with the redaction sentinel —
/// never a partially redacted original — and flagged in the attributes.
#[must_use]
pub fn error_record(event: &SessionErrorEvent, session_id: &str) -> Option<Record> {
    let error = event.error.as_ref()?;
    if error.message.trim().is_empty() {
        return None;
    }

    let redactor = ContentRedactor::new();
    let mut attributes = serde_json::Map::new();
    attributes.insert("sessionId".to_string(), json!(session_id));
    attributes.insert("errorType".to_string(), json!(error.name));

    let body = if redactor.is_sensitive(&error.message) {
        attributes.insert("redacted".to_string(), json!(true));
        REDACTED_MARKER.to_string()
    } else {
        error.message.clone()
    };

    Some(Record {
        id: RecordId::generate(RecordKind::Problem),
        kind: RecordKind::Problem,
        body,
        created_at: crate::current_timestamp_millis(),
        attributes,
    })
}
