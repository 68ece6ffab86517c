//! Tool-execution adapter.

use crate::models::{Record, RecordId, RecordKind, ToolEvent};
use crate::security::{ContentRedactor, admits_path};
use serde_json::{Value, json};

/// Scalar argument keys that may carry a file path.
const PATH_KEYS: &[&str] = &["file_path", "path", "notebook_path"];

/// Array argument key that may carry several file paths.
const PATHS_ARRAY_KEY: &str = "paths";

/// Maps a tool execution to a record.
///
/// The shell tool's command is routed through the idiom-aware command
/// sanitizer rather than generic redaction, since flag-based credentials
/// need different detection than key:value text. Returns `None` when the
/// event carries nothing worth keeping (e.g. a shell call whose command is
/// empty).
#[must_use]
pub fn tool_record(event: &ToolEvent, session_id: &str) -> Option<Record> {
    let redactor = ContentRedactor::new();
    let tool = event.tool_name.to_lowercase();
    let kind = kind_for_tool(&tool);

    let files = extract_paths(event);
    let summary = summarize(&redactor, &tool, event, &files)?;
    let body = redactor.redact(&summary);

    let mut attributes = serde_json::Map::new();
    attributes.insert("sessionId".to_string(), json!(session_id));
    attributes.insert("tool".to_string(), json!(event.tool_name));
    attributes.insert("callId".to_string(), json!(event.call_id));
    attributes.insert("summary".to_string(), json!(body.clone()));
    if !files.is_empty() {
        attributes.insert("files".to_string(), json!(files));
    }

    Some(Record {
        id: RecordId::generate(kind),
        kind,
        body,
        created_at: crate::current_timestamp_millis(),
        attributes,
    })
}

/// Maps a lowercased tool name to a record kind.
fn kind_for_tool(tool: &str) -> RecordKind {
    match tool {
        "read" | "search" | "glob" | "ask" => RecordKind::Discovery,
        "write" | "bash" => RecordKind::Solution,
        "edit" => RecordKind::Refactor,
        _ => RecordKind::Pattern,
    }
}

/// Extracts file paths from the known argument keys plus the array field,
/// de-duplicated in first-seen order and gated through path admission.
fn extract_paths(event: &ToolEvent) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();

    let mut push = |candidate: &str| {
        if admits_path(candidate) && !paths.iter().any(|p| p == candidate) {
            paths.push(candidate.to_string());
        }
    };

    for key in PATH_KEYS {
        if let Some(Value::String(s)) = event.arguments.get(*key) {
            push(s);
        }
    }

    if let Some(Value::Array(items)) = event.arguments.get(PATHS_ARRAY_KEY) {
        for item in items {
            if let Value::String(s) = item {
                push(s);
            }
        }
    }

    paths
}

/// Formats a short human summary per tool type.
fn summarize(
    redactor: &ContentRedactor,
    tool: &str,
    event: &ToolEvent,
    files: &[String],
) -> Option<String> {
    let first_file = files.first().map(String::as_str);

    let summary = match tool {
        "read" => format!("Read {}", first_file.unwrap_or("a file")),
        "search" => format!(
            "Searched for {}",
            string_argument(event, &["pattern", "query"]).unwrap_or_else(|| "a pattern".to_string())
        ),
        "glob" => format!(
            "Globbed {}",
            string_argument(event, &["pattern"]).unwrap_or_else(|| "a pattern".to_string())
        ),
        "ask" => "Asked the user a question".to_string(),
        "write" => format!("Wrote {}", first_file.unwrap_or("a file")),
        "edit" => format!("Edited {}", first_file.unwrap_or("a file")),
        "bash" => {
            let command = string_argument(event, &["command"]).unwrap_or_default();
            format!("Ran: {}", redactor.redact_command(&command)?)
        },
        other => format!("Used tool {other}"),
    };

    Some(summary)
}

/// Returns the first present string argument among `keys`.
fn string_argument(event: &ToolEvent, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        event
            .arguments
            .get(*key)
            .and_then(Value::as_str)
            .map(ToString::to_string)
    })
}
