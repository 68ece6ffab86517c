//! Inbound event shapes delivered by the host.
//!
//! Field names follow the host's wire format (camelCase JSON). These are the
//! raw shapes the capture adapters normalize into [`Record`](super::Record)s.

use serde::{Deserialize, Serialize};

/// A tool execution reported by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolEvent {
    /// Name of the tool that ran.
    pub tool_name: String,
    /// Session the execution belongs to.
    pub session_id: String,
    /// Host-assigned call identifier.
    pub call_id: String,
    /// Open argument map as the host supplied it.
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

/// A file edit reported by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEditEvent {
    /// Path of the edited file.
    pub path: String,
    /// Session the edit belongs to, when known.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Error details carried by a [`SessionErrorEvent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Human-readable error message.
    pub message: String,
    /// Error type name.
    pub name: String,
}

/// A session-level error reported by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionErrorEvent {
    /// The error, absent when the host reports a non-error completion.
    #[serde(default)]
    pub error: Option<ErrorInfo>,
    /// Session the error belongs to, when known.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_event_wire_format() {
        let event: ToolEvent = serde_json::from_str(
            r#"{
                "toolName": "read",
                "sessionId": "s-1",
                "callId": "c-9",
                "arguments": {"file_path": "src/main.rs"}
            }"#,
        )
        .unwrap();
        assert_eq!(event.tool_name, "read");
        assert_eq!(event.session_id, "s-1");
        assert_eq!(event.arguments["file_path"], "src/main.rs");
    }

    #[test]
    fn test_tool_event_missing_arguments() {
        let event: ToolEvent = serde_json::from_str(
            r#"{"toolName": "bash", "sessionId": "s-1", "callId": "c-1"}"#,
        )
        .unwrap();
        assert!(event.arguments.is_empty());
    }

    #[test]
    fn test_error_event_without_error() {
        let event: SessionErrorEvent = serde_json::from_str(r#"{"sessionId": "s-1"}"#).unwrap();
        assert!(event.error.is_none());
    }
}
