//! Client-facing turn event protocol.
//!
//! Each event on a turn's stream is one JSON object, serialized untagged so
//! the wire shapes are exactly `{"searchStatus":...}`, `{"content":...}`,
//! `{"done":true,"suggestions":[...]}` and `{"error":...}`. `Done` and
//! `Error` are terminal: nothing follows them on the same channel.

use serde::{Deserialize, Serialize};

/// One event on a turn's server-to-client stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnEvent {
    /// Out-of-band web-search progress, interleaved before/around content.
    SearchStatus {
        #[serde(rename = "searchStatus")]
        search_status: String,
    },
    /// Terminal success event carrying follow-up suggestions (possibly empty).
    Done { done: bool, suggestions: Vec<String> },
    /// One incremental token/chunk of the assistant response.
    Content { content: String },
    /// Terminal failure event. `Done` is never sent after an error.
    Error { error: String },
}

impl TurnEvent {
    pub fn search_status(status: impl Into<String>) -> Self {
        TurnEvent::SearchStatus {
            search_status: status.into(),
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        TurnEvent::Content {
            content: content.into(),
        }
    }

    pub fn done(suggestions: Vec<String>) -> Self {
        TurnEvent::Done {
            done: true,
            suggestions,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        TurnEvent::Error {
            error: error.into(),
        }
    }

    /// Whether this event closes the channel.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnEvent::Done { .. } | TurnEvent::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_status_wire_shape() {
        let event = TurnEvent::search_status("🔍 Searching: rust");
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"searchStatus":"🔍 Searching: rust"}"#
        );
    }

    #[test]
    fn test_content_wire_shape() {
        let event = TurnEvent::content("hel");
        assert_eq!(serde_json::to_string(&event).unwrap(), r#"{"content":"hel"}"#);
    }

    #[test]
    fn test_done_wire_shape() {
        let event = TurnEvent::done(vec!["Tell me more".to_string()]);
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"done":true,"suggestions":["Tell me more"]}"#
        );
    }

    #[test]
    fn test_error_wire_shape() {
        let event = TurnEvent::error("Failed to send message");
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"error":"Failed to send message"}"#
        );
    }

    #[test]
    fn test_terminal_events() {
        assert!(TurnEvent::done(vec![]).is_terminal());
        assert!(TurnEvent::error("boom").is_terminal());
        assert!(!TurnEvent::content("x").is_terminal());
        assert!(!TurnEvent::search_status("x").is_terminal());
    }

    #[test]
    fn test_deserialize_roundtrip() {
        for event in [
            TurnEvent::search_status("s"),
            TurnEvent::content("c"),
            TurnEvent::done(vec!["a".to_string()]),
            TurnEvent::error("e"),
        ] {
            let json = serde_json::to_string(&event).unwrap();
            let parsed: TurnEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(event, parsed);
        }
    }
}
