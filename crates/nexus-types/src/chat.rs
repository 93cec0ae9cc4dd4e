//! Conversation, message, training instruction, and mode types.
//!
//! These model the persisted chat entities. Conversations may be anonymous
//! (no owner); messages are append-only and only ever carry the user or
//! assistant role once stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

// Re-export MessageRole from the llm module (used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// A conversation between a caller and the assistant.
///
/// `user_id` is `None` for anonymous conversations, which are answered but
/// never accumulate persisted messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: i64,
    pub title: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A single persisted message within a conversation.
///
/// Messages are ordered by `created_at` within a conversation and are
/// immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A globally persisted behavioral directive injected into every system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingInstruction {
    pub id: i64,
    pub instruction: String,
    pub created_at: DateTime<Utc>,
}

/// Reasoning mode selecting the system-prompt template for a turn.
///
/// Wire values are SCREAMING_SNAKE_CASE (`DEFAULT`, `WHAT_IF`, ...).
/// Absent or unrecognized input resolves to [`ChatMode::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatMode {
    Default,
    WhatIf,
    ChainReaction,
    ParallelTimelines,
}

impl ChatMode {
    /// Resolve an optional wire string to a mode, defaulting to `Default`
    /// when absent or unrecognized.
    pub fn resolve(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or(ChatMode::Default)
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatMode::Default => write!(f, "DEFAULT"),
            ChatMode::WhatIf => write!(f, "WHAT_IF"),
            ChatMode::ChainReaction => write!(f, "CHAIN_REACTION"),
            ChatMode::ParallelTimelines => write!(f, "PARALLEL_TIMELINES"),
        }
    }
}

impl FromStr for ChatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEFAULT" => Ok(ChatMode::Default),
            "WHAT_IF" => Ok(ChatMode::WhatIf),
            "CHAIN_REACTION" => Ok(ChatMode::ChainReaction),
            "PARALLEL_TIMELINES" => Ok(ChatMode::ParallelTimelines),
            other => Err(format!("invalid chat mode: '{other}'")),
        }
    }
}

impl Default for ChatMode {
    fn default() -> Self {
        ChatMode::Default
    }
}
