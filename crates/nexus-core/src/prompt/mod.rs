//! Prompt composition.
//!
//! Builds the ordered message list for a turn: one system message (mode
//! template + anti-merging directive + optional training block + optional
//! web-search block), the prior history, then the current user message.
//! All functions are pure; the composition-time date is passed in so the
//! web-search block is deterministic under test.

pub mod templates;

use chrono::{DateTime, Utc};

use nexus_types::chat::{ChatMessage, ChatMode, TrainingInstruction};
use nexus_types::llm::{Message, MessageContent, MessageRole};

use self::templates::{
    ANTI_MERGING_DIRECTIVE, CHAIN_REACTION_TEMPLATE, DEFAULT_TEMPLATE,
    PARALLEL_TIMELINES_TEMPLATE, TRAINING_BLOCK_FOOTER, TRAINING_BLOCK_HEADER, WHAT_IF_TEMPLATE,
};

/// Base template text for a mode.
pub fn mode_template(mode: ChatMode) -> &'static str {
    match mode {
        ChatMode::Default => DEFAULT_TEMPLATE,
        ChatMode::WhatIf => WHAT_IF_TEMPLATE,
        ChatMode::ChainReaction => CHAIN_REACTION_TEMPLATE,
        ChatMode::ParallelTimelines => PARALLEL_TIMELINES_TEMPLATE,
    }
}

/// Compose the system prompt for a turn.
///
/// Order: mode template, anti-merging directive, training block (only when
/// instructions exist, in the given retrieval order), web-search block
/// (only when search is active, stamped with `now`).
pub fn compose_system_prompt(
    mode: ChatMode,
    web_search_active: bool,
    now: DateTime<Utc>,
    instructions: &[TrainingInstruction],
) -> String {
    let mut prompt = String::from(mode_template(mode));
    prompt.push_str(ANTI_MERGING_DIRECTIVE);

    if !instructions.is_empty() {
        let joined = instructions
            .iter()
            .map(|t| t.instruction.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        prompt.push_str(TRAINING_BLOCK_HEADER);
        prompt.push_str(&joined);
        prompt.push_str(TRAINING_BLOCK_FOOTER);
    }

    if web_search_active {
        prompt.push_str(&web_search_block(now));
    }

    prompt
}

/// The web-search block, asserting real-time search capability with the
/// composition-time date.
fn web_search_block(now: DateTime<Utc>) -> String {
    let date = now.format("%A, %B %-d, %Y");
    format!(
        "\n\n🌐 WEB SEARCH MODE ACTIVE 🌐\n\
         You are now connected to the internet via Perplexity's real-time search engine. You CAN and SHOULD:\n\
         1. Search for the latest news, information, and real-time data\n\
         2. Provide current information with today's date context (Today is {date})\n\
         3. Cite sources and include relevant links when helpful\n\
         4. Acknowledge that you're using web search when asked about your capabilities\n\n\
         When the user asks if you can search or have internet access, CONFIRM that yes, Web Search mode is enabled and you have real-time internet access."
    )
}

/// Build the full ordered message list for a completion request.
///
/// History precedes the current turn in chronological order, with one
/// exclusion: prior `user` messages whose content equals the current turn's
/// text are dropped. This suppresses the duplicate echo that occurs when the
/// caller's history snapshot already contains the in-flight message.
pub fn build_turn_messages(
    system_prompt: String,
    history: &[ChatMessage],
    current_content: MessageContent,
    current_text: &str,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system_prompt));

    for msg in history {
        if msg.role == MessageRole::User && msg.content == current_text {
            continue;
        }
        messages.push(Message {
            role: msg.role,
            content: MessageContent::Text(msg.content.clone()),
        });
    }

    messages.push(Message {
        role: MessageRole::User,
        content: current_content,
    });

    messages
}
