//! Post-turn auxiliary model calls: follow-up suggestions and smart titles.
//!
//! Both are best-effort. Suggestion failures degrade to an empty list and
//! title failures degrade to the deterministic preview title; neither ever
//! fails the turn.

use serde::Deserialize;

use nexus_types::config::ModelRoster;
use nexus_types::llm::{CompletionRequest, LlmError, Message};

use crate::llm::box_provider::BoxLlmProvider;

/// Upper bound on follow-up suggestions returned to the client.
pub const MAX_SUGGESTIONS: usize = 5;

const SUGGESTION_PROMPT: &str = "Generate 5 short follow-up suggestions (max 8 words each) as a JSON object: {\"suggestions\": []}";

const TITLE_PROMPT: &str = "Generate a creative and smart title (max 3 words) for a conversation. Make it interesting and memorable without being too funny. Keep it balanced and professional. Return only the title, nothing else.";

const SUGGESTION_MAX_TOKENS: u32 = 256;
const TITLE_MAX_TOKENS: u32 = 15;

/// Generate follow-up suggestions from the completed exchange.
///
/// Any failure (provider, parse) yields an empty list.
pub async fn generate_suggestions(
    provider: &BoxLlmProvider,
    models: &ModelRoster,
    user_content: &str,
    assistant_response: &str,
) -> Vec<String> {
    let request = CompletionRequest {
        model: models.auxiliary_model.clone(),
        messages: vec![
            Message::system(SUGGESTION_PROMPT),
            Message::user(format!("User: {user_content}\nAI: {assistant_response}")),
        ],
        max_tokens: SUGGESTION_MAX_TOKENS,
        temperature: None,
        stream: false,
        json_object: true,
    };

    match provider.complete(&request).await {
        Ok(response) => parse_suggestions(&response.content),
        Err(err) => {
            tracing::warn!(error = %err, "suggestion generation failed");
            Vec::new()
        }
    }
}

/// Parse the suggestion payload, tolerating malformed JSON and over-long lists.
pub fn parse_suggestions(raw: &str) -> Vec<String> {
    #[derive(Deserialize)]
    struct SuggestionPayload {
        #[serde(default)]
        suggestions: Vec<String>,
    }

    match serde_json::from_str::<SuggestionPayload>(raw) {
        Ok(mut payload) => {
            payload.suggestions.truncate(MAX_SUGGESTIONS);
            payload.suggestions
        }
        Err(err) => {
            tracing::warn!(error = %err, "suggestion payload did not parse");
            Vec::new()
        }
    }
}

/// Generate a short smart title for a conversation from its first user message.
///
/// Provider failures propagate so the caller can apply the deterministic
/// fallback; a blank completion resolves to "New Chat".
pub async fn generate_title(
    provider: &BoxLlmProvider,
    models: &ModelRoster,
    user_message: &str,
) -> Result<String, LlmError> {
    let request = CompletionRequest {
        model: models.auxiliary_model.clone(),
        messages: vec![Message::system(TITLE_PROMPT), Message::user(user_message)],
        max_tokens: TITLE_MAX_TOKENS,
        temperature: None,
        stream: false,
        json_object: false,
    };

    let response = provider.complete(&request).await?;
    let title = response.content.trim();
    if title.is_empty() {
        Ok("New Chat".to_string())
    } else {
        Ok(title.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suggestions_happy_path() {
        let raw = r#"{"suggestions":["Tell me more","What about Mars?"]}"#;
        assert_eq!(
            parse_suggestions(raw),
            vec!["Tell me more".to_string(), "What about Mars?".to_string()]
        );
    }

    #[test]
    fn test_parse_suggestions_truncates_to_five() {
        let raw = r#"{"suggestions":["1","2","3","4","5","6","7"]}"#;
        assert_eq!(parse_suggestions(raw).len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_parse_suggestions_missing_field_is_empty() {
        assert!(parse_suggestions("{}").is_empty());
    }

    #[test]
    fn test_parse_suggestions_malformed_json_is_empty() {
        assert!(parse_suggestions("Sure! Here are some suggestions:").is_empty());
        assert!(parse_suggestions("").is_empty());
        assert!(parse_suggestions(r#"{"suggestions": "not a list"}"#).is_empty());
    }
}
