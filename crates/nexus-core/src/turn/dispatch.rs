//! Model selection and the ordered attempt list.
//!
//! A turn resolves to a dispatch plan (which model, whether web search is
//! actually active) and then to an ordered list of completion attempts. The
//! engine exhausts the list in order: each attempt is a whole-call
//! substitution, and the last attempt's failure is terminal for the turn.

use nexus_types::attachment::AttachmentRef;
use nexus_types::config::ModelRoster;
use nexus_types::llm::{CompletionRequest, Message};

/// Token cap for the streamed assistant response.
pub const MAX_RESPONSE_TOKENS: u32 = 2048;

/// Resolved model choice for a turn.
///
/// Media takes precedence over web search: when media is present the
/// multimodal model is used and search is forced off regardless of the
/// requested flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPlan {
    pub model: String,
    pub web_search_active: bool,
}

/// Select the model configuration for a turn.
pub fn plan(models: &ModelRoster, has_media: bool, web_search_enabled: bool) -> DispatchPlan {
    if has_media {
        DispatchPlan {
            model: models.multimodal_model.clone(),
            web_search_active: false,
        }
    } else if web_search_enabled {
        DispatchPlan {
            model: models.search_model.clone(),
            web_search_active: true,
        }
    } else {
        DispatchPlan {
            model: models.default_model.clone(),
            web_search_active: false,
        }
    }
}

/// One entry in the ordered attempt list.
#[derive(Debug, Clone)]
pub struct TurnAttempt {
    /// Short label for logs ("primary", "fallback").
    pub label: &'static str,
    pub request: CompletionRequest,
}

/// Build the ordered attempt list for a turn: the planned primary request,
/// then the fixed fallback.
///
/// The fallback reissues the full message list against the fallback model.
/// When media was present it appends a user note naming each attachment and
/// explaining that the multimodal path could not be used, since the fallback
/// may not see the inlined media.
pub fn build_attempts(
    models: &ModelRoster,
    plan: &DispatchPlan,
    messages: Vec<Message>,
    attachments: &[AttachmentRef],
) -> Vec<TurnAttempt> {
    let has_media = !attachments.is_empty();

    let mut fallback_messages = messages.clone();
    if has_media {
        let listing = attachments
            .iter()
            .map(|a| format!("[User attached: {} ({})]", a.name, a.mime_type))
            .collect::<Vec<_>>()
            .join("\n");
        fallback_messages.push(Message::user(format!(
            "{listing}\n\nNote: Multimodal requires credits. Using text-based fallback."
        )));
    }

    vec![
        TurnAttempt {
            label: "primary",
            request: CompletionRequest {
                model: plan.model.clone(),
                messages,
                max_tokens: MAX_RESPONSE_TOKENS,
                temperature: None,
                stream: true,
                json_object: false,
            },
        },
        TurnAttempt {
            label: "fallback",
            request: CompletionRequest {
                model: models.fallback_model.clone(),
                messages: fallback_messages,
                max_tokens: MAX_RESPONSE_TOKENS,
                temperature: None,
                stream: true,
                json_object: false,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_types::llm::MessageRole;

    fn roster() -> ModelRoster {
        ModelRoster::default()
    }

    fn attachment(name: &str, mime: &str) -> AttachmentRef {
        AttachmentRef {
            name: name.to_string(),
            mime_type: mime.to_string(),
            url: format!("uploads/{name}"),
        }
    }

    #[test]
    fn test_plain_turn_uses_default_model() {
        let plan = plan(&roster(), false, false);
        assert_eq!(plan.model, "gpt-4o-mini");
        assert!(!plan.web_search_active);
    }

    #[test]
    fn test_media_selects_multimodal_and_forces_search_off() {
        let plan = plan(&roster(), true, true);
        assert_eq!(plan.model, "gpt-4o");
        assert!(!plan.web_search_active);
    }

    #[test]
    fn test_media_override_is_idempotent() {
        // Setting the search flag has no observable effect when media is present.
        let with_flag = plan(&roster(), true, true);
        let without_flag = plan(&roster(), true, false);
        assert_eq!(with_flag, without_flag);
    }

    #[test]
    fn test_search_without_media_selects_search_model() {
        let plan = plan(&roster(), false, true);
        assert_eq!(plan.model, "gpt-4o");
        assert!(plan.web_search_active);
    }

    #[test]
    fn test_attempt_list_is_primary_then_fallback() {
        let plan = plan(&roster(), false, false);
        let messages = vec![Message::system("sys"), Message::user("hi")];
        let attempts = build_attempts(&roster(), &plan, messages, &[]);

        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].label, "primary");
        assert_eq!(attempts[0].request.model, "gpt-4o-mini");
        assert!(attempts[0].request.stream);
        assert_eq!(attempts[1].label, "fallback");
        assert_eq!(attempts[1].request.model, "gpt-4o-mini");
        // Without media the fallback reissues the identical message list.
        assert_eq!(attempts[1].request.messages, attempts[0].request.messages);
    }

    #[test]
    fn test_fallback_appends_media_note() {
        let atts = vec![
            attachment("cat.png", "image/png"),
            attachment("clip.mp4", "video/mp4"),
        ];
        let plan = plan(&roster(), true, false);
        let messages = vec![Message::system("sys"), Message::user("hi")];
        let attempts = build_attempts(&roster(), &plan, messages, &atts);

        let fallback = &attempts[1].request;
        assert_eq!(fallback.messages.len(), 3);
        let note = fallback.messages.last().unwrap();
        assert_eq!(note.role, MessageRole::User);
        let text = note.content.as_text();
        assert!(text.contains("[User attached: cat.png (image/png)]"));
        assert!(text.contains("[User attached: clip.mp4 (video/mp4)]"));
        assert!(text.contains("text-based fallback"));

        // The primary is untouched.
        assert_eq!(attempts[0].request.messages.len(), 2);
    }
}
