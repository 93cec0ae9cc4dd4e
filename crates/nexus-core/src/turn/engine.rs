//! The turn engine: relay state machine, failover, and enrichment.
//!
//! `TurnEngine::run` turns one prepared turn into the client event stream:
//! compose the prompt, resolve attachments, exhaust the ordered attempt
//! list against the provider, interleave search-status events, and finish
//! with enrichment (assistant-message persistence, suggestions, detached
//! title generation) before the terminal event.
//!
//! Failover is a whole-call substitution: tokens already relayed from a
//! failed attempt are never retracted, and the next attempt's tokens are
//! appended after them.

use std::sync::Arc;

use chrono::Utc;
use futures_util::{Stream, StreamExt};

use nexus_types::attachment::AttachmentRef;
use nexus_types::chat::{ChatMode, MessageRole};
use nexus_types::config::ModelRoster;
use nexus_types::event::TurnEvent;
use nexus_types::llm::{LlmError, StreamEvent};

use crate::attachment::resolve_user_content;
use crate::chat::repository::ChatRepository;
use crate::chat::service::{self, ChatService};
use crate::llm::box_provider::BoxLlmProvider;
use crate::prompt;
use crate::storage::ObjectStore;
use crate::turn::TurnPhase;
use crate::turn::{dispatch, enrich};

/// Maximum characters of the user message echoed in the search query status.
const SEARCH_QUERY_PREVIEW_CHARS: usize = 100;

/// One prepared chat turn, ready to dispatch.
///
/// `persist` is true only for an authenticated, conversation-owning caller;
/// `first_turn` is true when the conversation had no messages before this
/// turn (computed before the user message was saved).
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub conversation_id: i64,
    pub content: String,
    pub mode: Option<String>,
    pub attachments: Vec<AttachmentRef>,
    pub web_search_enabled: bool,
    pub persist: bool,
    pub first_turn: bool,
}

/// Orchestrates streaming chat turns against a completion provider.
pub struct TurnEngine<R: ChatRepository, S: ObjectStore> {
    chat: Arc<ChatService<R>>,
    objects: Arc<S>,
    provider: Arc<BoxLlmProvider>,
    models: ModelRoster,
}

impl<R, S> TurnEngine<R, S>
where
    R: ChatRepository + 'static,
    S: ObjectStore + 'static,
{
    pub fn new(
        chat: Arc<ChatService<R>>,
        objects: Arc<S>,
        provider: Arc<BoxLlmProvider>,
        models: ModelRoster,
    ) -> Self {
        Self {
            chat,
            objects,
            provider,
            models,
        }
    }

    /// Run one turn, producing the client event stream.
    ///
    /// The stream always ends with exactly one terminal event (`done` or
    /// `error`) and emits nothing afterwards.
    pub fn run(self: Arc<Self>, request: TurnRequest) -> impl Stream<Item = TurnEvent> + Send + 'static {
        let engine = self;

        async_stream::stream! {
            let mut phase = TurnPhase::Idle;
            phase.advance(TurnPhase::Dispatched);

            let has_media = !request.attachments.is_empty();
            let plan = dispatch::plan(&engine.models, has_media, request.web_search_enabled);

            // Training instructions are best-effort: a repository failure
            // degrades to an un-customized prompt, never a failed turn.
            let instructions = match engine.chat.list_training_instructions().await {
                Ok(list) => list,
                Err(err) => {
                    tracing::error!(error = %err, "failed to fetch training instructions");
                    Vec::new()
                }
            };

            let history = if request.persist {
                match engine.chat.get_messages(request.conversation_id).await {
                    Ok(messages) => messages,
                    Err(err) => {
                        tracing::error!(
                            error = %err,
                            conversation_id = request.conversation_id,
                            "failed to load history"
                        );
                        Vec::new()
                    }
                }
            } else {
                Vec::new()
            };

            let mode = ChatMode::resolve(request.mode.as_deref());
            let system_prompt =
                prompt::compose_system_prompt(mode, plan.web_search_active, Utc::now(), &instructions);
            let user_content =
                resolve_user_content(&request.content, &request.attachments, engine.objects.as_ref())
                    .await;
            let messages =
                prompt::build_turn_messages(system_prompt, &history, user_content, &request.content);
            let attempts =
                dispatch::build_attempts(&engine.models, &plan, messages, &request.attachments);

            if plan.web_search_active {
                let query: String = request
                    .content
                    .chars()
                    .take(SEARCH_QUERY_PREVIEW_CHARS)
                    .collect();
                yield TurnEvent::search_status(format!("🔍 Searching: {query}"));
            }

            let mut full_response = String::new();
            let mut fetching_announced = false;
            let mut results_announced = false;
            let mut failure: Option<LlmError> = None;

            let total_attempts = attempts.len();
            for (index, attempt) in attempts.into_iter().enumerate() {
                let dispatch::TurnAttempt { label, request: completion } = attempt;
                let mut llm_stream = std::pin::pin!(engine.provider.stream(completion));
                let mut attempt_error: Option<LlmError> = None;

                while let Some(event) = llm_stream.next().await {
                    match event {
                        Ok(StreamEvent::Connected) => {
                            if plan.web_search_active && !fetching_announced {
                                fetching_announced = true;
                                yield TurnEvent::search_status("📡 Fetching latest information...");
                            }
                        }
                        Ok(StreamEvent::TextDelta { text }) => {
                            if text.is_empty() {
                                continue;
                            }
                            if plan.web_search_active && !results_announced {
                                results_announced = true;
                                yield TurnEvent::search_status("✅ Found results!");
                            }
                            if phase == TurnPhase::Dispatched {
                                phase.advance(TurnPhase::Streaming);
                            }
                            full_response.push_str(&text);
                            yield TurnEvent::content(text);
                        }
                        Ok(StreamEvent::Done) => break,
                        Err(err) => {
                            attempt_error = Some(err);
                            break;
                        }
                    }
                }

                match attempt_error {
                    None => {
                        failure = None;
                        break;
                    }
                    Some(err) if index + 1 < total_attempts => {
                        tracing::warn!(
                            error = %err,
                            attempt = label,
                            "model attempt failed, reissuing against next"
                        );
                        failure = Some(err);
                    }
                    Some(err) => {
                        tracing::error!(error = %err, attempt = label, "final model attempt failed");
                        failure = Some(err);
                    }
                }
            }

            if let Some(err) = failure {
                phase.advance(TurnPhase::Failed);
                tracing::error!(
                    error = %err,
                    conversation_id = request.conversation_id,
                    "turn failed"
                );
                yield TurnEvent::error("Failed to send message");
                return;
            }

            phase.advance(TurnPhase::Enriching);

            if request.persist {
                if let Err(err) = engine
                    .chat
                    .create_message(request.conversation_id, MessageRole::Assistant, &full_response)
                    .await
                {
                    // Best-effort: the turn silently downgrades to unsaved.
                    tracing::error!(
                        error = %err,
                        conversation_id = request.conversation_id,
                        "failed to persist assistant message"
                    );
                }
            }

            let suggestions = enrich::generate_suggestions(
                engine.provider.as_ref(),
                &engine.models,
                &request.content,
                &full_response,
            )
            .await;

            if request.persist && request.first_turn {
                Arc::clone(&engine)
                    .spawn_title_generation(request.conversation_id, request.content.clone());
            }

            phase.advance(TurnPhase::Done);
            yield TurnEvent::done(suggestions);
        }
    }

    /// Detached smart-title generation for a conversation's first turn.
    ///
    /// Runs on its own task with its own error boundary; the turn's terminal
    /// event never waits on it. Failures degrade to the preview title.
    fn spawn_title_generation(self: Arc<Self>, conversation_id: i64, user_message: String) {
        tokio::spawn(async move {
            let title = match enrich::generate_title(
                self.provider.as_ref(),
                &self.models,
                &user_message,
            )
            .await
            {
                Ok(title) => title,
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        conversation_id,
                        "smart title generation failed, using preview"
                    );
                    service::fallback_title(&user_message)
                }
            };

            if let Err(err) = self
                .chat
                .update_conversation_title(conversation_id, &title)
                .await
            {
                tracing::error!(error = %err, conversation_id, "failed to update conversation title");
            }
        });
    }
}
