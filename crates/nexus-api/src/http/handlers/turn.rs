//! The streaming turn endpoint.
//!
//! POST /api/conversations/{id}/messages
//!
//! Resolves ownership, persists the user message when the turn is saved,
//! then relays the turn engine's event stream to the client as data-only
//! SSE events (`data: {json}\n\n` per event):
//! - `{"searchStatus": "..."}` -- web-search progress, before content
//! - `{"content": "..."}`      -- one incremental chunk, in emission order
//! - `{"done": true, "suggestions": [...]}` -- terminal success
//! - `{"error": "..."}`        -- terminal failure; nothing follows

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::Stream;

use nexus_core::turn::engine::TurnRequest;
use nexus_types::attachment::AttachmentRef;
use nexus_types::chat::MessageRole;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::state::AppState;

/// Request body for the turn endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// The user's message text.
    pub content: String,
    /// Reasoning mode wire name; unknown or absent falls back to DEFAULT.
    pub mode: Option<String>,
    /// Attachment references to resolve and inline.
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    /// Whether the caller asked for web search (forced off when media is present).
    #[serde(default)]
    pub web_search_enabled: bool,
}

/// POST /api/conversations/{id}/messages - Run one chat turn, streaming the
/// response as SSE.
///
/// The turn is persisted only when the caller is authenticated and owns the
/// conversation; anonymous turns are answered but leave no rows behind.
/// Failures before the stream starts surface as conventional error
/// responses; afterwards, as a terminal `{"error": ...}` event.
pub async fn send_message(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(conversation_id): Path<i64>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let Some(engine) = state.engine.clone() else {
        return Err(AppError::ServiceUnavailable(
            "AI Chat feature is not configured".to_string(),
        ));
    };

    // Persist only for an authenticated caller that owns the conversation.
    let conversation = state.chat_service.get_conversation(conversation_id).await?;
    let persist = match (user.user_id(), &conversation) {
        (Some(caller), Some(conversation)) => conversation.user_id.as_deref() == Some(caller),
        _ => false,
    };

    // First-turn detection must precede the user-message insert.
    let mut first_turn = false;
    if persist {
        first_turn = state.chat_service.count_messages(conversation_id).await? == 0;
        state
            .chat_service
            .create_message(conversation_id, MessageRole::User, &body.content)
            .await?;
    }

    let request = TurnRequest {
        conversation_id,
        content: body.content,
        mode: body.mode,
        attachments: body.attachments,
        web_search_enabled: body.web_search_enabled,
        persist,
        first_turn,
    };

    let sse_stream = engine.run(request).map(|event| {
        Ok::<_, Infallible>(
            Event::default().data(serde_json::to_string(&event).unwrap_or_default()),
        )
    });

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
