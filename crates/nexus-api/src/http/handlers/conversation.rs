//! Conversation CRUD and title-generation HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/conversations                      - Create a conversation
//! - GET    /api/conversations                      - List the caller's conversations
//! - GET    /api/conversations/{id}                 - Conversation + ordered messages
//! - PATCH  /api/conversations/{id}                 - Update the title
//! - DELETE /api/conversations/{id}                 - Delete (cascades to messages)
//! - POST   /api/conversations/{id}/generate-title  - Smart title from the first message

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use nexus_core::turn::enrich;
use nexus_types::chat::{ChatMessage, Conversation};

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::state::AppState;

/// Request body for conversation creation.
#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub title: Option<String>,
}

/// Request body for title updates.
#[derive(Debug, Deserialize)]
pub struct UpdateTitleRequest {
    pub title: String,
}

/// Request body for smart title generation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTitleRequest {
    pub user_message: String,
}

/// Conversation plus its ordered messages, as returned by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<ChatMessage>,
}

/// POST /api/conversations - Create a conversation, owned by the caller when
/// authenticated, anonymous otherwise.
pub async fn create_conversation(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<Conversation>), AppError> {
    let conversation = state
        .chat_service
        .create_conversation(body.title.as_deref(), user.user_id())
        .await?;

    Ok((StatusCode::CREATED, Json(conversation)))
}

/// GET /api/conversations - The caller's conversations, newest first.
/// Anonymous callers get an empty list.
pub async fn list_conversations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Conversation>>, AppError> {
    let Some(user_id) = user.user_id() else {
        return Ok(Json(Vec::new()));
    };

    let conversations = state.chat_service.list_conversations(user_id).await?;
    Ok(Json(conversations))
}

/// GET /api/conversations/{id} - Conversation with its messages.
///
/// 404 when absent; 403 when the caller is authenticated but the
/// conversation belongs to someone else.
pub async fn get_conversation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ConversationDetail>, AppError> {
    let conversation = state
        .chat_service
        .get_conversation(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;

    if let (Some(caller), Some(owner)) = (user.user_id(), conversation.user_id.as_deref()) {
        if caller != owner {
            return Err(AppError::Forbidden("Unauthorized".to_string()));
        }
    }

    let messages = state.chat_service.get_messages(id).await?;

    Ok(Json(ConversationDetail {
        conversation,
        messages,
    }))
}

/// PATCH /api/conversations/{id} - Update the title.
pub async fn update_conversation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTitleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .chat_service
        .update_conversation_title(id, &body.title)
        .await
        .map_err(|e| match e {
            nexus_types::error::RepositoryError::NotFound => {
                AppError::NotFound("Conversation not found".to_string())
            }
            other => other.into(),
        })?;

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/conversations/{id} - Delete the conversation and its messages.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state
        .chat_service
        .delete_conversation(id)
        .await
        .map_err(|e| match e {
            nexus_types::error::RepositoryError::NotFound => {
                AppError::NotFound("Conversation not found".to_string())
            }
            other => other.into(),
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/conversations/{id}/generate-title - Generate and persist a smart
/// title from the given user message.
pub async fn generate_title(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<GenerateTitleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.user_message.is_empty() {
        return Err(AppError::Validation("userMessage is required".to_string()));
    }

    let Some(provider) = state.provider.as_ref() else {
        return Err(AppError::ServiceUnavailable(
            "AI Chat feature is not configured".to_string(),
        ));
    };

    let title = enrich::generate_title(provider, &state.settings.models, &body.user_message)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, conversation_id = id, "title generation failed");
            AppError::Internal("Failed to generate title".to_string())
        })?;

    state.chat_service.update_conversation_title(id, &title).await?;

    Ok(Json(json!({ "title": title })))
}
