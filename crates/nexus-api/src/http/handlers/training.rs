//! Password-gated training instruction management.
//!
//! Endpoints (password travels in the body; the whole surface answers 503
//! when no training password is configured):
//! - POST   /api/training/verify-password
//! - POST   /api/training/instructions/list
//! - POST   /api/training/instructions
//! - DELETE /api/training/instructions/{id}

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::json;

use nexus_types::chat::TrainingInstruction;

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateInstructionRequest {
    pub instruction: String,
    pub password: String,
}

/// Check the configured password, mapping absence to 503 and mismatch to 401.
fn require_password(state: &AppState, provided: &str) -> Result<(), AppError> {
    let Some(expected) = state.settings.training_password.as_deref() else {
        return Err(AppError::ServiceUnavailable(
            "Training feature is not configured".to_string(),
        ));
    };
    if provided != expected {
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }
    Ok(())
}

/// POST /api/training/verify-password
pub async fn verify_password(
    State(state): State<AppState>,
    Json(body): Json<PasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_password(&state, &body.password)?;
    Ok(Json(json!({ "success": true })))
}

/// POST /api/training/instructions/list - All instructions, newest first.
pub async fn list_instructions(
    State(state): State<AppState>,
    Json(body): Json<PasswordRequest>,
) -> Result<Json<Vec<TrainingInstruction>>, AppError> {
    require_password(&state, &body.password)?;

    let instructions = state.chat_service.list_training_instructions().await?;
    Ok(Json(instructions))
}

/// POST /api/training/instructions - Add an instruction.
pub async fn create_instruction(
    State(state): State<AppState>,
    Json(body): Json<CreateInstructionRequest>,
) -> Result<(StatusCode, Json<TrainingInstruction>), AppError> {
    require_password(&state, &body.password)?;

    if body.instruction.trim().is_empty() {
        return Err(AppError::Validation("instruction is required".to_string()));
    }

    let instruction = state
        .chat_service
        .create_training_instruction(&body.instruction)
        .await?;
    Ok((StatusCode::CREATED, Json(instruction)))
}

/// DELETE /api/training/instructions/{id}
pub async fn delete_instruction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PasswordRequest>,
) -> Result<StatusCode, AppError> {
    require_password(&state, &body.password)?;

    state
        .chat_service
        .delete_training_instruction(id)
        .await
        .map_err(|e| match e {
            nexus_types::error::RepositoryError::NotFound => {
                AppError::NotFound("Training instruction not found".to_string())
            }
            other => other.into(),
        })?;

    Ok(StatusCode::NO_CONTENT)
}
