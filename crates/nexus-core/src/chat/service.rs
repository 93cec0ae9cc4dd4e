//! Chat service orchestrating conversation lifecycle and message persistence.
//!
//! Thin coordination layer over the repository: conversation CRUD, message
//! append, training-instruction management, and the deterministic fallback
//! title used when smart title generation fails.

use nexus_types::chat::{ChatMessage, Conversation, MessageRole, TrainingInstruction};
use nexus_types::error::RepositoryError;
use tracing::info;

use crate::chat::repository::ChatRepository;

/// Default title for a freshly created conversation.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum characters of the user message kept in the fallback title.
const TITLE_PREVIEW_CHARS: usize = 40;

/// Coordinates conversation lifecycle and message persistence.
///
/// Generic over `ChatRepository` so core logic never depends on the
/// concrete storage backend.
pub struct ChatService<R: ChatRepository> {
    repo: R,
}

impl<R: ChatRepository> ChatService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Access the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Create a conversation, defaulting the title when none is given.
    pub async fn create_conversation(
        &self,
        title: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<Conversation, RepositoryError> {
        let title = match title {
            Some(t) if !t.trim().is_empty() => t,
            _ => DEFAULT_TITLE,
        };
        let conversation = self.repo.create_conversation(title, user_id).await?;
        info!(conversation_id = conversation.id, "conversation created");
        Ok(conversation)
    }

    pub async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>, RepositoryError> {
        self.repo.get_conversation(id).await
    }

    /// A user's conversations, newest first.
    pub async fn list_conversations(
        &self,
        user_id: &str,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        self.repo.list_conversations(user_id).await
    }

    pub async fn update_conversation_title(
        &self,
        id: i64,
        title: &str,
    ) -> Result<(), RepositoryError> {
        self.repo.update_conversation_title(id, title).await?;
        info!(conversation_id = id, "conversation title updated");
        Ok(())
    }

    pub async fn delete_conversation(&self, id: i64) -> Result<(), RepositoryError> {
        self.repo.delete_conversation(id).await?;
        info!(conversation_id = id, "conversation deleted");
        Ok(())
    }

    pub async fn create_message(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
    ) -> Result<ChatMessage, RepositoryError> {
        self.repo.create_message(conversation_id, role, content).await
    }

    pub async fn get_messages(
        &self,
        conversation_id: i64,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.repo.get_messages(conversation_id).await
    }

    pub async fn count_messages(&self, conversation_id: i64) -> Result<u32, RepositoryError> {
        self.repo.count_messages(conversation_id).await
    }

    /// All training instructions, newest first.
    pub async fn list_training_instructions(
        &self,
    ) -> Result<Vec<TrainingInstruction>, RepositoryError> {
        self.repo.list_training_instructions().await
    }

    pub async fn create_training_instruction(
        &self,
        instruction: &str,
    ) -> Result<TrainingInstruction, RepositoryError> {
        self.repo.create_training_instruction(instruction).await
    }

    pub async fn delete_training_instruction(&self, id: i64) -> Result<(), RepositoryError> {
        self.repo.delete_training_instruction(id).await
    }
}

/// Deterministic conversation title derived from the user's first message:
/// the first 40 characters, with an ellipsis marker when truncated.
pub fn fallback_title(user_message: &str) -> String {
    let preview: String = user_message.chars().take(TITLE_PREVIEW_CHARS).collect();
    if user_message.chars().count() > TITLE_PREVIEW_CHARS {
        format!("{preview}...")
    } else {
        preview
    }
}
