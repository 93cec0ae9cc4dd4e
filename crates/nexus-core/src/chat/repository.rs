//! ChatRepository trait definition.
//!
//! CRUD operations for conversations, messages, and training instructions.
//! Uses native async fn in traits (RPITIT); implementations live in
//! nexus-infra (e.g., `SqliteChatRepository`).

use nexus_types::chat::{ChatMessage, Conversation, MessageRole, TrainingInstruction};
use nexus_types::error::RepositoryError;

/// Repository trait for conversation and message persistence.
pub trait ChatRepository: Send + Sync {
    /// Create a new conversation, optionally owned by `user_id`.
    fn create_conversation(
        &self,
        title: &str,
        user_id: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Get a conversation by id.
    fn get_conversation(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// List a user's conversations, newest first.
    fn list_conversations(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;

    /// Update a conversation's title.
    fn update_conversation_title(
        &self,
        id: i64,
        title: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a conversation and its messages.
    fn delete_conversation(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append a message to a conversation.
    fn create_message(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
    ) -> impl std::future::Future<Output = Result<ChatMessage, RepositoryError>> + Send;

    /// Get a conversation's messages, oldest first.
    fn get_messages(
        &self,
        conversation_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Count a conversation's messages.
    fn count_messages(
        &self,
        conversation_id: i64,
    ) -> impl std::future::Future<Output = Result<u32, RepositoryError>> + Send;

    /// List all training instructions, newest first.
    fn list_training_instructions(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<TrainingInstruction>, RepositoryError>> + Send;

    /// Add a training instruction.
    fn create_training_instruction(
        &self,
        instruction: &str,
    ) -> impl std::future::Future<Output = Result<TrainingInstruction, RepositoryError>> + Send;

    /// Delete a training instruction.
    fn delete_training_instruction(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
