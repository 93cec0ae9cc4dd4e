//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `nexus-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, RFC 3339 datetime
//! round-tripping. Row ids come from SQLite's autoincrement rowids.

use chrono::{DateTime, Utc};
use sqlx::Row;

use nexus_core::chat::repository::ChatRepository;
use nexus_types::chat::{ChatMessage, Conversation, MessageRole, TrainingInstruction};
use nexus_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ConversationRow {
    id: i64,
    title: String,
    user_id: Option<String>,
    created_at: String,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            user_id: row.try_get("user_id")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        Ok(Conversation {
            id: self.id,
            title: self.title,
            user_id: self.user_id,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct MessageRow {
    id: i64,
    conversation_id: i64,
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ChatMessage {
            id: self.id,
            conversation_id: self.conversation_id,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct TrainingInstructionRow {
    id: i64,
    instruction: String,
    created_at: String,
}

impl TrainingInstructionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            instruction: row.try_get("instruction")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_instruction(self) -> Result<TrainingInstruction, RepositoryError> {
        Ok(TrainingInstruction {
            id: self.id,
            instruction: self.instruction,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_conversation(
        &self,
        title: &str,
        user_id: Option<&str>,
    ) -> Result<Conversation, RepositoryError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO conversations (title, user_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(title)
        .bind(user_id)
        .bind(format_datetime(&created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(Conversation {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            user_id: user_id.map(String::from),
            created_at,
        })
    }

    async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let conversation_row = ConversationRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(conversation_row.into_conversation()?))
            }
            None => Ok(None),
        }
    }

    async fn list_conversations(
        &self,
        user_id: &str,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM conversations WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in &rows {
            let conversation_row = ConversationRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            conversations.push(conversation_row.into_conversation()?);
        }

        Ok(conversations)
    }

    async fn update_conversation_title(
        &self,
        id: i64,
        title: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE conversations SET title = ? WHERE id = ?")
            .bind(title)
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_conversation(&self, id: i64) -> Result<(), RepositoryError> {
        // Messages cascade via the foreign key.
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn create_message(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
    ) -> Result<ChatMessage, RepositoryError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO messages (conversation_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(conversation_id)
        .bind(role.to_string())
        .bind(content)
        .bind(format_datetime(&created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(ChatMessage {
            id: result.last_insert_rowid(),
            conversation_id,
            role,
            content: content.to_string(),
            created_at,
        })
    }

    async fn get_messages(
        &self,
        conversation_id: i64,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let message_row =
                MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(message_row.into_message()?);
        }

        Ok(messages)
    }

    async fn count_messages(&self, conversation_id: i64) -> Result<u32, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM messages WHERE conversation_id = ?")
            .bind(conversation_id)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count as u32)
    }

    async fn list_training_instructions(
        &self,
    ) -> Result<Vec<TrainingInstruction>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM training_instructions ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut instructions = Vec::with_capacity(rows.len());
        for row in &rows {
            let instruction_row = TrainingInstructionRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            instructions.push(instruction_row.into_instruction()?);
        }

        Ok(instructions)
    }

    async fn create_training_instruction(
        &self,
        instruction: &str,
    ) -> Result<TrainingInstruction, RepositoryError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO training_instructions (instruction, created_at) VALUES (?, ?)",
        )
        .bind(instruction)
        .bind(format_datetime(&created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(TrainingInstruction {
            id: result.last_insert_rowid(),
            instruction: instruction.to_string(),
            created_at,
        })
    }

    async fn delete_training_instruction(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM training_instructions WHERE id = ?")
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
