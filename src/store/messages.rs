use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::{Id, Store, StoreError};

/// Directed (sender to receiver) or broadcast (`is_public`, receiver absent)
/// message. Immutable after creation except for the seen stamp, which no
/// handler currently writes.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Id,
    pub sender_id: Id,
    pub receiver_id: Option<Id>,
    pub message: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub seen_at: Option<DateTime<Utc>>,
}

impl Store {
    pub async fn insert_message(&self, message: &Message) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO messages (id, sender_id, receiver_id, message, is_public, created_at, seen_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.sender_id)
        .bind(&message.receiver_id)
        .bind(&message.message)
        .bind(message.is_public)
        .bind(message.created_at)
        .bind(message.seen_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All messages where the user is sender or receiver.
    pub async fn messages_for_user(&self, user_id: &Id) -> Result<Vec<Message>, StoreError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE sender_id = ? OR receiver_id = ?
             ORDER BY created_at",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    /// The private conversation between two users in both directions,
    /// oldest first.
    pub async fn private_messages_between(
        &self,
        user_a: &Id,
        user_b: &Id,
    ) -> Result<Vec<Message>, StoreError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages
             WHERE is_public = FALSE
               AND ((sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?))
             ORDER BY created_at",
        )
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }
}
