use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::{Id, Store, StoreError};

/// Denormalized author snapshot embedded in each comment. Ownership checks
/// compare the snapshot id, not the users collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    pub post_id: Id,
    pub body: String,
    pub user: Json<CommentAuthor>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Store {
    pub async fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO comments (id, post_id, body, user, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&comment.id)
        .bind(&comment.post_id)
        .bind(&comment.body)
        .bind(&comment.user)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn comment_by_id(&self, id: &Id) -> Result<Option<Comment>, StoreError> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    pub async fn comments_for_post(&self, post_id: &Id) -> Result<Vec<Comment>, StoreError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE post_id = ? ORDER BY created_at DESC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    pub async fn update_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        sqlx::query("UPDATE comments SET body = ?, updated_at = ? WHERE id = ?")
            .bind(&comment.body)
            .bind(comment.updated_at)
            .bind(&comment.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_comment(&self, id: &Id) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
