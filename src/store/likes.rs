use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::{placeholders, Id, Store, StoreError};

/// Join entity between a user and a post. At most one per (user_id, post_id)
/// pair; the toggle handler enforces the invariant.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: Id,
    pub user_id: Id,
    pub post_id: Id,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub async fn insert_like(&self, like: &Like) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO likes (id, user_id, post_id, first_name, last_name, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&like.id)
        .bind(&like.user_id)
        .bind(&like.post_id)
        .bind(&like.first_name)
        .bind(&like.last_name)
        .bind(like.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn like_for(&self, user_id: &Id, post_id: &Id) -> Result<Option<Like>, StoreError> {
        let like =
            sqlx::query_as::<_, Like>("SELECT * FROM likes WHERE user_id = ? AND post_id = ?")
                .bind(user_id)
                .bind(post_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(like)
    }

    /// Removes the like for a (user, post) pair, reporting how many records
    /// went away. Exactly one is expected when the pair exists.
    pub async fn delete_like(&self, user_id: &Id, post_id: &Id) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = ? AND post_id = ?")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// All likes across the given posts, newest first, for view enrichment.
    pub(crate) async fn likes_for_posts(&self, post_ids: &[&Id]) -> Result<Vec<Like>, StoreError> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        let sql = format!(
            "SELECT * FROM likes WHERE post_id IN ({}) ORDER BY created_at DESC",
            placeholders(post_ids.len())
        );
        let mut query = sqlx::query_as::<_, Like>(&sql);
        for id in post_ids {
            query = query.bind(*id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }
}
