use serde::Serialize;
use sqlx::FromRow;

use super::{Id, Store, StoreError};

/// Named label owned by its creator. Name uniqueness is case-insensitive
/// and enforced at the handler boundary.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Id,
    pub name: String,
    pub user_id: Id,
}

impl Store {
    pub async fn insert_tag(&self, tag: &Tag) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO tags (id, name, user_id) VALUES (?, ?, ?)")
            .bind(&tag.id)
            .bind(&tag.name)
            .bind(&tag.user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn tag_by_id(&self, id: &Id) -> Result<Option<Tag>, StoreError> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    /// Case-insensitive lookup by name, used for the uniqueness check.
    pub async fn tag_by_name(&self, name: &str) -> Result<Option<Tag>, StoreError> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE LOWER(name) = LOWER(?)")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    pub async fn all_tags(&self) -> Result<Vec<Tag>, StoreError> {
        let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    pub async fn rename_tag(&self, id: &Id, name: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE tags SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_tag(&self, id: &Id) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
