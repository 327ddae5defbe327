use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

use super::{placeholders, Id, Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    // Argon2 output; never leaves the server.
    #[serde(skip_serializing)]
    pub password: Vec<u8>,
    pub image: Option<String>,
    pub role: Role,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Name pair attached to enriched posts, likes and ads.
#[derive(Debug, Clone, Default, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, FromRow)]
struct AuthorRow {
    id: Id,
    first_name: String,
    last_name: String,
}

impl Store {
    pub async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users
                (id, first_name, last_name, email, password, image, role, gender, birth_date, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.image)
        .bind(user.role)
        .bind(&user.gender)
        .bind(user.birth_date)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn user_by_id(&self, id: &Id) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Persists every mutable column of `user`. Email, id and created_at are
    /// not updatable.
    pub async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE users
             SET first_name = ?, last_name = ?, password = ?, image = ?, role = ?,
                 gender = ?, birth_date = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password)
        .bind(&user.image)
        .bind(user.role)
        .bind(&user.gender)
        .bind(user.birth_date)
        .bind(user.updated_at)
        .bind(&user.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_user(&self, id: &Id) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Resolves a set of user ids to their name pairs, for view enrichment.
    pub(crate) async fn authors_for(&self, ids: &[&Id]) -> Result<HashMap<Id, Author>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT id, first_name, last_name FROM users WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query_as::<_, AuthorRow>(&sql);
        for id in ids {
            query = query.bind(*id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.id,
                    Author {
                        first_name: row.first_name,
                        last_name: row.last_name,
                    },
                )
            })
            .collect())
    }
}
