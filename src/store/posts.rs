use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::HashMap;

use super::comments::Comment;
use super::users::Author;
use super::{Id, Store, StoreError};
use crate::config::TagFilterMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagName {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub body: String,
    pub image: Option<String>,
    pub is_public: bool,
    // Non-empty set, validated at the handler boundary.
    pub tags: Json<Vec<TagName>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Aggregated liker info attached to an enriched post: ids plus name
/// snapshots, newest like first. Absent entirely when the post has no likes.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeInfo {
    pub users_id: Vec<Id>,
    pub users: Vec<Author>,
}

/// A post enriched with its author's name pair, liker info and (for the
/// single-post view) its comments.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub user: Author,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_info: Option<LikeInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

/// A skip/limit window. Active only when the client supplies both `limit`
/// and `page`.
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

impl PageWindow {
    /// Couples `limit` and `page` into a window. Either one alone leaves
    /// pagination inactive rather than erroring.
    pub fn from_query(limit: Option<i64>, page: Option<i64>) -> Option<Self> {
        match (limit, page) {
            (Some(limit), Some(page)) if limit > 0 => Some(Self {
                offset: (page - 1).max(0) * limit,
                limit,
            }),
            _ => None,
        }
    }
}

impl Store {
    pub async fn insert_post(&self, post: &Post) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO posts (id, user_id, title, body, image, is_public, tags, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&post.id)
        .bind(&post.user_id)
        .bind(&post.title)
        .bind(&post.body)
        .bind(&post.image)
        .bind(post.is_public)
        .bind(&post.tags)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn post_by_id(&self, id: &Id) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    pub async fn update_post(&self, post: &Post) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE posts SET title = ?, body = ?, image = ?, is_public = ?, tags = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&post.title)
        .bind(&post.body)
        .bind(&post.image)
        .bind(post.is_public)
        .bind(&post.tags)
        .bind(post.updated_at)
        .bind(&post.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_post(&self, id: &Id) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Total number of posts matching the visibility filter, before any
    /// pagination window is applied.
    pub async fn count_posts(&self, is_public: Option<bool>) -> Result<i64, StoreError> {
        let count = match is_public {
            Some(flag) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE is_public = ?")
                    .bind(flag)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }

    /// Posts newest first, optionally filtered by visibility and windowed.
    pub async fn list_posts(
        &self,
        is_public: Option<bool>,
        window: Option<PageWindow>,
    ) -> Result<Vec<Post>, StoreError> {
        let mut sql = String::from("SELECT * FROM posts");
        if is_public.is_some() {
            sql.push_str(" WHERE is_public = ?");
        }
        sql.push_str(" ORDER BY created_at DESC");
        if window.is_some() {
            sql.push_str(" LIMIT ? OFFSET ?");
        }

        let mut query = sqlx::query_as::<_, Post>(&sql);
        if let Some(flag) = is_public {
            query = query.bind(flag);
        }
        if let Some(window) = window {
            query = query.bind(window.limit).bind(window.offset);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    pub async fn posts_by_user(&self, user_id: &Id) -> Result<Vec<Post>, StoreError> {
        let posts =
            sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE user_id = ? ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(posts)
    }

    /// Case-insensitive substring match against title or body.
    pub async fn search_posts(&self, term: &str) -> Result<Vec<Post>, StoreError> {
        let pattern = format!("%{}%", term.to_lowercase());
        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts
             WHERE LOWER(title) LIKE ? OR LOWER(body) LIKE ?
             ORDER BY created_at DESC",
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    /// Posts whose tag set contains the given names, combined per
    /// `TagFilterMode::Any` (at least one name) or `TagFilterMode::All`
    /// (every name).
    pub async fn filter_posts(
        &self,
        names: &[String],
        mode: TagFilterMode,
    ) -> Result<Vec<Post>, StoreError> {
        if names.is_empty() {
            return Ok(vec![]);
        }

        let clause =
            "EXISTS (SELECT 1 FROM json_each(posts.tags) WHERE json_extract(value, '$.name') = ?)";
        let joiner = match mode {
            TagFilterMode::Any => " OR ",
            TagFilterMode::All => " AND ",
        };
        let sql = format!(
            "SELECT * FROM posts WHERE {} ORDER BY created_at DESC",
            vec![clause; names.len()].join(joiner)
        );

        let mut query = sqlx::query_as::<_, Post>(&sql);
        for name in names {
            query = query.bind(name);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Attaches author names and liker info to a page of posts.
    pub async fn enrich_posts(&self, posts: Vec<Post>) -> Result<Vec<PostView>, StoreError> {
        if posts.is_empty() {
            return Ok(vec![]);
        }

        let post_ids: Vec<&Id> = posts.iter().map(|post| &post.id).collect();
        let mut like_info = self.like_info_for(&post_ids).await?;

        let mut author_ids: Vec<&Id> = posts.iter().map(|post| &post.user_id).collect();
        author_ids.sort_by_key(|id| id.as_str().to_string());
        author_ids.dedup();
        let authors = self.authors_for(&author_ids).await?;

        Ok(posts
            .into_iter()
            .map(|post| {
                let user = authors.get(&post.user_id).cloned().unwrap_or_default();
                let like_info = like_info.remove(&post.id);
                PostView {
                    post,
                    user,
                    like_info,
                    comments: None,
                }
            })
            .collect())
    }

    /// Single-post enrichment: author, liker info and comments newest first.
    pub async fn enrich_post_with_comments(&self, post: Post) -> Result<PostView, StoreError> {
        let comments = self.comments_for_post(&post.id).await?;
        let mut views = self.enrich_posts(vec![post]).await?;
        // enrich_posts returns exactly one view for one post
        let mut view = views.pop().ok_or(sqlx::Error::RowNotFound)?;
        view.comments = Some(comments);
        Ok(view)
    }

    async fn like_info_for(
        &self,
        post_ids: &[&Id],
    ) -> Result<HashMap<Id, LikeInfo>, StoreError> {
        let likes = self.likes_for_posts(post_ids).await?;
        let mut grouped: HashMap<Id, LikeInfo> = HashMap::new();
        for like in likes {
            let info = grouped.entry(like.post_id).or_default();
            info.users_id.push(like.user_id);
            info.users.push(Author {
                first_name: like.first_name,
                last_name: like.last_name,
            });
        }
        Ok(grouped)
    }
}
