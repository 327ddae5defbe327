use axum::extract::{Json, Path, Query, State};
use axum::Extension;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::types::Json as SqlJson;

use crate::auth::authorize_owner;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::store::posts::{PageWindow, Post, TagName};
use crate::store::Id;

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    /// 0/1 visibility filter; absent means no filter.
    pub public: Option<u8>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

/// GET /api/posts/all
///
/// `count` always reflects the filtered total before pagination, so clients
/// can compute a page count.
pub async fn get_all_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<ApiResponse, ApiError> {
    let is_public = query.public.map(|flag| flag != 0);
    let window = PageWindow::from_query(query.limit, query.page);

    let count = state.store.count_posts(is_public).await?;
    let posts = state.store.list_posts(is_public, window).await?;
    let posts = state.store.enrich_posts(posts).await?;

    Ok(ApiResponse::ok().data(json!({ "posts": posts, "count": count })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPostsQuery {
    pub search_query: Option<String>,
}

/// GET /api/posts/search
///
/// A missing or empty term is a client error, never an empty result set.
pub async fn search_posts(
    State(state): State<AppState>,
    Query(query): Query<SearchPostsQuery>,
) -> Result<ApiResponse, ApiError> {
    let term = query
        .search_query
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .ok_or_else(|| ApiError::invalid_data("Search term is missing or empty"))?;

    let posts = state.store.search_posts(term).await?;
    let count = posts.len();
    let posts = state.store.enrich_posts(posts).await?;

    Ok(ApiResponse::ok()
        .message("Posts retrieved successfully")
        .data(json!({ "posts": posts, "count": count })))
}

#[derive(Debug, Deserialize)]
pub struct FilterPostsQuery {
    /// One tag name or a comma-separated list.
    pub tags: Option<String>,
}

/// GET /api/posts/filter
///
/// Multi-tag combination (ANY or ALL) is a configuration choice,
/// `TAG_FILTER_MODE`.
pub async fn filter_posts(
    State(state): State<AppState>,
    Query(query): Query<FilterPostsQuery>,
) -> Result<ApiResponse, ApiError> {
    let names: Vec<String> = query
        .tags
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        return Err(ApiError::invalid_data("No tags provided."));
    }

    let posts = state
        .store
        .filter_posts(&names, state.config.tag_filter_mode)
        .await?;
    let count = posts.len();
    let posts = state.store.enrich_posts(posts).await?;

    Ok(ApiResponse::ok()
        .message("Posts filtered successfully.")
        .data(json!({ "posts": posts, "count": count })))
}

/// GET /api/posts/user/:userId
pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<Id>,
) -> Result<ApiResponse, ApiError> {
    let posts = state.store.posts_by_user(&user_id).await?;
    let count = posts.len();
    let posts = state.store.enrich_posts(posts).await?;

    Ok(ApiResponse::ok().data(json!({ "posts": posts, "count": count })))
}

/// GET /api/posts/:id
pub async fn get_single_post(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<ApiResponse, ApiError> {
    let post = state
        .store
        .post_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found."))?;

    let post = state.store.enrich_post_with_comments(post).await?;

    Ok(ApiResponse::ok().data(json!({ "post": post })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPostInput {
    pub title: String,
    pub body: String,
    pub image: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    pub tags: Vec<TagName>,
}

fn validate_tags(tags: &[TagName]) -> Result<(), ApiError> {
    if tags.is_empty() || tags.iter().any(|tag| tag.name.trim().is_empty()) {
        return Err(ApiError::invalid_data("Posts must carry at least one tag."));
    }
    Ok(())
}

/// POST /api/posts/add
pub async fn add_post(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(input): Json<AddPostInput>,
) -> Result<ApiResponse, ApiError> {
    if input.title.trim().is_empty() || input.body.trim().is_empty() {
        return Err(ApiError::invalid_data("Title and body are required."));
    }
    validate_tags(&input.tags)?;

    let post = Post {
        id: Id::new(),
        user_id: caller.id,
        title: input.title,
        body: input.body,
        image: input.image,
        is_public: input.is_public,
        tags: SqlJson(input.tags),
        created_at: Utc::now(),
        updated_at: None,
    };
    state.store.insert_post(&post).await?;

    Ok(ApiResponse::ok()
        .message("Post added successfully.")
        .data(json!({ "post": post })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
    pub is_public: Option<bool>,
    pub tags: Option<Vec<TagName>>,
}

/// PUT /api/posts/:id
pub async fn update_post(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Id>,
    Json(input): Json<UpdatePostInput>,
) -> Result<ApiResponse, ApiError> {
    let mut post = state
        .store
        .post_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found."))?;

    authorize_owner(&caller, &post.user_id)?;

    if let Some(title) = input.title {
        if title.trim().is_empty() {
            return Err(ApiError::invalid_data("Title must not be empty."));
        }
        post.title = title;
    }
    if let Some(body) = input.body {
        if body.trim().is_empty() {
            return Err(ApiError::invalid_data("Body must not be empty."));
        }
        post.body = body;
    }
    if let Some(image) = input.image {
        post.image = Some(image);
    }
    if let Some(is_public) = input.is_public {
        post.is_public = is_public;
    }
    if let Some(tags) = input.tags {
        validate_tags(&tags)?;
        post.tags = SqlJson(tags);
    }
    post.updated_at = Some(Utc::now());

    state.store.update_post(&post).await?;

    Ok(ApiResponse::ok()
        .message("Post updated successfully.")
        .data(json!({ "post": post })))
}

/// DELETE /api/posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Id>,
) -> Result<ApiResponse, ApiError> {
    let post = state
        .store
        .post_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found."))?;

    authorize_owner(&caller, &post.user_id)?;

    state.store.delete_post(&post.id).await?;

    Ok(ApiResponse::ok().message("Post deleted successfully."))
}
