use axum::extract::{Json, Path, State};
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
use crate::store::comments::{Comment, CommentAuthor};
use crate::store::Id;

/// GET /api/comments/all/:postId
pub async fn get_all_comments_for_post(
    State(state): State<AppState>,
    Path(post_id): Path<Id>,
) -> Result<ApiResponse, ApiError> {
    let comments = state.store.comments_for_post(&post_id).await?;
    let count = comments.len();
    Ok(ApiResponse::ok().data(json!({ "comments": comments, "count": count })))
}

/// GET /api/comments/:id
pub async fn get_single_comment(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<ApiResponse, ApiError> {
    let comment = state
        .store
        .comment_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found."))?;
    Ok(ApiResponse::ok().data(json!({ "comment": comment })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentInput {
    pub post_id: Id,
    pub body: String,
}

/// POST /api/comments
///
/// The caller's identity snapshot is embedded in the comment; ownership
/// checks later compare that snapshot id.
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(input): Json<AddCommentInput>,
) -> Result<ApiResponse, ApiError> {
    if input.body.trim().is_empty() {
        return Err(ApiError::invalid_data("Comment body is required."));
    }

    if state.store.post_by_id(&input.post_id).await?.is_none() {
        return Err(ApiError::not_found("Post not found. Cannot add comment."));
    }

    let comment = Comment {
        id: Id::new(),
        post_id: input.post_id,
        body: input.body,
        user: SqlJson(CommentAuthor {
            id: caller.id,
            first_name: caller.first_name,
            last_name: caller.last_name,
        }),
        created_at: Utc::now(),
        updated_at: None,
    };
    state.store.insert_comment(&comment).await?;

    Ok(ApiResponse::ok()
        .message("Comment added successfully.")
        .data(json!({ "comment": comment })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentInput {
    pub body: String,
}

/// PUT /api/comments/:id
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Id>,
    Json(input): Json<UpdateCommentInput>,
) -> Result<ApiResponse, ApiError> {
    let mut comment = state
        .store
        .comment_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found."))?;

    authorize_owner(&caller, &comment.user.id)?;

    if input.body.trim().is_empty() {
        return Err(ApiError::invalid_data("Comment body is required."));
    }

    comment.body = input.body;
    comment.updated_at = Some(Utc::now());
    state.store.update_comment(&comment).await?;

    Ok(ApiResponse::ok()
        .message("Comment is successfully updated!")
        .data(json!({ "comment": comment })))
}

/// DELETE /api/comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Id>,
) -> Result<ApiResponse, ApiError> {
    let comment = state
        .store
        .comment_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found."))?;

    authorize_owner(&caller, &comment.user.id)?;

    state.store.delete_comment(&comment.id).await?;

    Ok(ApiResponse::ok().message("Comment deleted successfully."))
}
