use axum::extract::{Path, State};
use axum::Extension;
use chrono::Utc;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::store::likes::Like;
use crate::store::Id;

/// POST /api/likes/addRemove/:postId
///
/// Toggle over the (user, post) uniqueness invariant: a second invocation
/// with identical arguments undoes the first. The referenced post must exist
/// before either branch runs. Removal reports the removed-record count;
/// exactly one is expected.
pub async fn add_remove_like(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(post_id): Path<Id>,
) -> Result<ApiResponse, ApiError> {
    if state.store.post_by_id(&post_id).await?.is_none() {
        return Err(ApiError::not_found("Post not found. Cannot toggle like."));
    }

    if state.store.like_for(&caller.id, &post_id).await?.is_some() {
        let removed = state.store.delete_like(&caller.id, &post_id).await?;
        return Ok(ApiResponse::ok()
            .message("Like removed successfully.")
            .data(json!({ "removed": removed, "removedBy": caller })));
    }

    let like = Like {
        id: Id::new(),
        user_id: caller.id,
        post_id,
        first_name: caller.first_name,
        last_name: caller.last_name,
        created_at: Utc::now(),
    };
    state.store.insert_like(&like).await?;

    Ok(ApiResponse::ok()
        .message("Like added successfully.")
        .data(json!({ "like": like })))
}
