use axum::extract::{Json, Path, State};
use axum::Extension;
use serde::Deserialize;
use serde_json::json;

use crate::auth::authorize_owner;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::store::tags::Tag;
use crate::store::Id;

/// GET /api/tags
pub async fn get_all_tags(State(state): State<AppState>) -> Result<ApiResponse, ApiError> {
    let tags = state.store.all_tags().await?;
    Ok(ApiResponse::ok().data(json!({ "tags": tags })))
}

#[derive(Debug, Deserialize)]
pub struct TagInput {
    pub name: String,
}

/// POST /api/tags
///
/// Name uniqueness is case-insensitive: "Foo" then "foo" conflicts.
pub async fn add_tag(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(input): Json<TagInput>,
) -> Result<ApiResponse, ApiError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid_data("Tag name is required."));
    }

    if state.store.tag_by_name(name).await?.is_some() {
        return Err(ApiError::already_exists(
            "Tag with the same name already exists.",
        ));
    }

    let tag = Tag {
        id: Id::new(),
        name: name.to_string(),
        user_id: caller.id,
    };
    state.store.insert_tag(&tag).await?;

    Ok(ApiResponse::ok()
        .message("Tag added successfully.")
        .data(json!({ "tag": tag })))
}

/// PUT /api/tags/:id
pub async fn update_tag(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Id>,
    Json(input): Json<TagInput>,
) -> Result<ApiResponse, ApiError> {
    let tag = state
        .store
        .tag_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tag not found."))?;

    authorize_owner(&caller, &tag.user_id)?;

    let name = input.name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid_data("Tag name is required."));
    }

    // Renaming onto another tag's name conflicts; renaming onto a casing of
    // its own name does not.
    if let Some(existing) = state.store.tag_by_name(name).await? {
        if existing.id != tag.id {
            return Err(ApiError::already_exists(
                "Tag with the same name already exists.",
            ));
        }
    }

    state.store.rename_tag(&tag.id, name).await?;

    Ok(ApiResponse::ok()
        .message("Tag updated successfully.")
        .data(json!({ "tag": Tag { name: name.to_string(), ..tag } })))
}

/// DELETE /api/tags/:id
pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Id>,
) -> Result<ApiResponse, ApiError> {
    let tag = state
        .store
        .tag_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tag not found."))?;

    authorize_owner(&caller, &tag.user_id)?;

    state.store.delete_tag(&tag.id).await?;

    Ok(ApiResponse::ok().message("Tag deleted successfully."))
}
