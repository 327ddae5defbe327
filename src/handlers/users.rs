use axum::extract::{Json, Path, State};
use axum::Extension;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::auth::hash_password;
use crate::auth::authorize_owner;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::store::users::Role;
use crate::store::Id;

/// GET /api/users
pub async fn get_all_users(State(state): State<AppState>) -> Result<ApiResponse, ApiError> {
    let users = state.store.all_users().await?;
    Ok(ApiResponse::ok()
        .message("All users retrieved successfully.")
        .data(json!({ "users": users })))
}

/// GET /api/users/:id
pub async fn get_single_user(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<ApiResponse, ApiError> {
    let user = state
        .store
        .user_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;
    Ok(ApiResponse::ok().data(json!({ "user": user })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub image: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub role: Option<Role>,
}

/// PUT /api/users/:id
///
/// Email, id and created_at are not updatable; only admins may change roles.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Id>,
    Json(input): Json<UpdateUserInput>,
) -> Result<ApiResponse, ApiError> {
    let mut user = state
        .store
        .user_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    authorize_owner(&caller, &user.id)?;

    if input.role.is_some() && caller.role != Role::Admin {
        return Err(ApiError::permission_denied(
            "Only administrators may change user roles.",
        ));
    }

    if let Some(first_name) = input.first_name {
        if first_name.trim().is_empty() {
            return Err(ApiError::invalid_data("First name must not be empty."));
        }
        user.first_name = first_name;
    }
    if let Some(last_name) = input.last_name {
        if last_name.trim().is_empty() {
            return Err(ApiError::invalid_data("Last name must not be empty."));
        }
        user.last_name = last_name;
    }
    if let Some(password) = input.password {
        if password.is_empty() {
            return Err(ApiError::invalid_data("Password must not be empty."));
        }
        user.password = hash_password(&state.hasher, &password, &user.id)?.to_vec();
    }
    if let Some(image) = input.image {
        user.image = Some(image);
    }
    if let Some(gender) = input.gender {
        user.gender = Some(gender);
    }
    if let Some(birth_date) = input.birth_date {
        user.birth_date = Some(birth_date);
    }
    if let Some(role) = input.role {
        user.role = role;
    }
    user.updated_at = Some(Utc::now());

    state.store.update_user(&user).await?;

    Ok(ApiResponse::ok()
        .message("User updated successfully.")
        .data(json!({ "user": user })))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Id>,
) -> Result<ApiResponse, ApiError> {
    let user = state
        .store
        .user_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    authorize_owner(&caller, &user.id)?;

    state.store.delete_user(&user.id).await?;

    Ok(ApiResponse::ok().message("User deleted successfully."))
}
