use argon2::Argon2;
use axum::extract::{Json, State};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::store::users::{Role, User};
use crate::store::Id;

pub const PASSWORD_HASH_LENGTH: usize = 32;

/// Hashes a password with Argon2, salted with the user's id. Registration
/// and login both route through here so the comparison stays symmetric.
pub(crate) fn hash_password(
    hasher: &Argon2,
    password: &str,
    id: &Id,
) -> Result<[u8; PASSWORD_HASH_LENGTH], ApiError> {
    let mut hash = [0; PASSWORD_HASH_LENGTH];
    hasher
        .hash_password_into(password.as_bytes(), id.as_str().as_bytes(), &mut hash)
        .map_err(|err| {
            tracing::error!("password hashing failed: {}", err);
            ApiError::service_error("Password processing failed.")
        })?;
    Ok(hash)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub image: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<ApiResponse, ApiError> {
    if input.first_name.trim().is_empty()
        || input.last_name.trim().is_empty()
        || input.email.trim().is_empty()
        || input.password.is_empty()
    {
        return Err(ApiError::invalid_data(
            "First name, last name, email and password are required.",
        ));
    }

    if state.store.user_by_email(&input.email).await?.is_some() {
        return Err(ApiError::already_exists(
            "A user with this email already exists. Please use a different email or try logging in.",
        ));
    }

    let id = Id::new();
    let password = hash_password(&state.hasher, &input.password, &id)?;

    let user = User {
        id,
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        password: password.to_vec(),
        image: input.image,
        role: Role::User,
        gender: input.gender,
        birth_date: input.birth_date,
        created_at: Utc::now(),
        updated_at: None,
    };
    state.store.insert_user(&user).await?;

    Ok(ApiResponse::ok()
        .message("User registration successful.")
        .data(json!({ "user": user })))
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login
///
/// Unknown email and wrong password keep their distinct statuses (404 and
/// 422); clients rely on the difference.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<ApiResponse, ApiError> {
    let user = state
        .store
        .user_by_email(&input.email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    let hashed = hash_password(&state.hasher, &input.password, &user.id)?;
    if user.password != hashed {
        return Err(ApiError::invalid_data("Password is not valid."));
    }

    let claims = Claims::new(&user, state.config.token_ttl_hours);
    let token = generate_jwt(&claims, &state.config.jwt_key)?;

    Ok(ApiResponse::ok()
        .message("Login successful.")
        .data(json!({ "user": user, "token": token })))
}
