use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::auth::validate_jwt;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::users::Role;
use crate::store::Id;

/// Caller identity resolved from a verified token, attached to the request
/// as an extension for the guarded handlers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Verifies the `authorization` header and re-fetches the user behind the
/// token, so stale tokens for deleted accounts are rejected. The header
/// carries the raw token; a `Bearer ` prefix is tolerated and stripped.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers()).ok_or_else(|| {
        ApiError::token_expired("You are not logged in, authentication required.")
    })?;

    let claims = validate_jwt(&token, &state.config.jwt_key)
        .map_err(|_| ApiError::token_expired("Token has expired. Please log in again."))?;

    let user = state
        .store
        .user_by_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::token_expired("Token is invalid, authorization denied."))?;

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        role: user.role,
    });

    Ok(next.run(request).await)
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("authorization")?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
