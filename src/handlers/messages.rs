use axum::extract::{Json, Path, State};
use axum::Extension;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::store::messages::Message;
use crate::store::Id;

/// GET /api/messages — everything the caller sent or received.
pub async fn get_all_messages(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> Result<ApiResponse, ApiError> {
    let messages = state.store.messages_for_user(&caller.id).await?;
    Ok(ApiResponse::ok()
        .message("All messages retrieved successfully.")
        .data(json!({ "messages": messages })))
}

/// GET /api/messages/private/:userId — the two-way private conversation
/// with that user, oldest first.
pub async fn get_private_messages(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<Id>,
) -> Result<ApiResponse, ApiError> {
    let messages = state
        .store
        .private_messages_between(&caller.id, &user_id)
        .await?;
    Ok(ApiResponse::ok()
        .message("Private messages retrieved successfully.")
        .data(json!({ "messages": messages })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMessageInput {
    pub message: String,
    #[serde(default)]
    pub is_public: bool,
}

/// POST /api/messages/addMessage/:userId
///
/// Persists a directed message to `:userId`, or a broadcast record when
/// `isPublic` (the receiver is then absent).
pub async fn add_message(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<Id>,
    Json(input): Json<AddMessageInput>,
) -> Result<ApiResponse, ApiError> {
    if input.message.trim().is_empty() {
        return Err(ApiError::invalid_data("Message text is missing or empty."));
    }

    let message = Message {
        id: Id::new(),
        sender_id: caller.id,
        receiver_id: if input.is_public { None } else { Some(user_id) },
        message: input.message,
        is_public: input.is_public,
        created_at: Utc::now(),
        seen_at: None,
    };
    state.store.insert_message(&message).await?;

    Ok(ApiResponse::ok()
        .message("Message sent successfully.")
        .data(json!({ "message": message })))
}
