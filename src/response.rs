use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;

/// Fixed success text shared by every endpoint.
pub const SUCCESS_MESSAGE: &str = "The request has been successfully processed";

/// Builder for the uniform success envelope
/// `{status, message, customMessage?, data?}`.
#[derive(Debug, Default)]
pub struct ApiResponse {
    custom_message: Option<String>,
    data: Option<Value>,
    serialize_failed: bool,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.custom_message = Some(message.into());
        self
    }

    pub fn data(mut self, data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => self.data = Some(value),
            Err(err) => {
                tracing::error!("failed to serialize response data: {}", err);
                self.serialize_failed = true;
            }
        }
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> axum::response::Response {
        if self.serialize_failed {
            return ApiError::service_error("Failed to format response.").into_response();
        }

        let mut body = json!({
            "status": "success",
            "message": SUCCESS_MESSAGE,
        });
        if let Some(message) = self.custom_message {
            body["customMessage"] = Value::String(message);
        }
        if let Some(data) = self.data {
            body["data"] = data;
        }

        (StatusCode::OK, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_envelope_fields() {
        let response = ApiResponse::ok()
            .message("Tag added successfully.")
            .data(json!({"name": "Travel"}));

        assert_eq!(
            response.custom_message.as_deref(),
            Some("Tag added successfully.")
        );
        assert_eq!(response.data, Some(json!({"name": "Travel"})));
        assert!(!response.serialize_failed);
    }

    #[test]
    fn omits_optional_fields_by_default() {
        let response = ApiResponse::ok();
        assert!(response.custom_message.is_none());
        assert!(response.data.is_none());
    }
}
