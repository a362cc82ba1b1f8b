//! Error handling for the shelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::response::ApiResponse;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("bad request: {message}")]
    BadRequest {
        message: String,
        data: Option<Value>,
    },
}

impl AppError {
    /// Create a validation error (422)
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a bad request error (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            data: None,
        }
    }

    /// Create a bad request error (400) that still carries a `data` payload
    pub fn bad_request_with_data(message: impl Into<String>, data: Value) -> Self {
        Self::BadRequest {
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::BadRequest { .. } => "bad_request",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status_code();
        let error_code = self.code();

        tracing::error!(
            error_id = %error_id,
            error_code = %error_code,
            status_code = %status.as_u16(),
            error = %self,
            "Request error"
        );

        let body = match self {
            AppError::Validation { message } => ApiResponse::<Value>::message(message),
            AppError::BadRequest { message, data } => ApiResponse { message, data },
        };

        (status, Json(body)).into_response()
    }
}
