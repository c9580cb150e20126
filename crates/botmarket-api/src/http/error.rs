//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use botmarket_types::error::{ChatbotError, UserError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chatbot directory and mutation errors.
    Chatbot(ChatbotError),
    /// Account and session errors.
    User(UserError),
    /// Request-level validation failure (bad parameters, empty body).
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatbotError> for AppError {
    fn from(e: ChatbotError) -> Self {
        AppError::Chatbot(e)
    }
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        AppError::User(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Chatbot(ChatbotError::NotFound) => (
                StatusCode::NOT_FOUND,
                "CHATBOT_NOT_FOUND",
                "Chatbot not found".to_string(),
            ),
            AppError::Chatbot(ChatbotError::DeveloperNotFound) => (
                StatusCode::NOT_FOUND,
                "DEVELOPER_NOT_FOUND",
                "Developer not found".to_string(),
            ),
            AppError::Chatbot(ChatbotError::Forbidden(msg)) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
            }
            AppError::Chatbot(ChatbotError::Validation(e)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Chatbot(ChatbotError::Storage(msg)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", msg.clone())
            }
            AppError::User(UserError::NotFound) => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            // Login failures are deliberately opaque: same code and status
            // whether the email or the password was wrong.
            AppError::User(UserError::InvalidCredentials) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "LOGIN_FAILED",
                "Invalid email or password".to_string(),
            ),
            AppError::User(UserError::Validation(e)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::User(UserError::Hashing(msg)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "HASHING_ERROR", msg.clone())
            }
            AppError::User(UserError::Storage(msg)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
