// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 500: the question bank violates the 15+15 integrity precondition.
    // Quizzes must not be served from a malformed bank.
    BankIntegrity(String),

    // 400 Bad Request
    BadRequest(String),

    // 400: a submitted choice is not a legal letter or option text
    InvalidChoice(String),

    // 400: fewer than the full set of answers was submitted
    IncompleteSubmission(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., duplicate email, re-submitting a finished attempt)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
///
/// Every error renders as `{"error": <message>, "code": <CODE>}` with the
/// matching HTTP status. The codes are a stable contract with the front-end.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BankIntegrity(msg) => {
                tracing::error!("Question bank integrity failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "QUIZ_BANK_INVALID", msg)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::InvalidChoice(msg) => {
                (StatusCode::BAD_REQUEST, "SUBMIT_INVALID_LETTER", msg)
            }
            AppError::IncompleteSubmission(msg) => {
                (StatusCode::BAD_REQUEST, "SUBMIT_INCOMPLETE", msg)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
        };
        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
