// src/handlers/feedback.rs

use axum::{Json, response::IntoResponse};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;

/// DTO for the post-quiz feedback form.
#[derive(Debug, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i32,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub comment: Option<String>,
}

/// Accepts feedback after a quiz. Ratings are validated and acknowledged
/// but deliberately not stored.
pub async fn submit_feedback(
    Json(payload): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    tracing::info!(
        rating = payload.rating,
        has_comment = payload.comment.is_some(),
        "feedback received"
    );

    Ok(Json(serde_json::json!({
        "message": "Feedback submitted successfully"
    })))
}
