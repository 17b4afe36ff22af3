// src/models/response.rs

use serde::Serialize;
use sqlx::FromRow;

/// One row of the post-submission review: the 'response' table joined
/// with its question. Correct answers and explanations are only revealed
/// through this projection, never mid-attempt.
#[derive(Debug, Serialize, FromRow)]
pub struct ReviewItem {
    pub quiz_id: i64,
    pub question: String,
    pub two_category: String,
    pub chosen: String,
    pub correct: String,
    pub explanation: String,
    pub is_correct: bool,
    pub response_time_s: f64,
}
