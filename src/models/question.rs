// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

/// Represents the 'quiz' table in the database.
///
/// The bank is seeded once and immutable afterwards: exactly 30 rows,
/// 15 per topic. `correct_text` is the canonical representation of the
/// right answer (the full option text, never a letter).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub quiz_id: i64,

    /// The text content of the question.
    pub question: String,

    /// One of the two recognized topic strings.
    pub two_category: String,

    /// The four answer options, in stored order.
    /// Stored as a JSON array in the database.
    #[sqlx(rename = "options_json")]
    pub options: Json<Vec<String>>,

    /// The correct option, by exact text.
    pub correct_text: String,

    /// Explanation shown during post-submission review.
    pub explanation: String,
}

/// DTO for serving a question to a student mid-attempt
/// (excludes the correct answer and the explanation).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub quiz_id: i64,
    pub question: String,
    pub two_category: String,
    pub options: Vec<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        PublicQuestion {
            quiz_id: q.quiz_id,
            question: q.question,
            two_category: q.two_category,
            options: q.options.0,
        }
    }
}
