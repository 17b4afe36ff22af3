// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
    config::QUESTIONS_PER_TOPIC,
    engine::TopicScores,
    models::question::PublicQuestion,
};

/// Represents the 'attempt' table in the database.
///
/// An attempt is created as a shell when the quiz starts and completed
/// exactly once at submission. Rows are append-only history per student.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub attempt_id: i64,
    pub student_id: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub score_pct: f64,
    pub items_total: i64,
    pub items_correct: i64,
    pub fund_correct: i64,
    pub norm_correct: i64,
}

impl Attempt {
    /// Per-topic tallies of this attempt. Topic totals are fixed by the
    /// 15+15 quiz shape, not recounted from responses.
    pub fn topic_scores(&self) -> TopicScores {
        TopicScores {
            fund_correct: self.fund_correct,
            fund_total: QUESTIONS_PER_TOPIC as i64,
            norm_correct: self.norm_correct,
            norm_total: QUESTIONS_PER_TOPIC as i64,
        }
    }

    pub fn summary(&self) -> AttemptSummary {
        let topics = self.topic_scores();
        AttemptSummary {
            attempt_id: self.attempt_id,
            started_at: self.started_at,
            finished_at: self.finished_at,
            score_pct: self.score_pct,
            items_total: self.items_total,
            items_correct: self.items_correct,
            fund_pct: topics.fund_pct(),
            norm_pct: topics.norm_pct(),
        }
    }
}

/// Attempt projection used by the dashboard and review responses.
#[derive(Debug, Serialize)]
pub struct AttemptSummary {
    pub attempt_id: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub score_pct: f64,
    pub items_total: i64,
    pub items_correct: i64,
    pub fund_pct: f64,
    pub norm_pct: f64,
}

/// DTO for starting (or resuming) a quiz attempt.
#[derive(Debug, Deserialize)]
pub struct StartQuizRequest {
    pub student_id: i64,
}

#[derive(Debug, Serialize)]
pub struct StartQuizResponse {
    pub attempt_id: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// True when an unfinished attempt was picked up instead of a new one.
    pub resumed: bool,
    pub questions: Vec<PublicQuestion>,
}

/// One submitted answer. `chosen` is either a letter (A-D) or the exact
/// option text; letters are normalized to text at the boundary.
#[derive(Debug, Deserialize)]
pub struct SubmittedAnswer {
    pub quiz_id: i64,
    pub chosen: String,
    #[serde(default)]
    pub time_sec: f64,
}

/// DTO for submitting a complete attempt. All 30 questions must be
/// answered; partial submissions are rejected without persisting anything.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub attempt_id: i64,
    pub student_id: i64,
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    pub attempt_id: i64,
    pub score_pct: f64,
    pub items_correct: i64,
    pub items_total: i64,
    pub fund_pct: f64,
    pub norm_pct: f64,
    /// Whether this submission unlocks the next topic.
    pub unlocked: bool,
}
