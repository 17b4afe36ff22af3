// src/handlers/analytics.rs

//! Lecturer-facing read-only aggregations over attempts and responses.
//! Pure projections: empty tables yield empty lists and zero counts,
//! never errors.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use sqlx::{SqlitePool, prelude::FromRow};

use crate::error::AppError;

/// Accuracy of one topic across all students.
#[derive(Debug, Serialize, FromRow)]
pub struct TopicAccuracy {
    pub two_category: String,
    /// `AVG(is_correct)`; NULL until the topic has responses.
    pub accuracy: Option<f64>,
    pub response_count: i64,
}

/// Finished attempts per calendar day.
#[derive(Debug, Serialize, FromRow)]
pub struct DailyAttempts {
    pub day: String,
    pub attempts: i64,
}

/// Overview dashboard: headline counts, per-topic accuracy and a 14-day
/// submission series.
pub async fn overview(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let student_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM student")
        .fetch_one(&pool)
        .await?;
    let attempt_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attempt")
        .fetch_one(&pool)
        .await?;
    let response_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM response")
        .fetch_one(&pool)
        .await?;

    let category_stats = sqlx::query_as::<_, TopicAccuracy>(
        r#"
        SELECT q.two_category,
               AVG(r.is_correct) AS accuracy,
               COUNT(r.response_id) AS response_count
        FROM quiz q
        LEFT JOIN response r ON q.quiz_id = r.quiz_id
        GROUP BY q.two_category
        ORDER BY q.two_category
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let daily_attempts = sqlx::query_as::<_, DailyAttempts>(
        r#"
        SELECT DATE(finished_at) AS day, COUNT(*) AS attempts
        FROM attempt
        WHERE finished_at IS NOT NULL
          AND DATE(finished_at) >= DATE('now', '-14 days')
        GROUP BY DATE(finished_at)
        ORDER BY day
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load daily attempts: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(serde_json::json!({
        "student_count": student_count,
        "attempt_count": attempt_count,
        "response_count": response_count,
        "category_stats": category_stats,
        "daily_attempts": daily_attempts,
    })))
}

/// Roster row with the student's attempt count.
#[derive(Debug, Serialize, FromRow)]
pub struct StudentOverview {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    pub attempt_count: i64,
}

/// Lists all students with how many attempts each has made.
pub async fn students(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let students = sqlx::query_as::<_, StudentOverview>(
        r#"
        SELECT s.student_id, s.name, s.email, COUNT(a.attempt_id) AS attempt_count
        FROM student s
        LEFT JOIN attempt a ON s.student_id = a.student_id
        GROUP BY s.student_id
        ORDER BY s.name
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(students))
}

/// One row of the performance ranking.
#[derive(Debug, Serialize, FromRow)]
pub struct RankingEntry {
    pub name: String,
    pub email: String,
    pub avg_score: f64,
    pub best_score: f64,
    /// Score of the newest finished attempt, same tie-break as gating.
    pub latest_score: f64,
    pub attempt_count: i64,
}

/// Ranks students by average score over their finished attempts.
pub async fn rankings(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let rankings = sqlx::query_as::<_, RankingEntry>(
        r#"
        SELECT s.name, s.email,
               AVG(a.score_pct) AS avg_score,
               MAX(a.score_pct) AS best_score,
               (SELECT a2.score_pct FROM attempt a2
                WHERE a2.student_id = s.student_id AND a2.finished_at IS NOT NULL
                ORDER BY a2.finished_at DESC, a2.attempt_id DESC
                LIMIT 1) AS latest_score,
               COUNT(a.attempt_id) AS attempt_count
        FROM student s
        JOIN attempt a ON s.student_id = a.student_id
        WHERE a.finished_at IS NOT NULL
        GROUP BY s.student_id
        ORDER BY avg_score DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load rankings: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(rankings))
}

/// Per-question accuracy across all students.
#[derive(Debug, Serialize, FromRow)]
pub struct QuestionStats {
    pub quiz_id: i64,
    pub question: String,
    pub two_category: String,
    pub accuracy: Option<f64>,
    pub response_count: i64,
}

/// Question performance statistics over the whole bank.
pub async fn questions(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, QuestionStats>(
        r#"
        SELECT q.quiz_id, q.question, q.two_category,
               AVG(r.is_correct) AS accuracy,
               COUNT(r.response_id) AS response_count
        FROM quiz q
        LEFT JOIN response r ON q.quiz_id = r.quiz_id
        GROUP BY q.quiz_id
        ORDER BY q.quiz_id
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(questions))
}

/// Average response time for one question.
#[derive(Debug, Serialize, FromRow)]
pub struct QuestionTiming {
    pub quiz_id: i64,
    pub question: String,
    pub two_category: String,
    pub avg_time: f64,
    pub response_count: i64,
}

/// Timing analytics: per-question average response time, slowest first,
/// with the slowest/fastest questions called out.
pub async fn timing(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let per_question = sqlx::query_as::<_, QuestionTiming>(
        r#"
        SELECT q.quiz_id, q.question, q.two_category,
               AVG(r.response_time_s) AS avg_time,
               COUNT(r.response_id) AS response_count
        FROM quiz q
        JOIN response r ON q.quiz_id = r.quiz_id
        GROUP BY q.quiz_id
        ORDER BY avg_time DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(serde_json::json!({
        "per_question": per_question,
        "slowest": per_question.first(),
        "fastest": per_question.last(),
    })))
}
