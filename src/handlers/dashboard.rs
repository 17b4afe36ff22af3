// src/handlers/dashboard.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    config::{DASHBOARD_HISTORY_LIMIT, NEXT_TOPIC_NAME},
    engine,
    error::AppError,
    models::{attempt::Attempt, student::Student},
};

/// Student dashboard: latest-attempt metrics, the unlock decision and a
/// short score history for the progress chart.
///
/// Gating reads only the newest finished attempt (completion timestamp,
/// ties broken by attempt id). Zero finished attempts is reported as the
/// distinct `no_attempts` state for empty-state rendering.
pub async fn student_dashboard(
    State(pool): State<SqlitePool>,
    Path(student_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student = sqlx::query_as::<_, Student>(
        "SELECT student_id, name, email FROM student WHERE student_id = ?",
    )
    .bind(student_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Student not found".to_string()))?;

    let history = sqlx::query_as::<_, Attempt>(
        r#"
        SELECT attempt_id, student_id, started_at, finished_at, score_pct,
               items_total, items_correct, fund_correct, norm_correct
        FROM attempt
        WHERE student_id = ? AND finished_at IS NOT NULL
        ORDER BY finished_at DESC, attempt_id DESC
        LIMIT ?
        "#,
    )
    .bind(student_id)
    .bind(DASHBOARD_HISTORY_LIMIT)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load attempt history: {:?}", e);
        AppError::from(e)
    })?;

    let latest = history.first();
    let topics = latest.map(|a| a.topic_scores());
    let unlock = engine::evaluate_unlock(topics.as_ref());

    Ok(Json(serde_json::json!({
        "student": student,
        "latest": latest.map(|a| a.summary()),
        "fund_pct": topics.map(|t| t.fund_pct()).unwrap_or(0.0),
        "norm_pct": topics.map(|t| t.norm_pct()).unwrap_or(0.0),
        "unlock": unlock,
        "unlocked": unlock.unlocked(),
        "next_topic": NEXT_TOPIC_NAME,
        "history": history.iter().map(|a| a.summary()).collect::<Vec<_>>(),
    })))
}
