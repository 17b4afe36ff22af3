// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    engine,
    error::AppError,
    models::{
        attempt::{
            Attempt, StartQuizRequest, StartQuizResponse, SubmitQuizRequest, SubmitQuizResponse,
        },
        question::{PublicQuestion, Question},
        response::ReviewItem,
    },
};

const ATTEMPT_COLUMNS: &str = "attempt_id, student_id, started_at, finished_at, \
     score_pct, items_total, items_correct, fund_correct, norm_correct";

async fn load_bank(pool: &SqlitePool) -> Result<Vec<Question>, AppError> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT quiz_id, question, two_category, options_json, correct_text, explanation
        FROM quiz
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load question bank: {:?}", e);
        AppError::from(e)
    })
}

/// Starts a quiz attempt for a student.
///
/// An unfinished attempt is resumed instead of creating a second one;
/// either way the full 30-question paper is assembled fresh, shuffled,
/// and served without correct answers or explanations.
pub async fn start_quiz(
    State(pool): State<SqlitePool>,
    Json(payload): Json<StartQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let _exists = sqlx::query_scalar::<_, i64>("SELECT student_id FROM student WHERE student_id = ?")
        .bind(payload.student_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Student not found".to_string()))?;

    let bank = load_bank(&pool).await?;
    let paper = engine::assemble_paper(&bank, &mut rand::thread_rng())?;

    let existing = sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {ATTEMPT_COLUMNS} FROM attempt \
         WHERE student_id = ? AND finished_at IS NULL \
         ORDER BY started_at DESC, attempt_id DESC LIMIT 1"
    ))
    .bind(payload.student_id)
    .fetch_optional(&pool)
    .await?;

    let (attempt_id, started_at, resumed) = match existing {
        Some(attempt) => (attempt.attempt_id, attempt.started_at, true),
        None => {
            let started_at = Utc::now();
            let result = sqlx::query("INSERT INTO attempt (student_id, started_at) VALUES (?, ?)")
                .bind(payload.student_id)
                .bind(started_at)
                .execute(&pool)
                .await?;
            (result.last_insert_rowid(), started_at, false)
        }
    };

    Ok(Json(StartQuizResponse {
        attempt_id,
        started_at,
        resumed,
        questions: paper.into_iter().map(PublicQuestion::from).collect(),
    }))
}

/// Submits a complete attempt and persists the graded result.
///
/// * Grading happens first, as a pure computation over the bank.
/// * The 30 response rows and the attempt completion commit in a single
///   transaction, so a failed submission leaves nothing behind.
/// * A finished attempt cannot be submitted again.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {ATTEMPT_COLUMNS} FROM attempt WHERE attempt_id = ? AND student_id = ?"
    ))
    .bind(req.attempt_id)
    .bind(req.student_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    if attempt.finished_at.is_some() {
        return Err(AppError::Conflict(
            "Attempt has already been submitted".to_string(),
        ));
    }

    let bank = load_bank(&pool).await?;
    engine::validate_bank(&bank)?;
    let graded = engine::grade_submission(&bank, &req.answers)?;

    let finished_at = Utc::now();
    let mut tx = pool.begin().await?;

    for ans in &graded.answers {
        sqlx::query(
            r#"
            INSERT INTO response
            (student_id, attempt_id, quiz_id, answer_text, is_correct, response_time_s)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(req.student_id)
        .bind(attempt.attempt_id)
        .bind(ans.quiz_id)
        .bind(&ans.answer_text)
        .bind(ans.is_correct)
        .bind(ans.time_sec)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        r#"
        UPDATE attempt
        SET finished_at = ?, score_pct = ?, items_total = ?, items_correct = ?,
            fund_correct = ?, norm_correct = ?
        WHERE attempt_id = ?
        "#,
    )
    .bind(finished_at)
    .bind(graded.score_pct)
    .bind(graded.items_total)
    .bind(graded.items_correct)
    .bind(graded.topics.fund_correct)
    .bind(graded.topics.norm_correct)
    .bind(attempt.attempt_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        attempt_id = attempt.attempt_id,
        correct = graded.items_correct,
        score = graded.score_pct,
        "quiz submitted"
    );

    Ok(Json(SubmitQuizResponse {
        attempt_id: attempt.attempt_id,
        score_pct: graded.score_pct,
        items_correct: graded.items_correct,
        items_total: graded.items_total,
        fund_pct: graded.topics.fund_pct(),
        norm_pct: graded.topics.norm_pct(),
        unlocked: engine::evaluate_unlock(Some(&graded.topics)).unlocked(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReviewParams {
    pub student_id: i64,
}

/// Post-submission review: every response with its question, the correct
/// answer and the explanation, plus this attempt's topic split.
/// Only finished attempts owned by the student are visible.
pub async fn review_attempt(
    State(pool): State<SqlitePool>,
    Path(attempt_id): Path<i64>,
    Query(params): Query<ReviewParams>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {ATTEMPT_COLUMNS} FROM attempt WHERE attempt_id = ? AND student_id = ?"
    ))
    .bind(attempt_id)
    .bind(params.student_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    if attempt.finished_at.is_none() {
        return Err(AppError::NotFound(
            "Attempt has not been submitted yet".to_string(),
        ));
    }

    let items = sqlx::query_as::<_, ReviewItem>(
        r#"
        SELECT r.quiz_id, q.question, q.two_category, r.answer_text AS chosen,
               q.correct_text AS correct, q.explanation, r.is_correct, r.response_time_s
        FROM response r
        JOIN quiz q ON q.quiz_id = r.quiz_id
        WHERE r.attempt_id = ?
        ORDER BY r.quiz_id
        "#,
    )
    .bind(attempt_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load review items: {:?}", e);
        AppError::from(e)
    })?;

    let topics = attempt.topic_scores();
    let unlocked = engine::evaluate_unlock(Some(&topics)).unlocked();

    Ok(Json(serde_json::json!({
        "attempt": attempt.summary(),
        "items": items,
        "fund_pct": topics.fund_pct(),
        "norm_pct": topics.norm_pct(),
        "unlocked": unlocked,
        "next_topic": crate::config::NEXT_TOPIC_NAME,
    })))
}
