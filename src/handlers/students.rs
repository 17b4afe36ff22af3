// src/handlers/students.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::student::{CreateStudentRequest, Student},
};

/// Enrolls a new student.
/// Returns 201 Created with the new student id.
pub async fn create_student(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = payload.email.trim().to_lowercase();

    let result = sqlx::query("INSERT INTO student (name, email) VALUES (?, ?)")
        .bind(payload.name.trim())
        .bind(&email)
        .execute(&pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                AppError::Conflict(format!("Email '{}' is already registered", email))
            } else {
                tracing::error!("Failed to create student: {:?}", e);
                AppError::from(e)
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "student_id": result.last_insert_rowid() })),
    ))
}

/// Retrieves a single student by ID.
pub async fn get_student(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student = sqlx::query_as::<_, Student>(
        "SELECT student_id, name, email FROM student WHERE student_id = ?",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Student not found".to_string()))?;

    Ok(Json(student))
}
