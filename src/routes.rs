// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{analytics, dashboard, feedback, quiz, students},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (students, quiz, admin analytics).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (database pool + config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let student_routes = Router::new()
        .route("/", post(students::create_student))
        .route("/{id}", get(students::get_student))
        .route("/{id}/dashboard", get(dashboard::student_dashboard));

    let quiz_routes = Router::new()
        .route("/start", post(quiz::start_quiz))
        .route("/submit", post(quiz::submit_quiz))
        .route("/review/{attempt_id}", get(quiz::review_attempt));

    // Lecturer surface, read-only by construction.
    let admin_routes = Router::new()
        .route("/overview", get(analytics::overview))
        .route("/students", get(analytics::students))
        .route("/rankings", get(analytics::rankings))
        .route("/questions", get(analytics::questions))
        .route("/timing", get(analytics::timing));

    Router::new()
        .nest("/api/students", student_routes)
        .nest("/api/quiz", quiz_routes)
        .nest("/api/admin", admin_routes)
        .route("/api/feedback", post(feedback::submit_feedback))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
