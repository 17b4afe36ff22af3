// tests/analytics_tests.rs

use pla_backend::{config::Config, routes, seed, state::AppState};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

async fn spawn_app() -> (String, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    seed::seed_question_bank(&pool)
        .await
        .expect("Failed to seed question bank");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        rust_log: "error".to_string(),
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

async fn get_json(client: &reqwest::Client, url: String) -> serde_json::Value {
    let response = client.get(url).send().await.expect("request failed");
    assert_eq!(response.status().as_u16(), 200);
    response.json().await.unwrap()
}

/// Bank rows as (quiz_id, topic, correct_text, options).
async fn load_answer_key(pool: &SqlitePool) -> Vec<(i64, String, String, Vec<String>)> {
    let rows: Vec<(i64, String, String, String)> = sqlx::query_as(
        "SELECT quiz_id, two_category, correct_text, options_json FROM quiz ORDER BY quiz_id",
    )
    .fetch_all(pool)
    .await
    .unwrap();

    rows.into_iter()
        .map(|(id, topic, correct, options_json)| {
            let options: Vec<String> = serde_json::from_str(&options_json).unwrap();
            (id, topic, correct, options)
        })
        .collect()
}

async fn create_student(client: &reqwest::Client, address: &str, name: &str, email: &str) -> i64 {
    let response = client
        .post(format!("{}/api/students", address))
        .json(&serde_json::json!({ "name": name, "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    body["student_id"].as_i64().unwrap()
}

/// Runs one full attempt. `wrong_for` misses that question; `slow_id` and
/// `fast_id` get distinctive response times for the timing analytics.
async fn run_attempt(
    client: &reqwest::Client,
    address: &str,
    pool: &SqlitePool,
    student_id: i64,
    wrong_for: Option<i64>,
    slow_id: i64,
    fast_id: i64,
) -> serde_json::Value {
    let key = load_answer_key(pool).await;

    let start: serde_json::Value = client
        .post(format!("{}/api/quiz/start", address))
        .json(&serde_json::json!({ "student_id": student_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let answers: Vec<serde_json::Value> = key
        .iter()
        .map(|(id, _, correct, options)| {
            let chosen = if wrong_for == Some(*id) {
                options.iter().find(|o| *o != correct).unwrap().clone()
            } else {
                correct.clone()
            };
            let time_sec = if *id == slow_id {
                42.0
            } else if *id == fast_id {
                0.5
            } else {
                10.0
            };
            serde_json::json!({ "quiz_id": id, "chosen": chosen, "time_sec": time_sec })
        })
        .collect();

    let response = client
        .post(format!("{}/api/quiz/submit", address))
        .json(&serde_json::json!({
            "attempt_id": start["attempt_id"],
            "student_id": student_id,
            "answers": answers,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    response.json().await.unwrap()
}

#[tokio::test]
async fn a_fresh_database_yields_empty_projections() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let overview = get_json(&client, format!("{}/api/admin/overview", address)).await;
    assert_eq!(overview["student_count"], 0);
    assert_eq!(overview["attempt_count"], 0);
    assert_eq!(overview["response_count"], 0);
    assert_eq!(overview["daily_attempts"].as_array().unwrap().len(), 0);

    // Both topics are listed even before any responses exist.
    let stats = overview["category_stats"].as_array().unwrap();
    assert_eq!(stats.len(), 2);
    for topic in stats {
        assert_eq!(topic["response_count"], 0);
        assert!(topic["accuracy"].is_null());
    }

    let rankings = get_json(&client, format!("{}/api/admin/rankings", address)).await;
    assert_eq!(rankings.as_array().unwrap().len(), 0);

    let students = get_json(&client, format!("{}/api/admin/students", address)).await;
    assert_eq!(students.as_array().unwrap().len(), 0);

    let questions = get_json(&client, format!("{}/api/admin/questions", address)).await;
    let questions = questions.as_array().unwrap();
    assert_eq!(questions.len(), 30);
    assert!(questions.iter().all(|q| q["response_count"] == 0));

    let timing = get_json(&client, format!("{}/api/admin/timing", address)).await;
    assert_eq!(timing["per_question"].as_array().unwrap().len(), 0);
    assert!(timing["slowest"].is_null());
    assert!(timing["fastest"].is_null());
}

#[tokio::test]
async fn analytics_reflect_two_finished_attempts() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let student_id = create_student(&client, &address, "Ng En Ji", "ngenji@demo.edu").await;

    let key = load_answer_key(&pool).await;
    let wrong_id = key[0].0;
    let slow_id = key[5].0;
    let fast_id = key[10].0;

    // First attempt perfect, second misses one question.
    run_attempt(&client, &address, &pool, student_id, None, slow_id, fast_id).await;
    run_attempt(
        &client,
        &address,
        &pool,
        student_id,
        Some(wrong_id),
        slow_id,
        fast_id,
    )
    .await;

    let overview = get_json(&client, format!("{}/api/admin/overview", address)).await;
    assert_eq!(overview["student_count"], 1);
    assert_eq!(overview["attempt_count"], 2);
    assert_eq!(overview["response_count"], 60);
    assert_eq!(overview["daily_attempts"].as_array().unwrap().len(), 1);
    assert_eq!(overview["daily_attempts"][0]["attempts"], 2);

    // Fundamentals accuracy: 29 of 30 responses correct across attempts.
    let stats = overview["category_stats"].as_array().unwrap();
    let fund = stats
        .iter()
        .find(|s| s["two_category"] == "Data Modeling & DBMS Fundamentals")
        .unwrap();
    let accuracy = fund["accuracy"].as_f64().unwrap();
    assert!((accuracy - 29.0 / 30.0).abs() < 1e-9);
    assert_eq!(fund["response_count"], 30);

    let students = get_json(&client, format!("{}/api/admin/students", address)).await;
    let students = students.as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["attempt_count"], 2);

    // Rankings: best is the first attempt, latest is the regression.
    let rankings = get_json(&client, format!("{}/api/admin/rankings", address)).await;
    let rankings = rankings.as_array().unwrap();
    assert_eq!(rankings.len(), 1);
    assert_eq!(rankings[0]["attempt_count"], 2);
    assert_eq!(rankings[0]["best_score"], 100.0);
    assert_eq!(rankings[0]["latest_score"], 96.7);
    let avg = rankings[0]["avg_score"].as_f64().unwrap();
    assert!((avg - 98.35).abs() < 1e-9);

    // The missed question is the only one below full accuracy.
    let questions = get_json(&client, format!("{}/api/admin/questions", address)).await;
    let questions = questions.as_array().unwrap();
    assert_eq!(questions.len(), 30);
    for q in questions {
        let accuracy = q["accuracy"].as_f64().unwrap();
        assert_eq!(q["response_count"], 2);
        if q["quiz_id"].as_i64() == Some(wrong_id) {
            assert!((accuracy - 0.5).abs() < 1e-9);
        } else {
            assert!((accuracy - 1.0).abs() < 1e-9);
        }
    }

    // Timing singles out the designated slow and fast questions.
    let timing = get_json(&client, format!("{}/api/admin/timing", address)).await;
    assert_eq!(timing["per_question"].as_array().unwrap().len(), 30);
    assert_eq!(timing["slowest"]["quiz_id"].as_i64(), Some(slow_id));
    assert_eq!(timing["slowest"]["avg_time"], 42.0);
    assert_eq!(timing["fastest"]["quiz_id"].as_i64(), Some(fast_id));
    assert_eq!(timing["fastest"]["avg_time"], 0.5);

    // Gating and rankings agree on which attempt is the latest.
    let dashboard = get_json(
        &client,
        format!("{}/api/students/{}/dashboard", address, student_id),
    )
    .await;
    assert_eq!(dashboard["unlocked"], false);
    assert_eq!(dashboard["latest"]["score_pct"], 96.7);
}
