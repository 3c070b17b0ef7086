// tests/common/mod.rs

#![allow(dead_code)]

use academy::{config::Config, db, routes, state::AppState, utils::jwt::sign_jwt};
use sqlx::SqlitePool;

pub const TEST_SECRET: &str = "test_secret_for_integration_tests";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        rust_log: "error".to_string(),
        commission_rate: 0.10,
        port: 0,
    }
}

/// Helper function to spawn the app on a random port for testing.
/// Every app gets its own in-memory database.
pub async fn spawn_app() -> TestApp {
    let config = test_config();

    // 1. Create a pool
    let pool = db::connect(&config.database_url, 1)
        .await
        .expect("Failed to open in-memory database");

    // 2. Run migrations
    db::migrate(&pool).await.expect("Failed to migrate database");

    // 3. Create the router with the app state
    let state = AppState::new(pool.clone(), config);
    let app = routes::create_router(state);

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 5. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        pool,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Inserts a user with the given role and returns a bearer token for it.
    pub async fn user_token(&self, role: &str) -> (i64, String) {
        let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, name, role) VALUES ($1, $1, $2) RETURNING id",
        )
        .bind(&username)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to seed user");

        let token = sign_jwt(id, role, TEST_SECRET, 600).expect("Failed to sign token");
        (id, token)
    }

    pub async fn post_json(
        &self,
        path: &str,
        token: &str,
        body: serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates a course with `lessons` text lessons through the admin API.
    /// Returns the course id and the lesson ids in order.
    pub async fn create_course(&self, admin_token: &str, lessons: i64) -> (i64, Vec<i64>) {
        let title = format!("Course {}", uuid::Uuid::new_v4());
        let response = self
            .post_json(
                "/api/admin/courses",
                admin_token,
                serde_json::json!({
                    "title": title,
                    "description": "Everything about building things.",
                    "category": "Development"
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let course: serde_json::Value = response.json().await.unwrap();
        let course_id = course["id"].as_i64().unwrap();

        let mut lesson_ids = Vec::new();
        for order in 1..=lessons {
            let response = self
                .post_json(
                    &format!("/api/admin/courses/{}/lessons", course_id),
                    admin_token,
                    serde_json::json!({
                        "title": format!("Lesson {}", order),
                        "lesson_type": "Text",
                        "content": "Read me.",
                        "order": order
                    }),
                )
                .await;
            assert_eq!(response.status().as_u16(), 201);
            let lesson: serde_json::Value = response.json().await.unwrap();
            lesson_ids.push(lesson["id"].as_i64().unwrap());
        }

        (course_id, lesson_ids)
    }
}

/// A bank of `n` questions; question `i` has options `["wrong i", "right i"]`.
pub fn question_bank(n: usize) -> serde_json::Value {
    let questions: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "question": format!("Question {}", i),
                "options": [format!("wrong {}", i), format!("right {}", i)],
                "correct_index": 1
            })
        })
        .collect();
    serde_json::Value::Array(questions)
}

/// Answers the first `correct` of `n` questions right and the rest wrong.
pub fn answers(n: usize, correct: usize) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = (0..n)
        .map(|i| {
            let text = if i < correct {
                format!("right {}", i)
            } else {
                format!("wrong {}", i)
            };
            (i.to_string(), serde_json::Value::String(text))
        })
        .collect();
    serde_json::json!({ "answers": map })
}
