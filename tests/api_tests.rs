// tests/api_tests.rs

mod common;

use axum::{body::Body, http::Request};
use academy::state::AppState;
use common::{spawn_app, test_config};
use tower::ServiceExt;

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    // Drive the router directly, no socket involved.
    let pool = academy::db::connect("sqlite::memory:", 1).await.unwrap();
    academy::db::migrate(&pool).await.unwrap();
    let router = academy::create_router(AppState::new(pool, test_config()));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/academy/courses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn regular_users_cannot_reach_admin_routes() {
    let app = spawn_app().await;
    let (_, token) = app.user_token("normal").await;

    let response = app.get("/api/admin/activity", &token).await;
    assert_eq!(response.status().as_u16(), 403);

    let response = app
        .post_json(
            "/api/admin/courses",
            &token,
            serde_json::json!({"title": "x", "description": "y", "category": "z"}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn duplicate_course_title_conflicts() {
    let app = spawn_app().await;
    let (_, admin) = app.user_token("admin").await;
    let body = serde_json::json!({
        "title": "Rust for Designers",
        "description": "Ownership without tears.",
        "category": "Development"
    });

    let first = app.post_json("/api/admin/courses", &admin, body.clone()).await;
    assert_eq!(first.status().as_u16(), 201);

    let second = app.post_json("/api/admin/courses", &admin, body).await;
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
async fn duplicate_lesson_order_conflicts() {
    let app = spawn_app().await;
    let (_, admin) = app.user_token("admin").await;
    let (course_id, _) = app.create_course(&admin, 1).await;

    let response = app
        .post_json(
            &format!("/api/admin/courses/{}/lessons", course_id),
            &admin,
            serde_json::json!({"title": "Again", "order": 1}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 409);

    let response = app
        .post_json(
            &format!("/api/admin/courses/{}/lessons", course_id),
            &admin,
            serde_json::json!({"title": "Bad", "order": 2, "video_url": "not a url"}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn lesson_content_requires_enrollment() {
    let app = spawn_app().await;
    let (_, admin) = app.user_token("admin").await;
    let (_, learner) = app.user_token("normal").await;
    let (course_id, lessons) = app.create_course(&admin, 2).await;

    let response = app.get(&format!("/api/academy/lessons/{}", lessons[0]), &learner).await;
    assert_eq!(response.status().as_u16(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["course_id"], course_id);
    assert_eq!(
        body["enroll_url"],
        format!("/api/academy/courses/{}/enroll", course_id)
    );

    let response = app
        .post_json(
            &format!("/api/academy/lessons/{}/complete", lessons[0]),
            &learner,
            serde_json::json!({}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn enrolling_twice_conflicts() {
    let app = spawn_app().await;
    let (_, admin) = app.user_token("admin").await;
    let (_, learner) = app.user_token("normal").await;
    let (course_id, _) = app.create_course(&admin, 1).await;
    let enroll_path = format!("/api/academy/courses/{}/enroll", course_id);

    let first = app.post_json(&enroll_path, &learner, serde_json::json!({})).await;
    assert_eq!(first.status().as_u16(), 201);

    let second = app.post_json(&enroll_path, &learner, serde_json::json!({})).await;
    assert_eq!(second.status().as_u16(), 409);

    let missing = app
        .post_json("/api/academy/courses/9999/enroll", &learner, serde_json::json!({}))
        .await;
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn course_progress_flow() {
    let app = spawn_app().await;
    let (_, admin) = app.user_token("admin").await;
    let (_, learner) = app.user_token("normal").await;
    let (course_id, lessons) = app.create_course(&admin, 3).await;

    // Listing before enrolling
    let listing: serde_json::Value = app.get("/api/academy/courses", &learner).await.json().await.unwrap();
    let card = listing
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == course_id)
        .unwrap();
    assert_eq!(card["enrollment"]["is_enrolled"], false);
    assert_eq!(card["enrollment"]["progress"], 0);

    app.post_json(
        &format!("/api/academy/courses/{}/enroll", course_id),
        &learner,
        serde_json::json!({}),
    )
    .await;

    // Lesson view of the first lesson: no previous, next is lesson 2
    let view: serde_json::Value = app
        .get(&format!("/api/academy/lessons/{}", lessons[0]), &learner)
        .await
        .json()
        .await
        .unwrap();
    assert!(view["navigation"]["prev"].is_null());
    assert_eq!(view["navigation"]["next"]["id"], lessons[1]);
    assert_eq!(view["is_completed"], false);

    // Complete lesson 1 of 3
    let complete_path = format!("/api/academy/lessons/{}/complete", lessons[0]);
    let done: serde_json::Value = app
        .post_json(&complete_path, &learner, serde_json::json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(done["newly_completed"], true);
    assert_eq!(done["progress"], 33);
    assert_eq!(done["next_lesson"]["id"], lessons[1]);
    assert_eq!(done["course_completed"], false);

    // Completing it again changes nothing
    let again: serde_json::Value = app
        .post_json(&complete_path, &learner, serde_json::json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(again["newly_completed"], false);
    assert_eq!(again["progress"], 33);

    let certificate: serde_json::Value = app
        .get(&format!("/api/academy/courses/{}/certificate", course_id), &learner)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(certificate["eligible"], false);

    for lesson_id in &lessons[1..] {
        app.post_json(
            &format!("/api/academy/lessons/{}/complete", lesson_id),
            &learner,
            serde_json::json!({}),
        )
        .await;
    }

    let detail: serde_json::Value = app
        .get(&format!("/api/academy/courses/{}", course_id), &learner)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["is_enrolled"], true);
    assert_eq!(detail["progress"], 100);
    assert_eq!(detail["completed_lesson_ids"], serde_json::json!(lessons));

    let certificate: serde_json::Value = app
        .get(&format!("/api/academy/courses/{}/certificate", course_id), &learner)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(certificate["eligible"], true);

    // The last completion is logged as a finished course
    let activity: serde_json::Value = app.get("/api/admin/activity", &admin).await.json().await.unwrap();
    let finished = activity
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["action"].as_str().unwrap().starts_with("Finished course"));
    assert!(finished);
}
