// Shared fixtures for database-backed unit tests.

use sqlx::SqlitePool;

use crate::{
    db,
    models::{enrollment::Enrollment, sale::Sale},
};

pub async fn pool() -> SqlitePool {
    let pool = db::connect("sqlite::memory:", 1).await.unwrap();
    db::migrate(&pool).await.unwrap();
    pool
}

pub async fn seed_user(pool: &SqlitePool, username: &str, role: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (username, name, role) VALUES ($1, $1, $2) RETURNING id")
        .bind(username)
        .bind(role)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_course(pool: &SqlitePool, title: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO courses (title, description, category) VALUES ($1, 'About ' || $1, 'Dev') RETURNING id",
    )
    .bind(title)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_lesson(pool: &SqlitePool, course_id: i64, order: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO lessons (course_id, title, lesson_type, lesson_order) VALUES ($1, $2, 'Text', $3) RETURNING id",
    )
    .bind(course_id)
    .bind(format!("Lesson {}", order))
    .bind(order)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn enroll(pool: &SqlitePool, user_id: i64, course_id: i64) -> Enrollment {
    sqlx::query_as(
        r#"
        INSERT INTO enrollments (user_id, course_id) VALUES ($1, $2)
        RETURNING id, user_id, course_id, completed_lessons, enrolled_at
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_sale(pool: &SqlitePool, user_id: Option<i64>, amount: f64) -> Sale {
    sqlx::query_as(
        r#"
        INSERT INTO sales (user_id, product_name, amount) VALUES ($1, 'Brand kit', $2)
        RETURNING id, user_id, product_name, amount, posted_at
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .fetch_one(pool)
    .await
    .unwrap()
}
