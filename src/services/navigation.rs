// src/services/navigation.rs

use sqlx::SqliteExecutor;

use crate::{
    error::AppError,
    models::{course::Lesson, enrollment::Enrollment},
};

const LESSON_COLUMNS: &str =
    "id, course_id, title, lesson_type, content, video_url, lesson_order, created_at";

/// The lesson with the smallest order strictly greater than `current_order`.
pub async fn next_lesson<'c>(
    db: impl SqliteExecutor<'c>,
    course_id: i64,
    current_order: i64,
) -> Result<Option<Lesson>, AppError> {
    let lesson = sqlx::query_as::<_, Lesson>(&format!(
        "SELECT {LESSON_COLUMNS} FROM lessons WHERE course_id = $1 AND lesson_order > $2 ORDER BY lesson_order ASC LIMIT 1"
    ))
    .bind(course_id)
    .bind(current_order)
    .fetch_optional(db)
    .await?;
    Ok(lesson)
}

/// The lesson with the largest order strictly less than `current_order`.
///
/// Orders start at 1, so anything at or below 1 has no predecessor and
/// the database is not consulted.
pub async fn prev_lesson<'c>(
    db: impl SqliteExecutor<'c>,
    course_id: i64,
    current_order: i64,
) -> Result<Option<Lesson>, AppError> {
    if current_order <= 1 {
        return Ok(None);
    }

    let lesson = sqlx::query_as::<_, Lesson>(&format!(
        "SELECT {LESSON_COLUMNS} FROM lessons WHERE course_id = $1 AND lesson_order < $2 ORDER BY lesson_order DESC LIMIT 1"
    ))
    .bind(course_id)
    .bind(current_order)
    .fetch_optional(db)
    .await?;
    Ok(lesson)
}

/// All lessons of a course in order.
pub async fn course_lessons<'c>(
    db: impl SqliteExecutor<'c>,
    course_id: i64,
) -> Result<Vec<Lesson>, AppError> {
    let lessons = sqlx::query_as::<_, Lesson>(&format!(
        "SELECT {LESSON_COLUMNS} FROM lessons WHERE course_id = $1 ORDER BY lesson_order ASC"
    ))
    .bind(course_id)
    .fetch_all(db)
    .await?;
    Ok(lessons)
}

pub async fn find_lesson<'c>(db: impl SqliteExecutor<'c>, lesson_id: i64) -> Result<Lesson, AppError> {
    sqlx::query_as::<_, Lesson>(&format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1"))
        .bind(lesson_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("Lesson not found".to_string()))
}

pub async fn find_enrollment<'c>(
    db: impl SqliteExecutor<'c>,
    user_id: i64,
    course_id: i64,
) -> Result<Option<Enrollment>, AppError> {
    let enrollment = sqlx::query_as::<_, Enrollment>(
        r#"
        SELECT id, user_id, course_id, completed_lessons, enrolled_at
        FROM enrollments
        WHERE user_id = $1 AND course_id = $2
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(db)
    .await?;
    Ok(enrollment)
}

/// Access gate for lesson content: the user must be enrolled in the course.
/// Absence is a policy outcome (`NotEnrolled`), not a data error.
pub async fn require_enrollment<'c>(
    db: impl SqliteExecutor<'c>,
    user_id: i64,
    course_id: i64,
) -> Result<Enrollment, AppError> {
    find_enrollment(db, user_id, course_id)
        .await?
        .ok_or(AppError::NotEnrolled { course_id })
}
