// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::academy::find_course,
    models::{
        activity::{ActivityListParams, ActivityLog, Target},
        course::{Course, CreateCourseRequest, CreateLessonRequest, Lesson, LessonType},
        quiz::{QuestionBank, Quiz, QuizRequest},
        sale::UserSalesResponse,
        user::User,
    },
    services::{
        activity::log_activity,
        navigation::find_lesson,
        reporting::{admin_dashboard, sales_summary_for},
    },
    utils::jwt::Claims,
};

const DEFAULT_ACTIVITY_LIMIT: i64 = 50;
const MAX_ACTIVITY_LIMIT: i64 = 500;

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, name, role, is_active, created_at FROM users ORDER BY id DESC",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// CRM overview: head-count, this month's revenue and commission,
/// course count, latest activity and newest staff.
/// Admin only.
pub async fn dashboard(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let stats = admin_dashboard(&pool, chrono::Utc::now()).await?;
    Ok(Json(stats))
}

/// Sales totals of a staff member.
/// Admin only.
pub async fn user_sales(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, name, role, is_active, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    if !user.is_staff() {
        return Err(AppError::BadRequest(
            "Only staff members have sales records".to_string(),
        ));
    }

    let summary = sales_summary_for(&pool, user.id).await?;

    Ok(Json(UserSalesResponse { user, summary }))
}

/// Creates a course. Titles are unique.
/// Admin only.
pub async fn create_course(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let admin_id = claims.user_id()?;

    let mut tx = pool.begin().await?;

    let course = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (title, description, category, difficulty, duration_hours, cover_image, instructor_name)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, title, description, category, difficulty, duration_hours, cover_image, instructor_name, created_at
        "#,
    )
    .bind(payload.title.trim())
    .bind(&payload.description)
    .bind(&payload.category)
    .bind(payload.difficulty.as_deref().unwrap_or("Beginner"))
    .bind(payload.duration_hours.unwrap_or(0))
    .bind(&payload.cover_image)
    .bind(&payload.instructor_name)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "A course with this title already exists"))?;

    log_activity(
        &mut tx,
        admin_id,
        &format!("Created course '{}'", course.title),
        Some(Target::Course(course.id)),
    )
    .await;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(course)))
}

/// Adds a lesson to a course. Orders are unique within a course.
/// Admin only.
pub async fn create_lesson(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let admin_id = claims.user_id()?;
    let course = find_course(&pool, course_id).await?;

    let mut tx = pool.begin().await?;

    let lesson = sqlx::query_as::<_, Lesson>(
        r#"
        INSERT INTO lessons (course_id, title, lesson_type, content, video_url, lesson_order)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, course_id, title, lesson_type, content, video_url, lesson_order, created_at
        "#,
    )
    .bind(course.id)
    .bind(payload.title.trim())
    .bind(payload.lesson_type.unwrap_or(LessonType::Text))
    .bind(&payload.content)
    .bind(&payload.video_url)
    .bind(payload.order)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        AppError::conflict_on_unique(e, format!("Lesson order {} is already taken", payload.order))
    })?;

    log_activity(
        &mut tx,
        admin_id,
        &format!("Added lesson '{}' to '{}'", lesson.title, course.title),
        Some(Target::Lesson(lesson.id)),
    )
    .await;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Attaches a quiz to a lesson and turns it into a quiz lesson.
/// The question bank must be fully valid. Admin only.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
    Json(payload): Json<QuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let admin_id = claims.user_id()?;
    let bank = QuestionBank::parse_strict(&payload.questions_json)?;
    let lesson = find_lesson(&pool, lesson_id).await?;

    let mut tx = pool.begin().await?;

    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        INSERT INTO quizzes (lesson_id, title, questions)
        VALUES ($1, $2, $3)
        RETURNING id, lesson_id, title, questions, created_at, updated_at
        "#,
    )
    .bind(lesson.id)
    .bind(payload.title.trim())
    .bind(&payload.questions_json)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "This lesson already has a quiz"))?;

    sqlx::query("UPDATE lessons SET lesson_type = $1 WHERE id = $2")
        .bind(LessonType::Quiz)
        .bind(lesson.id)
        .execute(&mut *tx)
        .await?;

    log_activity(
        &mut tx,
        admin_id,
        &format!("Created quiz '{}' with {} questions", quiz.title, bank.len()),
        Some(Target::Quiz(quiz.id)),
    )
    .await;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Replaces the title and question bank of a quiz.
/// Admin only.
pub async fn update_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<QuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let admin_id = claims.user_id()?;
    let bank = QuestionBank::parse_strict(&payload.questions_json)?;

    let mut tx = pool.begin().await?;

    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        UPDATE quizzes
        SET title = $1, questions = $2, updated_at = CURRENT_TIMESTAMP
        WHERE id = $3
        RETURNING id, lesson_id, title, questions, created_at, updated_at
        "#,
    )
    .bind(payload.title.trim())
    .bind(&payload.questions_json)
    .bind(quiz_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    log_activity(
        &mut tx,
        admin_id,
        &format!("Updated quiz '{}' ({} questions)", quiz.title, bank.len()),
        Some(Target::Quiz(quiz.id)),
    )
    .await;

    tx.commit().await?;

    Ok(Json(quiz))
}

/// Deletes a quiz together with its attempts; the lesson falls back to a
/// text lesson. Admin only.
pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let admin_id = claims.user_id()?;

    let mut tx = pool.begin().await?;

    let lesson_id: i64 = sqlx::query_scalar("DELETE FROM quizzes WHERE id = $1 RETURNING lesson_id")
        .bind(quiz_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    sqlx::query("UPDATE lessons SET lesson_type = $1 WHERE id = $2")
        .bind(LessonType::Text)
        .bind(lesson_id)
        .execute(&mut *tx)
        .await?;

    log_activity(
        &mut tx,
        admin_id,
        "Deleted quiz",
        Some(Target::Lesson(lesson_id)),
    )
    .await;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Most recent activity entries, newest first.
/// Admin only.
pub async fn list_activity(
    State(pool): State<SqlitePool>,
    Query(params): Query<ActivityListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT);

    let entries = sqlx::query_as::<_, ActivityLog>(
        r#"
        SELECT id, user_id, action, target_type, target_id, created_at
        FROM activity_logs
        ORDER BY id DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list activity: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(entries))
}
