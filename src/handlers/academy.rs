// src/handlers/academy.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{SqliteExecutor, SqlitePool};

use crate::{
    error::AppError,
    models::{
        activity::Target,
        course::{
            CertificateResponse, CompleteLessonResponse, Course, CourseCard,
            CourseDetailResponse, EnrollmentStatus, LessonLink, LessonNavigation, LessonType,
            LessonViewResponse,
        },
        enrollment::Enrollment,
        quiz::{PublicQuiz, QuestionBank, Quiz},
    },
    services::{
        activity::log_activity,
        navigation::{
            course_lessons, find_enrollment, find_lesson, next_lesson, prev_lesson,
            require_enrollment,
        },
        progress::{
            course_lesson_ids, is_certificate_eligible, is_completed, mark_completed,
            progress_percent, save_completed_lessons,
        },
    },
    utils::jwt::Claims,
};

const COURSE_COLUMNS: &str = "id, title, description, category, difficulty, duration_hours, cover_image, instructor_name, created_at";

pub(crate) async fn find_course<'c>(
    db: impl SqliteExecutor<'c>,
    course_id: i64,
) -> Result<Course, AppError> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))
}

/// Lists every course with the caller's enrollment state and progress.
pub async fn list_courses(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let courses = sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses ORDER BY title ASC"
    ))
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list courses: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let enrollments: HashMap<i64, Enrollment> = sqlx::query_as::<_, Enrollment>(
        "SELECT id, user_id, course_id, completed_lessons, enrolled_at FROM enrollments WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?
    .into_iter()
    .map(|e| (e.course_id, e))
    .collect();

    let mut lessons_by_course: HashMap<i64, Vec<i64>> = HashMap::new();
    let lesson_rows: Vec<(i64, i64)> = sqlx::query_as("SELECT course_id, id FROM lessons")
        .fetch_all(&pool)
        .await?;
    for (course_id, lesson_id) in lesson_rows {
        lessons_by_course.entry(course_id).or_default().push(lesson_id);
    }

    let cards: Vec<CourseCard> = courses
        .into_iter()
        .map(|course| {
            let status = match enrollments.get(&course.id) {
                Some(enrollment) => EnrollmentStatus {
                    is_enrolled: true,
                    progress: progress_percent(
                        enrollment,
                        lessons_by_course.get(&course.id).map_or(&[][..], Vec::as_slice),
                    ),
                },
                None => EnrollmentStatus {
                    is_enrolled: false,
                    progress: 0,
                },
            };
            CourseCard::new(course, status)
        })
        .collect();

    Ok(Json(cards))
}

/// Course page: ordered lessons plus the caller's completion state.
pub async fn get_course(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let course = find_course(&pool, course_id).await?;
    let lessons = course_lessons(&pool, course_id).await?;
    let enrollment = find_enrollment(&pool, user_id, course_id).await?;

    let lesson_ids: Vec<i64> = lessons.iter().map(|l| l.id).collect();
    let (completed_lesson_ids, progress) = match &enrollment {
        Some(e) => (e.completed().ids().collect(), progress_percent(e, &lesson_ids)),
        None => (Vec::new(), 0),
    };

    Ok(Json(CourseDetailResponse {
        course,
        lessons,
        is_enrolled: enrollment.is_some(),
        completed_lesson_ids,
        progress,
    }))
}

/// Enrolls the caller in a course.
///
/// One enrollment per (user, course); a second attempt, including one
/// racing this request, yields 409.
pub async fn enroll(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let course = find_course(&pool, course_id).await?;

    if find_enrollment(&pool, user_id, course_id).await?.is_some() {
        return Err(AppError::Conflict("Already enrolled in this course".to_string()));
    }

    let mut tx = pool.begin().await?;

    let enrollment = sqlx::query_as::<_, Enrollment>(
        r#"
        INSERT INTO enrollments (user_id, course_id)
        VALUES ($1, $2)
        RETURNING id, user_id, course_id, completed_lessons, enrolled_at
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Already enrolled in this course"))?;

    log_activity(
        &mut tx,
        user_id,
        &format!("Enrolled in '{}'", course.title),
        Some(Target::Course(course.id)),
    )
    .await;

    tx.commit().await.map_err(|e| {
        tracing::error!(user_id, course_id, "Failed to commit enrollment: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(user_id, course_id, "User enrolled");

    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Shows a lesson to an enrolled user, with navigation and, for quiz
/// lessons, the questions without their answer key.
pub async fn get_lesson(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let lesson = find_lesson(&pool, lesson_id).await?;
    let enrollment = require_enrollment(&pool, user_id, lesson.course_id).await?;

    let lesson_ids = course_lesson_ids(&pool, lesson.course_id).await?;
    let prev = prev_lesson(&pool, lesson.course_id, lesson.order).await?;
    let next = next_lesson(&pool, lesson.course_id, lesson.order).await?;

    let quiz = if lesson.lesson_type == LessonType::Quiz {
        let quiz = sqlx::query_as::<_, Quiz>(
            "SELECT id, lesson_id, title, questions, created_at, updated_at FROM quizzes WHERE lesson_id = $1",
        )
        .bind(lesson.id)
        .fetch_optional(&pool)
        .await?;

        match quiz {
            Some(quiz) => {
                let bank = QuestionBank::parse(&quiz.questions).map_err(|e| {
                    tracing::warn!(quiz_id = quiz.id, "Stored question bank is unreadable: {}", e);
                    AppError::QuizUnavailable { lesson_id: lesson.id }
                })?;
                Some(PublicQuiz {
                    id: quiz.id,
                    title: quiz.title,
                    questions: bank.public_questions(),
                })
            }
            None => None,
        }
    } else {
        None
    };

    Ok(Json(LessonViewResponse {
        is_completed: is_completed(&enrollment, lesson.id),
        progress: progress_percent(&enrollment, &lesson_ids),
        navigation: LessonNavigation {
            prev: prev.as_ref().map(LessonLink::from),
            next: next.as_ref().map(LessonLink::from),
        },
        quiz,
        lesson,
    }))
}

/// Marks a lesson as completed for the caller and points to the next one.
pub async fn complete_lesson(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let lesson = find_lesson(&pool, lesson_id).await?;
    require_enrollment(&pool, user_id, lesson.course_id).await?;

    let mut tx = pool.begin().await?;

    // Re-read inside the transaction so the update starts from the latest set.
    let mut enrollment = require_enrollment(&mut *tx, user_id, lesson.course_id).await?;
    let newly_completed = mark_completed(&mut enrollment, lesson.id);

    if newly_completed {
        save_completed_lessons(&mut tx, &enrollment).await.map_err(|e| {
            tracing::error!(user_id, lesson_id, "Failed to save lesson completion: {:?}", e);
            e
        })?;
        log_activity(
            &mut tx,
            user_id,
            &format!("Completed lesson '{}'", lesson.title),
            Some(Target::Lesson(lesson.id)),
        )
        .await;
    }

    let lesson_ids = course_lesson_ids(&mut *tx, lesson.course_id).await?;
    let progress = progress_percent(&enrollment, &lesson_ids);
    let next = next_lesson(&mut *tx, lesson.course_id, lesson.order).await?;
    let course_completed = progress == 100;

    if newly_completed && next.is_none() && course_completed {
        let course = find_course(&mut *tx, lesson.course_id).await?;
        log_activity(
            &mut tx,
            user_id,
            &format!("Finished course '{}'", course.title),
            Some(Target::Course(course.id)),
        )
        .await;
    }

    tx.commit().await.map_err(|e| {
        tracing::error!(user_id, lesson_id, "Failed to commit lesson completion: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(CompleteLessonResponse {
        lesson_id: lesson.id,
        newly_completed,
        progress,
        next_lesson: next.as_ref().map(LessonLink::from),
        course_completed,
    }))
}

/// Certificate eligibility: every lesson of the course completed.
pub async fn certificate_status(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let course = find_course(&pool, course_id).await?;
    let enrollment = require_enrollment(&pool, user_id, course_id).await?;
    let lesson_ids = course_lesson_ids(&pool, course_id).await?;

    Ok(Json(CertificateResponse {
        course_id: course.id,
        course_title: course.title,
        progress: progress_percent(&enrollment, &lesson_ids),
        eligible: is_certificate_eligible(&enrollment, &lesson_ids),
    }))
}
