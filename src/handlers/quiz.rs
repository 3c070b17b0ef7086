// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        activity::Target,
        course::LessonLink,
        quiz::{
            AttemptSummary, QuestionBank, Quiz, QuizAttempt, QuizSubmissionResponse,
            SubmitQuizRequest,
        },
    },
    services::{
        activity::log_activity,
        grading::grade,
        navigation::{find_lesson, next_lesson, require_enrollment},
        progress::{course_lesson_ids, mark_completed, progress_percent, save_completed_lessons},
    },
    utils::jwt::Claims,
};

/// Grades a quiz submission.
///
/// * Answers are keyed by question position and carry the option text.
/// * Every graded submission is stored as a new attempt.
/// * Passing completes the quiz's lesson, exactly like `complete_lesson`.
/// * An unreadable question bank fails with 422 and records nothing.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let quiz = sqlx::query_as::<_, Quiz>(
        "SELECT id, lesson_id, title, questions, created_at, updated_at FROM quizzes WHERE id = $1",
    )
    .bind(quiz_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let lesson = find_lesson(&pool, quiz.lesson_id).await?;
    require_enrollment(&pool, user_id, lesson.course_id).await?;

    let bank = QuestionBank::parse(&quiz.questions).map_err(|e| {
        tracing::warn!(quiz_id, "Stored question bank is unreadable: {}", e);
        AppError::QuizUnavailable { lesson_id: lesson.id }
    })?;

    let report = grade(&bank, &req.answers);

    let mut tx = pool.begin().await?;

    let attempt_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO quiz_attempts (user_id, quiz_id, score, total_questions)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(quiz.id)
    .bind(report.score as i64)
    .bind(report.total as i64)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(user_id, quiz_id, "Failed to record quiz attempt: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    log_activity(
        &mut tx,
        user_id,
        &format!(
            "Took quiz '{}': {}/{} ({})",
            quiz.title,
            report.score,
            report.total,
            if report.passed { "passed" } else { "failed" }
        ),
        Some(Target::Quiz(quiz.id)),
    )
    .await;

    let mut enrollment = require_enrollment(&mut *tx, user_id, lesson.course_id).await?;
    let lesson_completed = report.passed && mark_completed(&mut enrollment, lesson.id);
    if lesson_completed {
        save_completed_lessons(&mut tx, &enrollment).await?;
        log_activity(
            &mut tx,
            user_id,
            &format!("Completed lesson '{}'", lesson.title),
            Some(Target::Lesson(lesson.id)),
        )
        .await;
    }

    let lesson_ids = course_lesson_ids(&mut *tx, lesson.course_id).await?;
    let next = next_lesson(&mut *tx, lesson.course_id, lesson.order).await?;

    tx.commit().await.map_err(|e| {
        tracing::error!(user_id, quiz_id, "Failed to commit quiz submission: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(
        user_id,
        quiz_id,
        score = report.score,
        total = report.total,
        passed = report.passed,
        "Quiz graded"
    );

    let message = if report.passed {
        format!("Passed with {}/{}.", report.score, report.total)
    } else {
        format!(
            "Scored {}/{}; {} correct answers are needed to pass.",
            report.score, report.total, report.required
        )
    };

    Ok(Json(QuizSubmissionResponse {
        attempt_id,
        score: report.score,
        total_questions: report.total,
        required_score: report.required,
        passed: report.passed,
        lesson_completed,
        progress: progress_percent(&enrollment, &lesson_ids),
        next_lesson: next.as_ref().map(LessonLink::from),
        message,
    }))
}

/// The caller's quiz attempts, newest first.
pub async fn my_attempts(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let attempts = sqlx::query_as::<_, QuizAttempt>(
        r#"
        SELECT id, user_id, quiz_id, score, total_questions, attempted_at
        FROM quiz_attempts
        WHERE user_id = $1
        ORDER BY id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch quiz attempts: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let summaries: Vec<AttemptSummary> = attempts
        .into_iter()
        .map(|attempt| AttemptSummary {
            percentage: attempt.percentage(),
            attempt,
        })
        .collect();

    Ok(Json(summaries))
}
