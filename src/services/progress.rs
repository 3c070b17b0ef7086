// src/services/progress.rs

//! Completion state of an enrollment.
//!
//! A lesson moves from not-completed to completed exactly once; nothing
//! ever removes an id from the completed set.

use sqlx::{SqliteConnection, SqliteExecutor};

use crate::{error::AppError, models::enrollment::Enrollment};

/// True iff `lesson_id` is in the enrollment's completed set.
pub fn is_completed(enrollment: &Enrollment, lesson_id: i64) -> bool {
    enrollment.completed().contains(lesson_id)
}

/// Adds `lesson_id` to the completed set and rewrites the stored value in
/// ascending order. Returns `false` (and leaves the enrollment untouched)
/// when the lesson was already completed.
pub fn mark_completed(enrollment: &mut Enrollment, lesson_id: i64) -> bool {
    let mut completed = enrollment.completed();
    if completed.is_malformed() {
        tracing::warn!(
            enrollment_id = enrollment.id,
            raw = %enrollment.completed_lessons,
            "Completed lessons are malformed; dropping unreadable entries"
        );
    }
    if !completed.insert(lesson_id) {
        return false;
    }
    enrollment.completed_lessons = completed.serialize();
    true
}

/// Percentage of the course's lessons that are completed, rounded half up.
/// A course without lessons is 0% complete.
pub fn progress_percent(enrollment: &Enrollment, course_lesson_ids: &[i64]) -> u8 {
    let total = {
        let mut ids = course_lesson_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    };
    if total == 0 {
        return 0;
    }

    let done = enrollment.completed().valid_count(course_lesson_ids);
    let percent = (100 * done + total / 2) / total;
    percent.min(100) as u8
}

/// A course is certifiable once every lesson is completed.
pub fn is_certificate_eligible(enrollment: &Enrollment, course_lesson_ids: &[i64]) -> bool {
    progress_percent(enrollment, course_lesson_ids) == 100
}

/// Ids of all lessons of a course, in lesson order.
pub async fn course_lesson_ids<'c>(
    db: impl SqliteExecutor<'c>,
    course_id: i64,
) -> Result<Vec<i64>, AppError> {
    let ids = sqlx::query_scalar("SELECT id FROM lessons WHERE course_id = $1 ORDER BY lesson_order")
        .bind(course_id)
        .fetch_all(db)
        .await?;
    Ok(ids)
}

/// Persists the completed set of an enrollment.
pub async fn save_completed_lessons(
    conn: &mut SqliteConnection,
    enrollment: &Enrollment,
) -> Result<(), AppError> {
    sqlx::query("UPDATE enrollments SET completed_lessons = $1 WHERE id = $2")
        .bind(&enrollment.completed_lessons)
        .bind(enrollment.id)
        .execute(conn)
        .await?;
    Ok(())
}
