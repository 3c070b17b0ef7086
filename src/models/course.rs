// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

/// Represents the 'courses' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,

    /// Unique course title.
    pub title: String,

    pub description: String,

    pub category: String,

    /// Free-form level label (e.g., "Beginner").
    pub difficulty: String,

    pub duration_hours: i64,

    pub cover_image: Option<String>,

    pub instructor_name: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// How a lesson is delivered. Stored as TEXT ('Video', 'Text', 'Quiz').
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum LessonType {
    Video,
    Text,
    Quiz,
}

/// Represents the 'lessons' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,

    pub course_id: i64,

    pub title: String,

    pub lesson_type: LessonType,

    pub content: Option<String>,

    pub video_url: Option<String>,

    /// 1-based position inside the course, unique per course.
    /// Mapped from the database column 'lesson_order' since `order` is a reserved SQL keyword.
    #[sqlx(rename = "lesson_order")]
    pub order: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Compact lesson reference used for navigation links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LessonLink {
    pub id: i64,
    pub title: String,
    pub order: i64,
}

impl From<&Lesson> for LessonLink {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title.clone(),
            order: lesson.order,
        }
    }
}

/// Per-user enrollment state attached to a course card.
#[derive(Debug, Serialize)]
pub struct EnrollmentStatus {
    pub is_enrolled: bool,
    pub progress: u8,
}

/// Course card for the academy listing.
#[derive(Debug, Serialize)]
pub struct CourseCard {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub difficulty: String,
    pub duration_hours: i64,
    pub cover_image: String,
    pub description: String,
    pub enrollment: EnrollmentStatus,
}

pub const DEFAULT_COVER_IMAGE: &str = "course_default.png";
const CARD_DESCRIPTION_CHARS: usize = 100;

impl CourseCard {
    pub fn new(course: Course, enrollment: EnrollmentStatus) -> Self {
        Self {
            id: course.id,
            title: course.title,
            category: course.category,
            difficulty: course.difficulty,
            duration_hours: course.duration_hours,
            cover_image: course
                .cover_image
                .unwrap_or_else(|| DEFAULT_COVER_IMAGE.to_string()),
            description: excerpt(&course.description, CARD_DESCRIPTION_CHARS),
            enrollment,
        }
    }
}

/// Cuts `text` to `max_chars` characters, marking the cut with "...".
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Course detail with the caller's progress.
#[derive(Debug, Serialize)]
pub struct CourseDetailResponse {
    pub course: Course,
    pub lessons: Vec<Lesson>,
    pub is_enrolled: bool,
    pub completed_lesson_ids: Vec<i64>,
    pub progress: u8,
}

/// Previous/next links around a lesson.
#[derive(Debug, Serialize)]
pub struct LessonNavigation {
    pub prev: Option<LessonLink>,
    pub next: Option<LessonLink>,
}

/// Lesson page for an enrolled user.
#[derive(Debug, Serialize)]
pub struct LessonViewResponse {
    pub lesson: Lesson,
    pub is_completed: bool,
    pub progress: u8,
    pub navigation: LessonNavigation,
    pub quiz: Option<crate::models::quiz::PublicQuiz>,
}

/// Result of marking a lesson as completed.
#[derive(Debug, Serialize)]
pub struct CompleteLessonResponse {
    pub lesson_id: i64,
    /// False when the lesson had already been completed.
    pub newly_completed: bool,
    pub progress: u8,
    pub next_lesson: Option<LessonLink>,
    pub course_completed: bool,
}

/// Certificate eligibility for a course.
#[derive(Debug, Serialize)]
pub struct CertificateResponse {
    pub course_id: i64,
    pub course_title: String,
    pub progress: u8,
    pub eligible: bool,
}

/// DTO for creating a new course.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    #[validate(length(min = 1, max = 20000))]
    pub description: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(min = 1, max = 20))]
    pub difficulty: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub duration_hours: Option<i64>,
    #[validate(length(max = 100))]
    pub cover_image: Option<String>,
    #[validate(length(max = 100))]
    pub instructor_name: Option<String>,
}

/// DTO for adding a lesson to a course.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    pub lesson_type: Option<LessonType>,
    pub content: Option<String>,
    #[validate(length(max = 255), custom(function = validate_video_url))]
    pub video_url: Option<String>,
    #[validate(range(min = 1))]
    pub order: i64,
}

fn validate_video_url(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_keeps_short_text() {
        assert_eq!(excerpt("Rust basics", 100), "Rust basics");
    }

    #[test]
    fn excerpt_cuts_on_char_boundary() {
        let text = "ğ".repeat(120);
        let cut = excerpt(&text, 100);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 103);
    }

    #[test]
    fn lesson_request_rejects_zero_order_and_bad_url() {
        let req = CreateLessonRequest {
            title: "Intro".to_string(),
            lesson_type: None,
            content: None,
            video_url: Some("not a url".to_string()),
            order: 0,
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("order"));
        assert!(fields.contains_key("video_url"));
    }
}
