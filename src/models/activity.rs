// src/models/activity.rs

use serde::Serialize;
use sqlx::FromRow;

/// Represents the 'activity_logs' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The entity an activity entry is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Course(i64),
    Lesson(i64),
    Quiz(i64),
    Sale(i64),
    Commission(i64),
}

impl Target {
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Course(_) => "Course",
            Target::Lesson(_) => "Lesson",
            Target::Quiz(_) => "Quiz",
            Target::Sale(_) => "Sale",
            Target::Commission(_) => "Commission",
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            Target::Course(id)
            | Target::Lesson(id)
            | Target::Quiz(id)
            | Target::Sale(id)
            | Target::Commission(id) => id,
        }
    }
}

/// Query params for the admin activity feed.
#[derive(Debug, serde::Deserialize)]
pub struct ActivityListParams {
    pub limit: Option<i64>,
}
