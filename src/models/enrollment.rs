// src/models/enrollment.rs

use std::collections::BTreeSet;

use serde::Serialize;
use sqlx::FromRow;

/// Represents the 'enrollments' table in the database.
/// One row per (user, course) pair.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,

    /// Completed lesson ids at rest, e.g. "1,5,12".
    /// Use [`Enrollment::completed`] to read it as a set.
    #[serde(skip)]
    pub completed_lessons: String,

    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}

impl Enrollment {
    pub fn completed(&self) -> CompletedLessons {
        CompletedLessons::parse(&self.completed_lessons)
    }
}

/// The set of lesson ids an enrollment has completed.
///
/// Parsing never fails: entries that are not integers are dropped and the
/// set is flagged as malformed, which makes [`CompletedLessons::valid_count`]
/// report zero until the next insert rewrites the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedLessons {
    ids: BTreeSet<i64>,
    malformed: bool,
}

impl CompletedLessons {
    pub fn parse(raw: &str) -> Self {
        let mut set = Self::default();
        for entry in raw.split(',').filter(|e| !e.is_empty()) {
            match entry.parse::<i64>() {
                Ok(id) => {
                    set.ids.insert(id);
                }
                Err(_) => set.malformed = true,
            }
        }
        set
    }

    pub fn contains(&self, lesson_id: i64) -> bool {
        self.ids.contains(&lesson_id)
    }

    /// Adds a lesson id. Returns `false` when it was already present.
    /// A successful insert also clears the malformed flag, since the
    /// serialized form only ever holds valid ids.
    pub fn insert(&mut self, lesson_id: i64) -> bool {
        if !self.ids.insert(lesson_id) {
            return false;
        }
        self.malformed = false;
        true
    }

    pub fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// Number of completed ids that belong to `course_lesson_ids`,
    /// or zero when the stored value was malformed.
    pub fn valid_count(&self, course_lesson_ids: &[i64]) -> usize {
        if self.malformed {
            return 0;
        }
        course_lesson_ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|id| self.ids.contains(id))
            .count()
    }

    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().copied()
    }

    /// Ascending, comma-delimited.
    pub fn serialize(&self) -> String {
        self.ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}
