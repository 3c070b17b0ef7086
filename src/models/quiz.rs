// src/models/quiz.rs

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::course::LessonLink;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,

    /// Owning lesson. At most one quiz per lesson.
    pub lesson_id: i64,

    pub title: String,

    /// Question bank as a JSON array, see [`QuestionBank`].
    #[serde(skip_serializing)]
    pub questions: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question", alias = "prompt", default)]
    pub prompt: String,

    pub options: Vec<String>,

    /// Zero-based index into `options`.
    pub correct_index: usize,
}

impl Question {
    /// Text of the correct option, if the question is well-formed.
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }

    /// Reads a stored entry field by field. Non-string options other than
    /// the correct one are kept as their JSON text.
    fn from_lenient(item: &serde_json::Value) -> Option<Self> {
        let options = item.get("options")?.as_array()?;
        let correct_index = usize::try_from(item.get("correct_index")?.as_u64()?).ok()?;
        options.get(correct_index)?.as_str()?;

        let prompt = item
            .get("question")
            .or_else(|| item.get("prompt"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();

        let options = options
            .iter()
            .map(|o| match o {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect();

        Some(Self {
            prompt,
            options,
            correct_index,
        })
    }
}

fn parse_array(raw: &str) -> Result<Vec<serde_json::Value>, QuestionBankError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(QuestionBankError::Syntax)?;
    match value {
        serde_json::Value::Array(items) => Ok(items),
        _ => Err(QuestionBankError::NotAnArray),
    }
}

/// Error raised when a stored or submitted question bank cannot be read.
#[derive(Debug)]
pub enum QuestionBankError {
    /// Not valid JSON at all.
    Syntax(serde_json::Error),
    /// Valid JSON, but not an array of questions.
    NotAnArray,
    /// An array without any question.
    Empty,
    /// Entry at this position is not a usable question.
    InvalidQuestion(usize),
}

impl fmt::Display for QuestionBankError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionBankError::Syntax(e) => write!(f, "Questions are not valid JSON: {}", e),
            QuestionBankError::NotAnArray => write!(f, "Questions must be a JSON array"),
            QuestionBankError::Empty => write!(f, "A quiz needs at least one question"),
            QuestionBankError::InvalidQuestion(i) => write!(
                f,
                "Question {} must have a non-empty 'question', non-empty 'options' and an in-range 'correct_index'",
                i + 1
            ),
        }
    }
}

impl std::error::Error for QuestionBankError {}

/// Ordered question bank of a quiz.
///
/// Each position holds `Some(question)` when the entry is well-formed
/// (options present, `correct_index` in range) and `None` otherwise.
/// Malformed entries still count towards the total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    entries: Vec<Option<Question>>,
}

impl QuestionBank {
    /// Lenient parse used at grading time: only the outer structure must be valid.
    ///
    /// An entry is usable when it has an `options` array and an in-range
    /// `correct_index` pointing at a string option. The prompt and the
    /// other options are not needed to score it.
    pub fn parse(raw: &str) -> Result<Self, QuestionBankError> {
        let items = parse_array(raw)?;
        let entries = items.iter().map(Question::from_lenient).collect();
        Ok(Self { entries })
    }

    /// Strict parse used when an admin saves a quiz: every entry must be a
    /// complete question with a prompt and string options.
    pub fn parse_strict(raw: &str) -> Result<Self, QuestionBankError> {
        let items = parse_array(raw)?;
        if items.is_empty() {
            return Err(QuestionBankError::Empty);
        }

        let mut entries = Vec::with_capacity(items.len());
        for (pos, item) in items.into_iter().enumerate() {
            let question = serde_json::from_value::<Question>(item)
                .ok()
                .filter(|q| !q.prompt.trim().is_empty() && q.correct_option().is_some())
                .ok_or(QuestionBankError::InvalidQuestion(pos))?;
            entries.push(Some(question));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Questions in order; `None` marks a malformed entry.
    pub fn entries(&self) -> impl Iterator<Item = Option<&Question>> {
        self.entries.iter().map(Option::as_ref)
    }

    /// Questions as shown to a learner, without the answer key.
    pub fn public_questions(&self) -> Vec<PublicQuestion> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                entry.as_ref().map(|q| PublicQuestion {
                    index,
                    question: q.prompt.clone(),
                    options: q.options.clone(),
                })
            })
            .collect()
    }
}

/// DTO for sending a question to the client (excludes the correct index).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    /// Position in the bank; answers are keyed by it.
    pub index: usize,
    pub question: String,
    pub options: Vec<String>,
}

/// Quiz as embedded in a lesson view.
#[derive(Debug, Serialize)]
pub struct PublicQuiz {
    pub id: i64,
    pub title: String,
    pub questions: Vec<PublicQuestion>,
}

/// Represents the 'quiz_attempts' table. Append-only.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub attempted_at: chrono::DateTime<chrono::Utc>,
}

impl QuizAttempt {
    /// Score as a rounded percentage, 0 for an empty quiz.
    pub fn percentage(&self) -> i64 {
        if self.total_questions <= 0 {
            return 0;
        }
        (100 * self.score + self.total_questions / 2) / self.total_questions
    }
}

/// Attempt row for the "my attempts" listing.
#[derive(Debug, Serialize)]
pub struct AttemptSummary {
    #[serde(flatten)]
    pub attempt: QuizAttempt,
    pub percentage: i64,
}

/// DTO for submitting a quiz.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    /// Key: question position in the bank.
    /// Value: text of the option the learner picked.
    #[serde(default)]
    pub answers: HashMap<usize, String>,
}

/// Result returned after grading a submission.
#[derive(Debug, Serialize)]
pub struct QuizSubmissionResponse {
    pub attempt_id: i64,
    pub score: usize,
    pub total_questions: usize,
    pub required_score: usize,
    pub passed: bool,
    pub lesson_completed: bool,
    pub progress: u8,
    pub next_lesson: Option<LessonLink>,
    pub message: String,
}

/// DTO for creating or replacing a quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct QuizRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    /// Raw JSON array of questions.
    #[validate(length(min = 2, max = 200000))]
    pub questions_json: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_invalid_json() {
        assert!(matches!(
            QuestionBank::parse("[{"),
            Err(QuestionBankError::Syntax(_))
        ));
    }

    #[test]
    fn parse_rejects_non_array() {
        assert!(matches!(
            QuestionBank::parse(r#"{"question": "x"}"#),
            Err(QuestionBankError::NotAnArray)
        ));
    }

    #[test]
    fn parse_keeps_malformed_entries_as_none() {
        let raw = r#"[
            {"question": "2+2?", "options": ["3", "4"], "correct_index": 1},
            {"question": "no options", "correct_index": 0},
            {"question": "out of range", "options": ["a"], "correct_index": 3},
            {"question": "negative", "options": ["a"], "correct_index": -1},
            "not even an object"
        ]"#;
        let bank = QuestionBank::parse(raw).unwrap();
        assert_eq!(bank.len(), 5);
        let valid: Vec<bool> = bank.entries().map(|e| e.is_some()).collect();
        assert_eq!(valid, vec![true, false, false, false, false]);
    }

    #[test]
    fn parse_accepts_prompt_alias() {
        let bank =
            QuestionBank::parse(r#"[{"prompt": "Capital?", "options": ["Ankara"], "correct_index": 0}]"#)
                .unwrap();
        let q = bank.entries().next().flatten().unwrap();
        assert_eq!(q.prompt, "Capital?");
        assert_eq!(q.correct_option(), Some("Ankara"));
    }

    #[test]
    fn strict_parse_reports_first_bad_position() {
        let raw = r#"[
            {"question": "ok", "options": ["a"], "correct_index": 0},
            {"question": "bad", "options": [], "correct_index": 0}
        ]"#;
        let err = QuestionBank::parse_strict(raw).unwrap_err();
        assert!(matches!(err, QuestionBankError::InvalidQuestion(1)));
        assert!(err.to_string().starts_with("Question 2"));
    }

    #[test]
    fn strict_parse_requires_prompt_and_string_options() {
        let promptless = r#"[{"options": ["a", "b"], "correct_index": 1}]"#;
        assert!(QuestionBank::parse(promptless).unwrap().entries().next().flatten().is_some());
        assert!(matches!(
            QuestionBank::parse_strict(promptless),
            Err(QuestionBankError::InvalidQuestion(0))
        ));

        let mixed = r#"[{"question": "q", "options": ["a", 2], "correct_index": 0}]"#;
        let lenient = QuestionBank::parse(mixed).unwrap();
        let q = lenient.entries().next().flatten().unwrap();
        assert_eq!(q.options, vec!["a".to_string(), "2".to_string()]);
        assert!(matches!(
            QuestionBank::parse_strict(mixed),
            Err(QuestionBankError::InvalidQuestion(0))
        ));
    }

    #[test]
    fn strict_parse_rejects_empty_bank() {
        assert!(matches!(
            QuestionBank::parse_strict("[]"),
            Err(QuestionBankError::Empty)
        ));
        assert!(QuestionBank::parse("[]").unwrap().is_empty());
    }

    #[test]
    fn public_questions_hide_answer_key() {
        let bank =
            QuestionBank::parse(r#"[{"question": "q", "options": ["a", "b"], "correct_index": 1}]"#)
                .unwrap();
        let public = serde_json::to_value(bank.public_questions()).unwrap();
        assert_eq!(public[0]["index"], 0);
        assert!(public[0].get("correct_index").is_none());
    }

    #[test]
    fn attempt_percentage_rounds_and_handles_empty() {
        let mut attempt = QuizAttempt {
            id: 1,
            user_id: 1,
            quiz_id: 1,
            score: 1,
            total_questions: 3,
            attempted_at: chrono::Utc::now(),
        };
        assert_eq!(attempt.percentage(), 33);
        attempt.score = 2;
        assert_eq!(attempt.percentage(), 67);
        attempt.total_questions = 0;
        assert_eq!(attempt.percentage(), 0);
    }
}
