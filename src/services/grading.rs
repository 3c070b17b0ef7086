// src/services/grading.rs

//! Quiz scoring.
//!
//! Answers carry the *text* of the selected option rather than its index,
//! because the client may shuffle options before display. Two options with
//! identical text are therefore indistinguishable to the grader.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::quiz::QuestionBank;

/// Minimum passing score regardless of quiz length.
///
/// Together with the 90% rule this assumes ~20-question quizzes; a quiz
/// with fewer than 18 questions can never be passed.
pub const PASS_SCORE_FLOOR: usize = 18;

/// Outcome of grading one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeReport {
    pub score: usize,
    pub total: usize,
    pub required: usize,
    pub passed: bool,
}

/// `max(18, floor(total * 0.9))`.
pub fn required_score(total: usize) -> usize {
    PASS_SCORE_FLOOR.max(total * 9 / 10)
}

/// Scores `answers` (keyed by question position) against `bank`.
///
/// Unanswered or blank answers earn nothing; malformed questions are
/// skipped but still count towards the total.
pub fn grade(bank: &QuestionBank, answers: &HashMap<usize, String>) -> GradeReport {
    let score = bank
        .entries()
        .enumerate()
        .filter(|(position, question)| {
            let Some(correct) = question.and_then(|q| q.correct_option()) else {
                return false;
            };
            let Some(submitted) = answers.get(position).map(|a| a.trim()) else {
                return false;
            };
            !submitted.is_empty() && submitted == correct.trim()
        })
        .count();

    let total = bank.len();
    let required = required_score(total);

    GradeReport {
        score,
        total,
        required,
        passed: score >= required,
    }
}
