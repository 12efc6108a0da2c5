use std::collections::HashMap;

use crate::models::domain::{Answer, Question, QuestionKind};

/// Total score for a finished answer set: the sum of `marks` over every
/// multiple-choice question whose saved value is its correct option id.
///
/// Pure and deterministic. Answer ordering and repeated calls do not change
/// the result. Free-text questions score zero here; they are graded manually
/// downstream.
pub fn score_answers(questions: &[Question], answers: &[Answer]) -> i16 {
    let answered: HashMap<&str, &str> = answers
        .iter()
        .map(|a| (a.question_id.as_str(), a.value.as_str()))
        .collect();

    questions
        .iter()
        .map(|q| score_question(q, answered.get(q.id.as_str()).copied()))
        .sum()
}

fn score_question(question: &Question, value: Option<&str>) -> i16 {
    match question.kind {
        QuestionKind::FreeText => 0,
        QuestionKind::MultipleChoice => match (question.correct_option_id(), value) {
            (Some(correct), Some(selected)) if correct == selected => question.marks,
            _ => 0,
        },
    }
}
