use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{Answer, Attempt, Exam, Question, QuestionKind, QuestionOption};

/// Student-facing view of an exam. Correct-answer flags are stripped so the
/// answer key never leaves the server while an attempt is open.
#[derive(Debug, Clone, Serialize)]
pub struct ExamDto {
    pub id: String,
    pub title: String,
    pub duration_minutes: i64,
    pub total_marks: i16,
    pub pass_mark: i16,
    pub questions: Vec<QuestionDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionDto {
    pub id: String,
    pub order: i16,
    pub prompt: String,
    pub kind: QuestionKind,
    pub options: Vec<QuestionOptionDto>,
    pub marks: i16,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionOptionDto {
    pub id: String,
    pub text: String,
}

impl From<Exam> for ExamDto {
    fn from(exam: Exam) -> Self {
        ExamDto {
            id: exam.id,
            title: exam.title,
            duration_minutes: exam.duration_minutes,
            total_marks: exam.total_marks,
            pass_mark: exam.pass_mark,
            questions: exam.questions.into_iter().map(QuestionDto::from).collect(),
        }
    }
}

impl From<Question> for QuestionDto {
    fn from(question: Question) -> Self {
        QuestionDto {
            id: question.id,
            order: question.order,
            prompt: question.prompt,
            kind: question.kind,
            options: question
                .options
                .into_iter()
                .map(QuestionOptionDto::from)
                .collect(),
            marks: question.marks,
        }
    }
}

impl From<QuestionOption> for QuestionOptionDto {
    fn from(option: QuestionOption) -> Self {
        QuestionOptionDto {
            id: option.id,
            text: option.text,
        }
    }
}

/// Response to resume-or-start: everything the exam page needs to render,
/// including previously saved answers so a reload lands where it left off.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptDto {
    pub attempt_id: String,
    pub exam_id: String,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub remaining_seconds: i64,
    pub submitted: bool,
    pub answers: Vec<SavedAnswerDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedAnswerDto {
    pub question_id: String,
    pub value: String,
}

impl AttemptDto {
    pub fn from_parts(attempt: &Attempt, answers: Vec<Answer>, remaining_seconds: i64) -> Self {
        AttemptDto {
            attempt_id: attempt.id.clone(),
            exam_id: attempt.exam_id.clone(),
            started_at: attempt.started_at,
            deadline: attempt.deadline,
            remaining_seconds,
            submitted: attempt.submitted,
            answers: answers
                .into_iter()
                .map(|a| SavedAnswerDto {
                    question_id: a.question_id,
                    value: a.value,
                })
                .collect(),
        }
    }
}

/// Finalized outcome of a submitted attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ResultDto {
    pub attempt_id: String,
    pub score: i16,
    pub submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl From<Attempt> for ResultDto {
    fn from(attempt: Attempt) -> Self {
        ResultDto {
            attempt_id: attempt.id,
            score: attempt.score.unwrap_or(0),
            submitted: attempt.submitted,
            ended_at: attempt.ended_at,
        }
    }
}
