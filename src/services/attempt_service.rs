use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Answer, Attempt, Exam},
    repositories::{AnswerRepository, AttemptRepository, ExamRepository},
    services::scoring,
};

/// Owns the lifecycle of one exam attempt for one student: creation-or-resume,
/// answer recording, and the single idempotent submit.
pub struct AttemptService {
    exams: Arc<dyn ExamRepository>,
    attempts: Arc<dyn AttemptRepository>,
    answers: Arc<dyn AnswerRepository>,
}

impl AttemptService {
    pub fn new(
        exams: Arc<dyn ExamRepository>,
        attempts: Arc<dyn AttemptRepository>,
        answers: Arc<dyn AnswerRepository>,
    ) -> Self {
        Self {
            exams,
            attempts,
            answers,
        }
    }

    pub async fn get_exam(&self, exam_id: &str) -> AppResult<Exam> {
        let exam = self
            .exams
            .find_by_id(exam_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Exam with id '{}' not found", exam_id)))?;

        Ok(exam)
    }

    /// Resumes the student's open attempt for the exam, or starts a new one.
    ///
    /// Idempotent under concurrent duplicate calls: the insert collides with
    /// the partial unique index on active attempts, and the loser re-fetches
    /// the attempt the winner created.
    pub async fn resume_or_start(&self, exam_id: &str, student_id: &str) -> AppResult<Attempt> {
        let exam = self.get_exam(exam_id).await?;
        if exam.questions.is_empty() {
            // A partial exam is never shown; block the page outright.
            return Err(AppError::ValidationError(format!(
                "Exam '{}' has no questions",
                exam_id
            )));
        }

        if let Some(existing) = self.attempts.find_active(student_id, exam_id).await? {
            log::info!(
                "resuming attempt {} for student {} on exam {}",
                existing.id,
                student_id,
                exam_id
            );
            return Ok(existing);
        }

        let attempt = Attempt::start(&exam, student_id);
        match self.attempts.create(attempt).await {
            Ok(created) => {
                log::info!(
                    "started attempt {} for student {} on exam {}, deadline {}",
                    created.id,
                    student_id,
                    exam_id,
                    created.deadline
                );
                Ok(created)
            }
            Err(AppError::AlreadyExists(_)) => {
                // Lost the race to another tab; its attempt is the attempt.
                self.attempts
                    .find_active(student_id, exam_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::InternalError(format!(
                            "Active attempt for student '{}' on exam '{}' vanished during \
                             concurrent start",
                            student_id, exam_id
                        ))
                    })
            }
            Err(err) => Err(err),
        }
    }

    /// The attempt's fixed deadline. Derived once at creation from start time
    /// and exam duration; reads here never recompute it from "now", so a page
    /// reload cannot drift the deadline.
    pub fn compute_deadline(attempt: &Attempt) -> DateTime<Utc> {
        attempt.deadline
    }

    pub async fn saved_answers(&self, attempt_id: &str) -> AppResult<Vec<Answer>> {
        self.answers.find_by_attempt(attempt_id).await
    }

    /// The student's own attempt. An attempt belonging to another student
    /// reads as absent rather than confirming it exists.
    pub async fn owned_attempt(&self, attempt_id: &str, student_id: &str) -> AppResult<Attempt> {
        let attempt = self.attempts.find_by_id(attempt_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id))
        })?;

        if attempt.student_id != student_id {
            log::warn!(
                "student {} referenced attempt {} belonging to another student",
                student_id,
                attempt_id
            );
            return Err(AppError::NotFound(format!(
                "Attempt with id '{}' not found",
                attempt_id
            )));
        }

        Ok(attempt)
    }

    /// Upserts one answer on the student's own attempt. A write against an
    /// already-submitted attempt is a logged no-op rather than an error, so
    /// a stale autosave arriving after submission is simply ignored.
    pub async fn record_answer(
        &self,
        attempt_id: &str,
        student_id: &str,
        question_id: &str,
        value: &str,
    ) -> AppResult<()> {
        let attempt = self.owned_attempt(attempt_id, student_id).await?;

        if attempt.submitted {
            log::warn!(
                "dropping answer for question {} on attempt {}: already submitted",
                question_id,
                attempt_id
            );
            return Ok(());
        }

        let exam = self.get_exam(&attempt.exam_id).await?;
        if exam.question(question_id).is_none() {
            return Err(AppError::ValidationError(format!(
                "Question '{}' does not belong to exam '{}'",
                question_id, exam.id
            )));
        }

        self.answers
            .upsert(Answer::new(attempt_id, question_id, value))
            .await?;
        Ok(())
    }

    /// Finalizes the student's own attempt exactly once. A second call
    /// returns the stored result without rescoring; a concurrent submit that
    /// loses the conditional update reads the winner's result back. Storage
    /// errors surface to the caller so the client can retry.
    pub async fn submit(&self, attempt_id: &str, student_id: &str) -> AppResult<Attempt> {
        let attempt = self.owned_attempt(attempt_id, student_id).await?;

        if attempt.submitted {
            log::debug!("attempt {} already submitted, returning stored result", attempt_id);
            return Ok(attempt);
        }

        let exam = self.get_exam(&attempt.exam_id).await?;
        let answers = self.answers.find_by_attempt(attempt_id).await?;
        let score = scoring::score_answers(&exam.questions, &answers);
        let ended_at = Utc::now();

        if !self.attempts.finalize(attempt_id, ended_at, score).await? {
            // Another submitter won the conditional update; its score is the
            // authoritative one.
            return self.attempts.find_by_id(attempt_id).await?.ok_or_else(|| {
                AppError::InternalError(format!(
                    "Attempt '{}' vanished during concurrent submit",
                    attempt_id
                ))
            });
        }

        log::info!(
            "attempt {} submitted with score {}/{}",
            attempt_id,
            score,
            exam.total_marks
        );

        Ok(Attempt {
            submitted: true,
            ended_at: Some(ended_at),
            score: Some(score),
            modified_at: Some(ended_at),
            ..attempt
        })
    }
}
