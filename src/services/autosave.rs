use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration as StdDuration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::{errors::AppResult, services::attempt_service::AttemptService};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingAnswer {
    pub question_id: String,
    pub value: String,
}

/// Write-through buffer for the currently displayed question's answer.
///
/// Holds a single slot (the answer being edited), flushed on a fixed interval
/// and opportunistically on question navigation. Only the displayed question
/// is flushed per fire, which bounds payload size; the staleness window is
/// the flush interval, and an answer is only at risk if no flush succeeds
/// before the deadline.
pub struct AutosaveScheduler {
    service: Arc<AttemptService>,
    attempt_id: String,
    student_id: String,
    pending: Mutex<Option<PendingAnswer>>,
    handle: StdMutex<Option<JoinHandle<()>>>,
}

impl AutosaveScheduler {
    pub fn new(service: Arc<AttemptService>, attempt_id: String, student_id: String) -> Self {
        Self {
            service,
            attempt_id,
            student_id,
            pending: Mutex::new(None),
            handle: StdMutex::new(None),
        }
    }

    pub fn attempt_id(&self) -> &str {
        &self.attempt_id
    }

    /// Replaces the buffered answer with the latest edit.
    pub async fn stage(&self, question_id: &str, value: &str) {
        let mut pending = self.pending.lock().await;
        *pending = Some(PendingAnswer {
            question_id: question_id.to_string(),
            value: value.to_string(),
        });
    }

    /// Writes the buffered answer through to storage. The slot is cleared
    /// only after a successful write, and only if no newer edit replaced it
    /// mid-flight, so a failed flush keeps the answer queued for the next
    /// tick instead of losing it.
    pub async fn flush(&self) -> AppResult<()> {
        let staged = { self.pending.lock().await.clone() };
        let Some(answer) = staged else {
            return Ok(());
        };

        self.service
            .record_answer(
                &self.attempt_id,
                &self.student_id,
                &answer.question_id,
                &answer.value,
            )
            .await?;

        let mut pending = self.pending.lock().await;
        if pending.as_ref() == Some(&answer) {
            *pending = None;
        }
        Ok(())
    }

    /// Spawns the periodic flush. The task holds only a weak reference, so
    /// dropping the scheduler both aborts the task and lets it unwind if the
    /// abort loses a race with a tick.
    pub fn start(scheduler: &Arc<Self>, every: StdDuration) {
        let weak = Arc::downgrade(scheduler);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // The first interval tick fires immediately; skip it so a fresh
            // session does not flush an empty buffer.
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(scheduler) = weak.upgrade() else {
                    break;
                };
                if let Err(err) = scheduler.flush().await {
                    if err.is_transient() {
                        log::warn!(
                            "autosave for attempt {} failed, retrying next tick: {}",
                            scheduler.attempt_id,
                            err
                        );
                    } else {
                        log::error!(
                            "autosave for attempt {} rejected: {}",
                            scheduler.attempt_id,
                            err
                        );
                    }
                }
            }
        });

        if let Ok(mut handle) = scheduler.handle.lock() {
            if let Some(previous) = handle.replace(task) {
                previous.abort();
            }
        }
    }

    pub fn stop(&self) {
        if let Ok(mut handle) = self.handle.lock() {
            if let Some(task) = handle.take() {
                task.abort();
            }
        }
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockAnswerRepository, MockAttemptRepository, MockExamRepository};

    fn service_with_mocks(
        exams: MockExamRepository,
        attempts: MockAttemptRepository,
        answers: MockAnswerRepository,
    ) -> Arc<AttemptService> {
        Arc::new(AttemptService::new(
            Arc::new(exams),
            Arc::new(attempts),
            Arc::new(answers),
        ))
    }

    #[tokio::test]
    async fn stage_keeps_only_latest_edit() {
        let service = service_with_mocks(
            MockExamRepository::new(),
            MockAttemptRepository::new(),
            MockAnswerRepository::new(),
        );
        let scheduler = AutosaveScheduler::new(service, "attempt-1".to_string(), "student-1".to_string());

        scheduler.stage("q1", "first").await;
        scheduler.stage("q1", "second").await;

        let pending = scheduler.pending.lock().await;
        assert_eq!(
            *pending,
            Some(PendingAnswer {
                question_id: "q1".to_string(),
                value: "second".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn flush_with_empty_buffer_is_a_noop() {
        let mut attempts = MockAttemptRepository::new();
        attempts.expect_find_by_id().times(0);

        let service = service_with_mocks(
            MockExamRepository::new(),
            attempts,
            MockAnswerRepository::new(),
        );
        let scheduler = AutosaveScheduler::new(service, "attempt-1".to_string(), "student-1".to_string());

        assert!(scheduler.flush().await.is_ok());
    }

    #[tokio::test]
    async fn failed_flush_keeps_answer_staged_for_retry() {
        let mut attempts = MockAttemptRepository::new();
        attempts
            .expect_find_by_id()
            .returning(|_| Err(crate::errors::AppError::DatabaseError("down".to_string())));

        let service = service_with_mocks(
            MockExamRepository::new(),
            attempts,
            MockAnswerRepository::new(),
        );
        let scheduler = AutosaveScheduler::new(service, "attempt-1".to_string(), "student-1".to_string());

        scheduler.stage("q1", "opt-a").await;
        let result = scheduler.flush().await;

        assert!(result.is_err());
        assert!(scheduler.pending.lock().await.is_some());
    }
}
