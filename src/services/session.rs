use std::collections::HashMap;
use std::future::{ready, Future};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::sync::RwLock;

use crate::{
    errors::AppResult,
    models::domain::Attempt,
    services::{
        attempt_service::AttemptService,
        autosave::AutosaveScheduler,
        countdown::{CountdownController, CountdownState},
    },
};

/// One open attempt's pair of timers, acquired and released together.
///
/// The countdown watchdog and the autosave flush are registered when the
/// session opens and cancelled on every exit path: explicit close, registry
/// replacement, deadline expiry, or drop. Neither timer can outlive the
/// session and fire against an attempt the student has left.
pub struct ExamSession {
    attempt_id: String,
    countdown: CountdownController,
    autosave: Arc<AutosaveScheduler>,
}

impl ExamSession {
    pub fn open(
        service: Arc<AttemptService>,
        attempt: &Attempt,
        tick: StdDuration,
        autosave_every: StdDuration,
    ) -> Self {
        Self::open_with(service, attempt, tick, autosave_every, ready(()))
    }

    /// `on_expired` runs after the deadline auto-submit, once the autosave
    /// has been stopped. The registry uses it to release its map entry.
    fn open_with<F>(
        service: Arc<AttemptService>,
        attempt: &Attempt,
        tick: StdDuration,
        autosave_every: StdDuration,
        on_expired: F,
    ) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let autosave = Arc::new(AutosaveScheduler::new(
            Arc::clone(&service),
            attempt.id.clone(),
            attempt.student_id.clone(),
        ));
        AutosaveScheduler::start(&autosave, autosave_every);

        let countdown = CountdownController::new();
        let attempt_id = attempt.id.clone();
        let student_id = attempt.student_id.clone();
        let expired_autosave = Arc::downgrade(&autosave);
        countdown.start(attempt.deadline, tick, attempt.id.clone(), async move {
            if let Err(err) = service.submit(&attempt_id, &student_id).await {
                // Submission idempotence makes a later manual retry safe;
                // nothing more the timer can do.
                log::error!("auto-submit for attempt {} failed: {}", attempt_id, err);
            }
            if let Some(autosave) = expired_autosave.upgrade() {
                autosave.stop();
            }
            on_expired.await;
        });

        Self {
            attempt_id: attempt.id.clone(),
            countdown,
            autosave,
        }
    }

    pub fn attempt_id(&self) -> &str {
        &self.attempt_id
    }

    pub fn countdown_state(&self) -> CountdownState {
        self.countdown.state()
    }

    /// Buffers the latest edit for the displayed question.
    pub async fn stage_answer(&self, question_id: &str, value: &str) {
        self.autosave.stage(question_id, value).await;
    }

    /// Opportunistic flush on question navigation.
    pub async fn flush_answers(&self) -> AppResult<()> {
        self.autosave.flush().await
    }

    /// Cancels both timers. Idempotent.
    pub fn close(&self) {
        self.countdown.stop();
        self.autosave.stop();
    }
}

impl Drop for ExamSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Live sessions keyed by attempt id. Opening is idempotent per attempt:
/// a reload reuses the running session rather than stacking a second pair
/// of timers; a finished session is replaced. Deadline expiry releases the
/// entry itself, so an auto-submitted attempt does not pin its session in
/// the map for the life of the server.
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<ExamSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn open(
        &self,
        service: Arc<AttemptService>,
        attempt: &Attempt,
        tick: StdDuration,
        autosave_every: StdDuration,
    ) -> Arc<ExamSession> {
        let mut sessions = self.sessions.write().await;

        if let Some(existing) = sessions.get(&attempt.id) {
            match existing.countdown_state() {
                CountdownState::Expired | CountdownState::Stopped => {
                    existing.close();
                }
                _ => return Arc::clone(existing),
            }
        }

        let slot = Arc::downgrade(&self.sessions);
        let released_id = attempt.id.clone();
        let session = Arc::new(ExamSession::open_with(
            service,
            attempt,
            tick,
            autosave_every,
            async move {
                if let Some(sessions) = slot.upgrade() {
                    sessions.write().await.remove(&released_id);
                }
            },
        ));
        sessions.insert(attempt.id.clone(), Arc::clone(&session));
        session
    }

    pub async fn get(&self, attempt_id: &str) -> Option<Arc<ExamSession>> {
        let sessions = self.sessions.read().await;
        sessions.get(attempt_id).cloned()
    }

    /// Removes and cancels the session after a successful submit.
    pub async fn close(&self, attempt_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.remove(attempt_id) {
            session.close();
        }
    }

    pub async fn open_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
