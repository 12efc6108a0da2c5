use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

/// Remaining time on the countdown clock, clamped so it never goes negative.
pub fn remaining_seconds(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (deadline - now).num_seconds().max(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    /// Waiting for the deadline to be known.
    Initializing,
    /// Ticking; checks the deadline once per tick.
    Running,
    /// Deadline reached; auto-submit was invoked exactly once.
    Expired,
    /// Explicit submit or navigation-away cancelled the tick loop.
    Stopped,
}

const STATE_INITIALIZING: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_EXPIRED: u8 = 2;
const STATE_STOPPED: u8 = 3;

fn state_from_u8(raw: u8) -> CountdownState {
    match raw {
        STATE_RUNNING => CountdownState::Running,
        STATE_EXPIRED => CountdownState::Expired,
        STATE_STOPPED => CountdownState::Stopped,
        _ => CountdownState::Initializing,
    }
}

/// Deadline watchdog for one open attempt.
///
/// Runs a periodic tick task that fires its expiry action exactly once when
/// the deadline passes. The task handle is retained so every exit path,
/// including drop, cancels the timer; a stray tick must never submit an
/// attempt on behalf of a page the student has already left.
pub struct CountdownController {
    state: Arc<AtomicU8>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CountdownController {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(STATE_INITIALIZING)),
            handle: Mutex::new(None),
        }
    }

    pub fn state(&self) -> CountdownState {
        state_from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Starts ticking toward the deadline. Only valid once, from
    /// `Initializing`; repeated calls are ignored. `on_expire` runs at most
    /// once, from the tick task, when the deadline passes while the
    /// countdown is still running.
    pub fn start<F>(
        &self,
        deadline: DateTime<Utc>,
        tick: StdDuration,
        attempt_id: String,
        on_expire: F,
    ) where
        F: Future<Output = ()> + Send + 'static,
    {
        if self
            .state
            .compare_exchange(
                STATE_INITIALIZING,
                STATE_RUNNING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            log::warn!(
                "countdown for attempt {} already started, ignoring",
                attempt_id
            );
            return;
        }

        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            let mut on_expire = Some(on_expire);
            loop {
                interval.tick().await;
                if state.load(Ordering::SeqCst) != STATE_RUNNING {
                    break;
                }
                if Utc::now() < deadline {
                    continue;
                }
                // Running -> Expired transitions at most once, so the
                // auto-submit below cannot double-fire even if a stop
                // races the final tick.
                if state
                    .compare_exchange(
                        STATE_RUNNING,
                        STATE_EXPIRED,
                        Ordering::SeqCst,
                        Ordering::SeqCst,
                    )
                    .is_ok()
                {
                    log::info!("attempt {} reached its deadline, auto-submitting", attempt_id);
                    if let Some(expire) = on_expire.take() {
                        expire.await;
                    }
                }
                break;
            }
        });

        if let Ok(mut handle) = self.handle.lock() {
            *handle = Some(task);
        }
    }

    /// Cancels the tick loop after an explicit submit. `Running -> Stopped`;
    /// an already-expired countdown stays `Expired`.
    pub fn stop(&self) {
        let _ = self.state.compare_exchange(
            STATE_RUNNING,
            STATE_STOPPED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        let _ = self.state.compare_exchange(
            STATE_INITIALIZING,
            STATE_STOPPED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        self.abort_task();
    }

    fn abort_task(&self) {
        if let Ok(mut handle) = self.handle.lock() {
            if let Some(task) = handle.take() {
                task.abort();
            }
        }
    }
}

impl Default for CountdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CountdownController {
    fn drop(&mut self) {
        self.abort_task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn remaining_seconds_clamps_at_zero() {
        let now = Utc::now();

        assert_eq!(remaining_seconds(now + Duration::seconds(90), now), 90);
        assert_eq!(remaining_seconds(now - Duration::seconds(5), now), 0);
        assert_eq!(remaining_seconds(now, now), 0);
    }

    #[test]
    fn new_controller_starts_initializing() {
        let countdown = CountdownController::new();
        assert_eq!(countdown.state(), CountdownState::Initializing);
    }

    #[test]
    fn stop_before_start_moves_to_stopped() {
        let countdown = CountdownController::new();
        countdown.stop();
        assert_eq!(countdown.state(), CountdownState::Stopped);
    }

    #[test]
    fn stop_does_not_unexpire() {
        let countdown = CountdownController::new();
        countdown.state.store(STATE_EXPIRED, Ordering::SeqCst);

        countdown.stop();

        assert_eq!(countdown.state(), CountdownState::Expired);
    }
}
