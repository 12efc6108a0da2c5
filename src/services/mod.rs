pub mod attempt_service;
pub mod autosave;
pub mod countdown;
pub mod scoring;
pub mod session;

pub use attempt_service::AttemptService;
pub use autosave::AutosaveScheduler;
pub use countdown::{CountdownController, CountdownState};
pub use session::{ExamSession, SessionRegistry};
