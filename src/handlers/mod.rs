pub mod attempt_handler;
pub mod exam_handler;

pub use attempt_handler::{record_answer, start_attempt, submit_attempt};
pub use exam_handler::{get_exam, health_check};
