use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A student's saved answer for one question of one attempt, keyed by the
/// (attempt, question) pair. Created or overwritten by autosave; never
/// deleted during the attempt.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Answer {
    pub attempt_id: String,
    pub question_id: String,
    /// Selected option id for multiple choice, raw text for free text.
    pub value: String,
    pub modified_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(attempt_id: &str, question_id: &str, value: &str) -> Self {
        Answer {
            attempt_id: attempt_id.to_string(),
            question_id: question_id.to_string(),
            value: value.to_string(),
            modified_at: Utc::now(),
        }
    }
}
