use serde::Deserialize;
use validator::Validate;

/// Body of the per-question answer upsert. The attempt and question ids ride
/// in the path; only the student's current value is carried here to keep
/// autosave payloads small.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordAnswerRequest {
    #[validate(length(min = 1, max = 4000, message = "Answer value must be 1-4000 characters"))]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_answer_accepts_option_id() {
        let request = RecordAnswerRequest {
            value: "opt-b".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn record_answer_rejects_empty_value() {
        let request = RecordAnswerRequest {
            value: String::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn record_answer_rejects_oversized_value() {
        let request = RecordAnswerRequest {
            value: "x".repeat(4001),
        };
        assert!(request.validate().is_err());
    }
}
