use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::Exam;

/// One student's single pass at one exam, bounded by a deadline.
///
/// The deadline is derived exactly once, at creation, from the start time and
/// the exam duration. A page reload resumes the persisted attempt and reads
/// the persisted deadline back; it is never recomputed from "now".
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Attempt {
    pub id: String,
    pub exam_id: String,
    pub student_id: String,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Only authoritative once `submitted` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Attempt {
    pub fn start(exam: &Exam, student_id: &str) -> Self {
        let started_at = Utc::now();
        Attempt {
            id: Uuid::new_v4().to_string(),
            exam_id: exam.id.clone(),
            student_id: student_id.to_string(),
            started_at,
            deadline: started_at + Duration::minutes(exam.duration_minutes),
            submitted: false,
            ended_at: None,
            score: None,
            created_at: Some(started_at),
            modified_at: Some(started_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::exam::{Question, QuestionKind};

    fn make_exam(duration_minutes: i64) -> Exam {
        Exam {
            id: "exam-1".to_string(),
            title: "Algebra".to_string(),
            duration_minutes,
            total_marks: 10,
            pass_mark: 5,
            questions: vec![Question {
                id: "q-1".to_string(),
                order: 1,
                prompt: "Solve x + 1 = 2".to_string(),
                kind: QuestionKind::MultipleChoice,
                options: vec![],
                marks: 10,
            }],
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }

    #[test]
    fn start_derives_deadline_from_duration() {
        let exam = make_exam(45);
        let attempt = Attempt::start(&exam, "student-1");

        assert_eq!(attempt.deadline - attempt.started_at, Duration::minutes(45));
        assert!(!attempt.submitted);
        assert!(attempt.score.is_none());
        assert!(attempt.ended_at.is_none());
    }

    #[test]
    fn attempt_round_trip_preserves_submission_fields() {
        let exam = make_exam(1);
        let mut attempt = Attempt::start(&exam, "student-1");
        attempt.submitted = true;
        attempt.ended_at = Some(Utc::now());
        attempt.score = Some(7);

        let json = serde_json::to_string(&attempt).expect("attempt should serialize");
        let parsed: Attempt = serde_json::from_str(&json).expect("attempt should deserialize");

        assert!(parsed.submitted);
        assert_eq!(parsed.score, Some(7));
        assert_eq!(parsed.deadline, attempt.deadline);
    }

    #[test]
    fn attempt_tolerates_driver_added_fields() {
        let attempt = Attempt::start(&make_exam(1), "student-1");

        let mut value = serde_json::to_value(&attempt).expect("attempt should serialize");
        value["_id"] = serde_json::json!("652f8a2e9d1c4b0012345678");
        let parsed: Attempt = serde_json::from_value(value).expect("readback should tolerate _id");

        assert_eq!(parsed.id, attempt.id);
    }
}
