use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An exam definition with its embedded question set. Immutable once an
/// attempt against it has started.
///
/// Top-level documents stay tolerant of driver-added fields such as `_id`
/// on readback; the embedded question data is strict.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Exam {
    pub id: String,
    pub title: String,
    pub duration_minutes: i64,
    pub total_marks: i16,
    pub pass_mark: i16,
    pub questions: Vec<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Exam {
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    pub id: String,
    pub order: i16,
    pub prompt: String,
    pub kind: QuestionKind,
    /// Empty for free-text questions.
    pub options: Vec<QuestionOption>,
    pub marks: i16,
}

impl Question {
    pub fn correct_option_id(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|opt| opt.correct)
            .map(|opt| opt.id.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    pub correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
pub enum QuestionKind {
    MultipleChoice, // Graded automatically against the correct option
    FreeText,       // Graded manually downstream, scores zero here
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_question(id: &str, marks: i16) -> Question {
        Question {
            id: id.to_string(),
            order: 1,
            prompt: "What is 2 + 2?".to_string(),
            kind: QuestionKind::MultipleChoice,
            options: vec![
                QuestionOption {
                    id: "opt-a".to_string(),
                    text: "3".to_string(),
                    correct: false,
                },
                QuestionOption {
                    id: "opt-b".to_string(),
                    text: "4".to_string(),
                    correct: true,
                },
            ],
            marks,
        }
    }

    #[test]
    fn question_kind_round_trip_serialization() {
        let variants = [QuestionKind::MultipleChoice, QuestionKind::FreeText];

        for variant in variants {
            let json = serde_json::to_string(&variant).expect("variant should serialize");
            let parsed: QuestionKind =
                serde_json::from_str(&json).expect("variant should deserialize");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn question_kind_rejects_unknown_variant() {
        let invalid = "\"Essay\"";
        let parsed = serde_json::from_str::<QuestionKind>(invalid);

        assert!(parsed.is_err());
    }

    #[test]
    fn question_option_rejects_unknown_fields() {
        let invalid = r#"{"id":"opt-a","text":"3","correct":false,"weight":2}"#;
        let parsed = serde_json::from_str::<QuestionOption>(invalid);

        assert!(parsed.is_err());
    }

    #[test]
    fn correct_option_id_finds_the_marked_option() {
        let question = make_question("q-1", 5);
        assert_eq!(question.correct_option_id(), Some("opt-b"));
    }

    #[test]
    fn correct_option_id_is_none_for_free_text() {
        let question = Question {
            id: "q-2".to_string(),
            order: 2,
            prompt: "Explain your reasoning".to_string(),
            kind: QuestionKind::FreeText,
            options: vec![],
            marks: 10,
        };
        assert_eq!(question.correct_option_id(), None);
    }

    #[test]
    fn exam_round_trip_preserves_questions() {
        let exam = Exam {
            id: "exam-1".to_string(),
            title: "Arithmetic".to_string(),
            duration_minutes: 30,
            total_marks: 10,
            pass_mark: 5,
            questions: vec![make_question("q-1", 5), make_question("q-2", 5)],
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        };

        let json = serde_json::to_string(&exam).expect("exam should serialize");
        let parsed: Exam = serde_json::from_str(&json).expect("exam should deserialize");

        assert_eq!(parsed.questions.len(), 2);
        assert_eq!(parsed.question("q-2").map(|q| q.marks), Some(5));
        assert!(parsed.question("q-9").is_none());
    }
}
