pub mod answer;
pub mod attempt;
pub mod exam;
pub use answer::Answer;
pub use attempt::Attempt;
pub use exam::{Exam, Question, QuestionKind, QuestionOption};
