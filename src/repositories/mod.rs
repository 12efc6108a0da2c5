pub mod answer_repository;
pub mod attempt_repository;
pub mod exam_repository;

pub use answer_repository::{AnswerRepository, MongoAnswerRepository};
pub use attempt_repository::{AttemptRepository, MongoAttemptRepository};
pub use exam_repository::{ExamRepository, MongoExamRepository};

#[cfg(test)]
pub use answer_repository::MockAnswerRepository;
#[cfg(test)]
pub use attempt_repository::MockAttemptRepository;
#[cfg(test)]
pub use exam_repository::MockExamRepository;
