use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::Attempt};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Inserts a fresh attempt. A concurrent insert for the same
    /// (student, exam) pair loses the race with `AlreadyExists` because of
    /// the partial unique index on active attempts.
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>>;
    /// The at-most-one non-submitted attempt for the pair, if any.
    async fn find_active(&self, student_id: &str, exam_id: &str) -> AppResult<Option<Attempt>>;
    /// Conditionally marks the attempt submitted, setting end time and score.
    /// Returns false when the attempt was already submitted, which lets a
    /// concurrent submitter detect that it lost and read the winner's result.
    async fn finalize(&self, id: &str, ended_at: DateTime<Utc>, score: i16) -> AppResult<bool>;
}

pub struct MongoAttemptRepository {
    collection: Collection<Attempt>,
}

impl MongoAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("attempts");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        // At most one non-submitted attempt per (student, exam). Two tabs
        // racing through resume-or-start collide here instead of producing
        // duplicate attempts.
        let active_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "exam_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(doc! { "submitted": false })
                    .name("active_attempt_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(active_index).await?;

        log::info!("Successfully created indexes for attempts collection");
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for MongoAttemptRepository {
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_active(&self, student_id: &str, exam_id: &str) -> AppResult<Option<Attempt>> {
        let attempt = self
            .collection
            .find_one(doc! {
                "student_id": student_id,
                "exam_id": exam_id,
                "submitted": false
            })
            .await?;
        Ok(attempt)
    }

    async fn finalize(&self, id: &str, ended_at: DateTime<Utc>, score: i16) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "id": id, "submitted": false },
                // Dates are stored the way serde writes them on insert so a
                // finalized attempt reads back with the same representation.
                doc! {
                    "$set": {
                        "submitted": true,
                        "ended_at": ended_at.to_rfc3339(),
                        "score": score as i32,
                        "modified_at": ended_at.to_rfc3339(),
                    }
                },
            )
            .await?;

        Ok(result.modified_count > 0)
    }
}
