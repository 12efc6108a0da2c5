use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{MongoAnswerRepository, MongoAttemptRepository, MongoExamRepository},
    services::{AttemptService, SessionRegistry},
};

#[derive(Clone)]
pub struct AppState {
    pub attempt_service: Arc<AttemptService>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Arc<Config>,
    pub db: Database,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let exam_repository = Arc::new(MongoExamRepository::new(&db));
        exam_repository.ensure_indexes().await?;

        let attempt_repository = Arc::new(MongoAttemptRepository::new(&db));
        attempt_repository.ensure_indexes().await?;

        let answer_repository = Arc::new(MongoAnswerRepository::new(&db));
        answer_repository.ensure_indexes().await?;

        let attempt_service = Arc::new(AttemptService::new(
            exam_repository,
            attempt_repository,
            answer_repository,
        ));

        Ok(Self {
            attempt_service,
            sessions: Arc::new(SessionRegistry::new()),
            config: Arc::new(config),
            db,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
