use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod actor_repository;
pub mod feedback_repository;
pub mod order_repository;
pub mod station_repository;

pub use actor_repository::{ActorDirectory, ActorRepository};
pub use feedback_repository::FeedbackRepository;
pub use order_repository::OrderRepository;
pub use station_repository::StationRepository;

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}
