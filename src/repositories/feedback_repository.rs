use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, JoinType,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::entities::{customer, feedback};
use crate::repositories::Repository;

use super::BaseRepository;

#[derive(Debug, Clone, Serialize, FromQueryResult, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRow {
    pub id: i32,
    pub customer_id: i32,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
}

/// Append-only store of customer feedback
#[derive(Debug, Clone)]
pub struct FeedbackRepository {
    base: BaseRepository,
}

impl FeedbackRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn insert(&self, customer_id: i32, message: String) -> Result<feedback::Model, DbErr> {
        feedback::ActiveModel {
            customer_id: Set(customer_id),
            message: Set(message),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.base.get_db())
        .await
    }

    /// All feedback, newest first, with the author's name.
    pub async fn list(&self) -> Result<Vec<FeedbackRow>, DbErr> {
        feedback::Entity::find()
            .column_as(customer::Column::Name, "customer_name")
            .join(JoinType::InnerJoin, feedback::Relation::Customer.def())
            .order_by_desc(feedback::Column::CreatedAt)
            .order_by_desc(feedback::Column::Id)
            .into_model::<FeedbackRow>()
            .all(self.base.get_db())
            .await
    }
}

impl Repository for FeedbackRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
