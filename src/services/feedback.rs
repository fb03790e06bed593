use crate::{
    entities::feedback,
    errors::ServiceError,
    events::{Event, EventSender},
    repositories::{feedback_repository::FeedbackRow, FeedbackRepository},
    services::db_error,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    #[validate(length(min = 1, max = 2000, message = "Feedback message is required"))]
    pub feedback_message: String,
}

#[derive(Clone)]
pub struct FeedbackService {
    feedback: FeedbackRepository,
    event_sender: Option<Arc<EventSender>>,
}

impl FeedbackService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            feedback: FeedbackRepository::new(db),
            event_sender,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn submit(
        &self,
        customer_id: i32,
        request: SubmitFeedbackRequest,
    ) -> Result<feedback::Model, ServiceError> {
        request.validate()?;
        let message = request.feedback_message.trim().to_string();
        if message.is_empty() {
            return Err(ServiceError::ValidationError(
                "Feedback message is required".to_string(),
            ));
        }

        let entry = self
            .feedback
            .insert(customer_id, message)
            .await
            .map_err(db_error("Failed to store feedback"))?;

        info!(feedback_id = entry.id, "feedback submitted");
        if let Some(sender) = &self.event_sender {
            sender
                .publish(Event::FeedbackSubmitted {
                    feedback_id: entry.id,
                    customer_id,
                    at: entry.created_at,
                })
                .await;
        }
        Ok(entry)
    }

    pub async fn list(&self) -> Result<Vec<FeedbackRow>, ServiceError> {
        self.feedback
            .list()
            .await
            .map_err(db_error("Failed to list feedback"))
    }
}
