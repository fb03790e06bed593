use crate::{
    entities::{delivery_agent, order::OrderStatus},
    errors::ServiceError,
    repositories::{
        actor_repository::DeliveryAgentRepository, order_repository::AssignmentRow,
        OrderRepository,
    },
    services::db_error,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::instrument;
use utoipa::ToSchema;

/// Delivery agent as offered for assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<delivery_agent::Model> for AgentSummary {
    fn from(m: delivery_agent::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStats {
    pub total_deliveries: u64,
    pub completed_deliveries: u64,
    /// Whole percent of assigned orders that were delivered
    pub success_rate: u32,
    pub last_delivery: Option<DateTime<Utc>>,
    pub active_orders: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetails {
    #[serde(flatten)]
    pub agent: AgentSummary,
    #[serde(flatten)]
    pub stats: DeliveryStats,
}

/// Folds the orders referencing one agent into delivery statistics.
pub fn agent_stats<'a>(rows: impl IntoIterator<Item = &'a AssignmentRow>) -> DeliveryStats {
    let mut stats = DeliveryStats::default();

    for row in rows {
        stats.total_deliveries += 1;
        match row.status {
            OrderStatus::Delivered => {
                stats.completed_deliveries += 1;
                if stats.last_delivery.map_or(true, |last| row.created_at > last) {
                    stats.last_delivery = Some(row.created_at);
                }
            }
            OrderStatus::Accepted | OrderStatus::InProgress => stats.active_orders += 1,
            OrderStatus::Pending | OrderStatus::Cancelled => {}
        }
    }

    if stats.total_deliveries > 0 {
        let rate = stats.completed_deliveries as f64 / stats.total_deliveries as f64 * 100.0;
        stats.success_rate = rate.round() as u32;
    }
    stats
}

/// Delivery agent lookups for dealers.
#[derive(Clone)]
pub struct AgentService {
    agents: DeliveryAgentRepository,
    orders: OrderRepository,
}

impl AgentService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            agents: DeliveryAgentRepository::new(db.clone()),
            orders: OrderRepository::new(db),
        }
    }

    /// Agents with no `accepted` or `in-progress` order.
    #[instrument(skip(self))]
    pub async fn available_agents(&self) -> Result<Vec<AgentSummary>, ServiceError> {
        Ok(self
            .agents
            .available()
            .await
            .map_err(db_error("Failed to list available delivery agents"))?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn agent_details(&self) -> Result<Vec<AgentDetails>, ServiceError> {
        let agents = self
            .agents
            .all()
            .await
            .map_err(db_error("Failed to list delivery agents"))?;
        let assignments = self
            .orders
            .assignments(None)
            .await
            .map_err(db_error("Failed to load delivery assignments"))?;

        let mut by_agent: HashMap<i32, Vec<AssignmentRow>> = HashMap::new();
        for row in assignments {
            by_agent.entry(row.delivery_agent_id).or_default().push(row);
        }

        Ok(agents
            .into_iter()
            .map(|agent| {
                let stats = agent_stats(by_agent.get(&agent.id).into_iter().flatten());
                AgentDetails {
                    agent: agent.into(),
                    stats,
                }
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn agent_detail(&self, agent_id: i32) -> Result<AgentDetails, ServiceError> {
        let agent = self
            .agents
            .find_by_id(agent_id)
            .await
            .map_err(db_error("Failed to look up delivery agent"))?
            .ok_or_else(|| ServiceError::NotFound(format!("Delivery agent {} not found", agent_id)))?;
        let assignments = self
            .orders
            .assignments(Some(agent_id))
            .await
            .map_err(db_error("Failed to load delivery assignments"))?;

        Ok(AgentDetails {
            agent: agent.into(),
            stats: agent_stats(&assignments),
        })
    }
}
