//! In-process audit trail of marketplace activity.
//!
//! Services push [`Event`]s into a bounded channel; [`process_events`] drains it on a
//! background task and writes each event to the log.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::auth::ActorKind;
use crate::entities::order::{FuelType, OrderStatus};
use crate::services::order_status::OrderTransition;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the processor is gone.
    pub async fn publish(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("{}", e);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    OrderPlaced {
        order_id: i32,
        customer_id: i32,
        station_id: i32,
        fuel_type: FuelType,
        total_amount: Decimal,
        at: DateTime<Utc>,
    },
    OrderTransitioned {
        order_id: i32,
        transition: OrderTransition,
        actor: ActorKind,
        actor_id: i32,
        status: OrderStatus,
        delivery_agent_id: Option<i32>,
        at: DateTime<Utc>,
    },
    StationRegistered {
        station_id: i32,
        dealer_id: i32,
        at: DateTime<Utc>,
    },
    PricesUpdated {
        station_id: i32,
        dealer_id: i32,
        at: DateTime<Utc>,
    },
    FeedbackSubmitted {
        feedback_id: i32,
        customer_id: i32,
        at: DateTime<Utc>,
    },
}

/// Drains the event channel until every sender has been dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderPlaced {
                order_id,
                customer_id,
                total_amount,
                ..
            } => info!(
                order_id,
                customer_id,
                total_amount = %total_amount,
                "audit: order placed"
            ),
            Event::OrderTransitioned {
                order_id,
                transition,
                actor_id,
                status,
                ..
            } => info!(
                order_id,
                actor_id,
                transition = %transition,
                status = %status,
                "audit: order transitioned"
            ),
            Event::StationRegistered {
                station_id,
                dealer_id,
                ..
            } => info!(station_id, dealer_id, "audit: station registered"),
            Event::PricesUpdated {
                station_id,
                dealer_id,
                ..
            } => info!(station_id, dealer_id, "audit: prices updated"),
            Event::FeedbackSubmitted {
                feedback_id,
                customer_id,
                ..
            } => info!(feedback_id, customer_id, "audit: feedback submitted"),
        }
    }

    info!("Event processing loop stopped");
}
