use sea_orm::DbErr;
use serde::{Deserialize, Serialize};

use crate::{auth::ActorKind, entities::order::OrderStatus};

/// Every lifecycle edge an actor can request after an order has been placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum OrderTransition {
    DealerAccept,
    DealerReject,
    AssignAgent,
    AgentAccept,
    AgentReject,
    AgentDeliver,
    CustomerCancel,
}

/// Which column of the order proves the caller may perform a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The order's station belongs to the dealer.
    StationDealer(i32),
    /// The order belongs to the customer.
    Customer(i32),
    /// The agent is currently assigned to the order.
    AssignedAgent(i32),
}

impl Ownership {
    pub fn actor_id(&self) -> i32 {
        match self {
            Ownership::StationDealer(id) | Ownership::Customer(id) | Ownership::AssignedAgent(id) => {
                *id
            }
        }
    }
}

/// What a successful transition does to the delivery agent reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentChange {
    Keep,
    Set(i32),
    Clear,
}

/// A fully resolved compare-and-swap request against one order row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    pub order_id: i32,
    pub transition: OrderTransition,
    pub owner: Ownership,
    pub from: Vec<OrderStatus>,
    pub to: OrderStatus,
    pub agent: AgentChange,
}

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("Order {order_id} not found")]
    NotFound { order_id: i32 },

    #[error("Order {order_id} does not belong to the caller")]
    NotOwner { order_id: i32 },

    #[error("Order {order_id} is {current}; expected one of: {}", join_statuses(.expected))]
    InvalidState {
        order_id: i32,
        current: OrderStatus,
        expected: Vec<OrderStatus>,
    },

    #[error("Status '{0}' cannot be set by a delivery agent; only 'delivered' is allowed")]
    InvalidStatusTarget(String),

    #[error(transparent)]
    Store(#[from] DbErr),
}

fn join_statuses(statuses: &[OrderStatus]) -> String {
    statuses
        .iter()
        .map(OrderStatus::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl OrderTransition {
    /// The only role allowed to request this transition.
    pub fn actor(&self) -> ActorKind {
        match self {
            OrderTransition::DealerAccept
            | OrderTransition::DealerReject
            | OrderTransition::AssignAgent => ActorKind::Dealer,
            OrderTransition::AgentAccept
            | OrderTransition::AgentReject
            | OrderTransition::AgentDeliver => ActorKind::DeliveryAgent,
            OrderTransition::CustomerCancel => ActorKind::Customer,
        }
    }

    /// Statuses the order must currently hold.
    pub fn from_states(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            OrderTransition::DealerAccept => &[Pending],
            OrderTransition::DealerReject => &[Pending, Accepted],
            OrderTransition::AssignAgent => &[Accepted],
            OrderTransition::AgentAccept => &[Accepted, InProgress],
            OrderTransition::AgentReject => &[InProgress],
            OrderTransition::AgentDeliver => &[InProgress],
            OrderTransition::CustomerCancel => &[Pending],
        }
    }

    pub fn to_state(&self) -> OrderStatus {
        match self {
            OrderTransition::DealerAccept | OrderTransition::AssignAgent => OrderStatus::Accepted,
            OrderTransition::DealerReject | OrderTransition::CustomerCancel => {
                OrderStatus::Cancelled
            }
            OrderTransition::AgentAccept => OrderStatus::InProgress,
            OrderTransition::AgentReject => OrderStatus::Accepted,
            OrderTransition::AgentDeliver => OrderStatus::Delivered,
        }
    }

    /// Builds the guarded update for `actor_id` acting on `order_id`.
    ///
    /// `assignee` is only consulted for [`OrderTransition::AssignAgent`].
    pub fn request(
        self,
        order_id: i32,
        actor_id: i32,
        assignee: Option<i32>,
    ) -> TransitionRequest {
        let owner = match self.actor() {
            ActorKind::Dealer => Ownership::StationDealer(actor_id),
            ActorKind::Customer => Ownership::Customer(actor_id),
            ActorKind::DeliveryAgent => Ownership::AssignedAgent(actor_id),
        };
        let agent = match (self, assignee) {
            (OrderTransition::AssignAgent, Some(agent_id)) => AgentChange::Set(agent_id),
            (OrderTransition::AgentReject, _) => AgentChange::Clear,
            _ => AgentChange::Keep,
        };

        TransitionRequest {
            order_id,
            transition: self,
            owner,
            from: self.from_states().to_vec(),
            to: self.to_state(),
            agent,
        }
    }
}

/// Resolves the target an agent asked for through the status update endpoint.
pub fn agent_status_target(requested: &str) -> Result<OrderTransition, TransitionError> {
    match requested.parse::<OrderStatus>() {
        Ok(OrderStatus::Delivered) => Ok(OrderTransition::AgentDeliver),
        _ => Err(TransitionError::InvalidStatusTarget(requested.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use OrderStatus::*;

    /// Edges of the lifecycle graph, written out independently of the table.
    fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            (Pending, Accepted)
                | (Pending, Cancelled)
                | (Accepted, Accepted)
                | (Accepted, Cancelled)
                | (Accepted, InProgress)
                | (InProgress, InProgress)
                | (InProgress, Accepted)
                | (InProgress, Delivered)
        )
    }

    #[rstest]
    #[case(OrderTransition::DealerAccept, ActorKind::Dealer, &[Pending], Accepted)]
    #[case(OrderTransition::DealerReject, ActorKind::Dealer, &[Pending, Accepted], Cancelled)]
    #[case(OrderTransition::AssignAgent, ActorKind::Dealer, &[Accepted], Accepted)]
    #[case(OrderTransition::AgentAccept, ActorKind::DeliveryAgent, &[Accepted, InProgress], InProgress)]
    #[case(OrderTransition::AgentReject, ActorKind::DeliveryAgent, &[InProgress], Accepted)]
    #[case(OrderTransition::AgentDeliver, ActorKind::DeliveryAgent, &[InProgress], Delivered)]
    #[case(OrderTransition::CustomerCancel, ActorKind::Customer, &[Pending], Cancelled)]
    fn transition_table(
        #[case] transition: OrderTransition,
        #[case] actor: ActorKind,
        #[case] from: &[OrderStatus],
        #[case] to: OrderStatus,
    ) {
        assert_eq!(transition.actor(), actor);
        assert_eq!(transition.from_states(), from);
        assert_eq!(transition.to_state(), to);
        for state in from {
            assert!(is_valid_transition(*state, to), "{state} -> {to}");
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for to in [Pending, Accepted, InProgress, Delivered, Cancelled] {
            assert!(!is_valid_transition(Delivered, to));
            assert!(!is_valid_transition(Cancelled, to));
        }
    }

    #[test]
    fn agent_reject_clears_assignment() {
        let request = OrderTransition::AgentReject.request(9, 4, None);
        assert_eq!(request.owner, Ownership::AssignedAgent(4));
        assert_eq!(request.agent, AgentChange::Clear);
        assert_eq!(request.to, Accepted);
    }

    #[test]
    fn assign_agent_sets_assignee_and_checks_station_owner() {
        let request = OrderTransition::AssignAgent.request(9, 2, Some(7));
        assert_eq!(request.owner, Ownership::StationDealer(2));
        assert_eq!(request.agent, AgentChange::Set(7));
        assert_eq!(request.from, vec![Accepted]);
    }

    #[test]
    fn customer_cancel_keeps_agent_column() {
        let request = OrderTransition::CustomerCancel.request(1, 3, Some(5));
        assert_eq!(request.owner, Ownership::Customer(3));
        assert_eq!(request.agent, AgentChange::Keep);
    }

    #[rstest]
    #[case("in-progress")]
    #[case("cancelled")]
    #[case("pending")]
    #[case("teleported")]
    fn agents_may_only_request_delivered(#[case] requested: &str) {
        assert_matches!(
            agent_status_target(requested),
            Err(TransitionError::InvalidStatusTarget(s)) if s == requested
        );
    }

    #[test]
    fn delivered_target_maps_to_agent_deliver() {
        assert_matches!(
            agent_status_target("delivered"),
            Ok(OrderTransition::AgentDeliver)
        );
    }

    #[test]
    fn invalid_state_message_names_current_status() {
        let err = TransitionError::InvalidState {
            order_id: 12,
            current: InProgress,
            expected: vec![Pending, Accepted],
        };
        assert_eq!(
            err.to_string(),
            "Order 12 is in-progress; expected one of: pending, accepted"
        );
    }
}
