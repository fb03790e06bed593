use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The three kinds of account that can hold a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum ActorKind {
    #[serde(rename = "dealer")]
    #[strum(serialize = "dealer")]
    Dealer,
    #[serde(rename = "customer")]
    #[strum(serialize = "customer")]
    Customer,
    #[serde(rename = "delivery_boy")]
    #[strum(serialize = "delivery_boy")]
    DeliveryAgent,
}

impl ActorKind {
    /// Value carried in the `user_type` claim and request bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorKind::Dealer => "dealer",
            ActorKind::Customer => "customer",
            ActorKind::DeliveryAgent => "delivery_boy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn user_type_round_trips_through_str() {
        for kind in ActorKind::iter() {
            assert_eq!(ActorKind::from_str(kind.as_str()).unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert!(ActorKind::from_str("admin").is_err());
    }

    #[test]
    fn delivery_agent_uses_legacy_wire_names() {
        assert_eq!(
            serde_json::to_string(&ActorKind::DeliveryAgent).unwrap(),
            "\"delivery_boy\""
        );
    }
}
