//! sea-orm entities for the marketplace tables.

pub mod customer;
pub mod dealer;
pub mod delivery_agent;
pub mod feedback;
pub mod fuel_price;
pub mod fuel_station;
pub mod order;
