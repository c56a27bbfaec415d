pub mod location_relay;
pub mod order_service;
