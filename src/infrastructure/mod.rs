pub mod courier_client;
pub mod location_repo;
pub mod models;
pub mod notification_client;
pub mod order_repo;
