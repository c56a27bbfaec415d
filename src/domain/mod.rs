pub mod errors;
pub mod events;
pub mod location;
pub mod order;
pub mod ports;
pub mod state_machine;
