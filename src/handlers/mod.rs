pub mod actor;
pub mod locations;
pub mod orders;
