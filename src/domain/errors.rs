use thiserror::Error;

use super::order::OrderStatus;

/// Closed set of failure kinds the core can produce. Every variant maps to a
/// stable `errorCode` at the HTTP boundary; nothing else is ever surfaced.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid item format: {0}")]
    InvalidItemFormat(String),

    #[error("Invalid action '{0}'")]
    InvalidAction(String),

    #[error("Action '{action}' not permitted from state {current}")]
    InvalidState { current: OrderStatus, action: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Timed out calling {0}")]
    DependencyTimeout(String),

    #[error("Downstream service unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Storage failure: {0}")]
    Persistence(String),
}

impl DomainError {
    /// Stable machine-readable code, part of the public error contract.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidInput(_) => "INVALID_INPUT",
            DomainError::InvalidItemFormat(_) => "INVALID_ITEM_FORMAT",
            DomainError::InvalidAction(_) => "INVALID_ACTION",
            DomainError::InvalidState { .. } => "INVALID_STATE",
            DomainError::Unauthorized(_) => "UNAUTHORIZED",
            DomainError::Forbidden(_) => "FORBIDDEN",
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::DependencyTimeout(_) => "DEPENDENCY_TIMEOUT",
            DomainError::DependencyUnavailable(_) => "DEPENDENCY_UNAVAILABLE",
            DomainError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}
