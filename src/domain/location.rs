use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

/// A single courier position fix, broadcast to subscribers of the order's
/// channel and appended to history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationUpdate {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

/// Persisted, append-only location record.
#[derive(Debug, Clone)]
pub struct LocationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_id: Option<Uuid>,
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_at: DateTime<Utc>,
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), DomainError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(DomainError::InvalidInput(format!(
            "latitude must be within [-90, 90], got {latitude}"
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(DomainError::InvalidInput(format!(
            "longitude must be within [-180, 180], got {longitude}"
        )));
    }
    Ok(())
}
