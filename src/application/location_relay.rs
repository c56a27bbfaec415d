//! Real-time fan-out of courier position updates, keyed by order.
//!
//! Not part of the order state machine: a publish is valid regardless of the
//! order's status. Each order id owns a lazily created broadcast channel;
//! subscribers join by obtaining a receiver and leave by dropping it. Updates
//! from one publisher reach a given subscriber in publish order; nothing is
//! guaranteed across different publishers.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::location::{validate_coordinates, LocationRecord, LocationUpdate};
use crate::domain::ports::LocationStore;

/// History reads are capped at the most recent fixes per user.
pub const HISTORY_LIMIT: i64 = 50;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

pub struct LocationRelay {
    channels: DashMap<Uuid, broadcast::Sender<LocationUpdate>>,
    capacity: usize,
    store: Option<Arc<dyn LocationStore>>,
}

impl LocationRelay {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            capacity: DEFAULT_CHANNEL_CAPACITY,
            store: None,
        }
    }

    /// Enable append-only persistence of published updates.
    pub fn with_store(store: Arc<dyn LocationStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::new()
        }
    }

    /// Subscribe to an order's channel. Dropping the receiver leaves the
    /// channel; empty channels are pruned on the next publish.
    pub fn join(&self, order_id: Uuid) -> broadcast::Receiver<LocationUpdate> {
        self.channels
            .entry(order_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    pub fn subscriber_count(&self, order_id: Uuid) -> usize {
        self.channels
            .get(&order_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Validate, persist (when a store is configured), and broadcast.
    /// A channel with no subscribers swallows the update; that is not an
    /// error, tracking clients simply aren't watching right now.
    pub async fn publish(
        &self,
        update: LocationUpdate,
    ) -> Result<Option<LocationRecord>, DomainError> {
        validate_coordinates(update.latitude, update.longitude)?;

        let record = match &self.store {
            Some(store) => {
                let store = Arc::clone(store);
                Some(
                    tokio::task::spawn_blocking(move || store.append(&update))
                        .await
                        .map_err(|e| {
                            DomainError::Persistence(format!("blocking task failed: {e}"))
                        })??,
                )
            }
            None => None,
        };

        if let Some(tx) = self.channels.get(&update.order_id) {
            // Err means no live receivers; fall through to pruning.
            let _ = tx.send(update);
        }
        self.channels
            .remove_if(&update.order_id, |_, tx| tx.receiver_count() == 0);

        Ok(record)
    }

    /// Most recent fixes for a user, newest first, capped at [`HISTORY_LIMIT`].
    pub async fn recent_for_user(&self, user_id: Uuid) -> Result<Vec<LocationRecord>, DomainError> {
        let Some(store) = &self.store else {
            return Ok(vec![]);
        };
        let store = Arc::clone(store);
        tokio::task::spawn_blocking(move || store.recent_for_user(user_id, HISTORY_LIMIT))
            .await
            .map_err(|e| DomainError::Persistence(format!("blocking task failed: {e}")))?
    }
}

impl Default for LocationRelay {
    fn default() -> Self {
        Self::new()
    }
}
