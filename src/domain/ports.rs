use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;
use super::events::OrderEvent;
use super::location::{LocationRecord, LocationUpdate};
use super::order::{Order, OrderItemInput, OrderStatus};

/// Write access to `orders`/`order_items` is owned exclusively by this
/// service; other services see orders only through the HTTP surface.
///
/// The conditional operations return whether a row matched the expected
/// prior state — `false` means the transition lost a race (or the state had
/// already moved on) and must be reported as such, not retried blindly.
pub trait OrderRepository: Send + Sync + 'static {
    /// Insert the order and all of its items in one transaction.
    fn create(
        &self,
        customer_id: Uuid,
        vendor_id: Uuid,
        items: Vec<OrderItemInput>,
        total_price: BigDecimal,
    ) -> Result<Order, DomainError>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;

    /// `UPDATE orders SET status = next WHERE id = ? AND status = expected`.
    fn transition_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool, DomainError>;

    /// Bind a courier and move to `EN_ROUTE`, guarded on `status = APPROVED`.
    fn bind_courier(&self, id: Uuid, courier_id: Uuid) -> Result<bool, DomainError>;

    /// Move to `DELIVERED`, guarded on `status = EN_ROUTE` and the courier
    /// binding matching the caller.
    fn complete_delivery(&self, id: Uuid, courier_id: Uuid) -> Result<bool, DomainError>;
}

/// Courier standing as reported by the courier service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourierStanding {
    Pending,
    Approved,
    Rejected,
}

/// Read-only view into the courier service. There is no cross-service
/// transaction with the order update; the conditional update is the final
/// arbiter and a courier unapproved in between is an accepted residual race.
#[async_trait]
pub trait CourierDirectory: Send + Sync + 'static {
    /// `None` means the courier does not exist.
    async fn fetch_standing(&self, courier_id: Uuid)
        -> Result<Option<CourierStanding>, DomainError>;
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync + 'static {
    async fn dispatch(&self, event: &OrderEvent) -> Result<(), DomainError>;
}

/// Append-only position history; records are never mutated.
pub trait LocationStore: Send + Sync + 'static {
    fn append(&self, update: &LocationUpdate) -> Result<LocationRecord, DomainError>;

    fn recent_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<LocationRecord>, DomainError>;
}
