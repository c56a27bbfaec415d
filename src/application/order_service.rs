use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::events::{OrderEvent, OrderEventKind};
use crate::domain::order::{Actor, Order, OrderItemInput, OrderStatus};
use crate::domain::ports::{
    CourierDirectory, CourierStanding, NotificationDispatcher, OrderRepository,
};
use crate::domain::order::validate_items;
use crate::domain::state_machine::{transition, OrderAction};

/// Orchestrates the order lifecycle: validates through the state machine,
/// persists through conditional updates, and publishes best-effort events
/// strictly after the write commits.
///
/// Repository calls run on the blocking pool; everything else is async.
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    couriers: Arc<dyn CourierDirectory>,
    notifier: Arc<dyn NotificationDispatcher>,
}

impl OrderService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        couriers: Arc<dyn CourierDirectory>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            repo,
            couriers,
            notifier,
        }
    }

    pub async fn create_order(
        &self,
        customer_id: Uuid,
        vendor_id: Uuid,
        items: Vec<OrderItemInput>,
    ) -> Result<Order, DomainError> {
        let total_price = validate_items(&items)?;

        let created = self
            .blocking(move |repo| repo.create(customer_id, vendor_id, items, total_price))
            .await?;

        self.emit(OrderEvent {
            kind: OrderEventKind::Placed,
            order_id: created.id,
            customer_id: created.customer_id,
            courier_id: None,
        })
        .await;

        Ok(created)
    }

    pub async fn apply_vendor_action(
        &self,
        order_id: Uuid,
        action: &str,
        actor: Actor,
    ) -> Result<Order, DomainError> {
        let action = OrderAction::parse_vendor_action(action)?;
        let current = self.load(order_id).await?;
        let planned = transition(&current, action, &actor)?;

        let matched = self
            .blocking(move |repo| {
                repo.transition_status(order_id, OrderStatus::PendingVendor, planned.next)
            })
            .await?;
        if !matched {
            // Another request decided this order first; report the state we
            // lost to, not a generic failure.
            let fresh = self.load(order_id).await?;
            return Err(DomainError::InvalidState {
                current: fresh.status,
                action: action.name().to_string(),
            });
        }

        let updated = self.load(order_id).await?;
        let kind = if planned.next == OrderStatus::Approved {
            OrderEventKind::Approved
        } else {
            OrderEventKind::Rejected
        };
        self.emit(OrderEvent {
            kind,
            order_id,
            customer_id: updated.customer_id,
            courier_id: None,
        })
        .await;

        Ok(updated)
    }

    pub async fn assign_courier(
        &self,
        order_id: Uuid,
        courier_id: Uuid,
        actor: Actor,
    ) -> Result<Order, DomainError> {
        let current = self.load(order_id).await?;
        transition(&current, OrderAction::Assign { courier_id }, &actor)?;

        // Eligibility lives in another service's store. No transaction spans
        // both; the conditional update below is the final arbiter, and a
        // courier unapproved between here and the update is an accepted
        // residual inconsistency.
        match self.couriers.fetch_standing(courier_id).await? {
            Some(CourierStanding::Approved) => {}
            Some(_) => {
                return Err(DomainError::Forbidden(
                    "courier is not approved for deliveries".to_string(),
                ))
            }
            None => return Err(DomainError::NotFound("courier")),
        }

        let matched = self
            .blocking(move |repo| repo.bind_courier(order_id, courier_id))
            .await?;
        if !matched {
            // A plain read moments ago may well have shown APPROVED; zero
            // matched rows means we lost the race to another assignment.
            let fresh = self.load(order_id).await?;
            return Err(DomainError::InvalidState {
                current: fresh.status,
                action: "assign".to_string(),
            });
        }

        let updated = self.load(order_id).await?;
        self.emit(OrderEvent {
            kind: OrderEventKind::Assigned,
            order_id,
            customer_id: updated.customer_id,
            courier_id: Some(courier_id),
        })
        .await;

        Ok(updated)
    }

    pub async fn mark_delivered(&self, order_id: Uuid, actor: Actor) -> Result<Order, DomainError> {
        let current = self.load(order_id).await?;
        transition(&current, OrderAction::Deliver, &actor)?;

        let courier_id = actor.id;
        let matched = self
            .blocking(move |repo| repo.complete_delivery(order_id, courier_id))
            .await?;
        if !matched {
            // Re-run the pure check against a fresh read to tell a courier
            // mismatch apart from a state that has moved on.
            let fresh = self.load(order_id).await?;
            return Err(match transition(&fresh, OrderAction::Deliver, &actor) {
                Err(e) => e,
                Ok(_) => DomainError::InvalidState {
                    current: fresh.status,
                    action: "deliver".to_string(),
                },
            });
        }

        let updated = self.load(order_id).await?;
        self.emit(OrderEvent {
            kind: OrderEventKind::Delivered,
            order_id,
            customer_id: updated.customer_id,
            courier_id: updated.courier_id,
        })
        .await;

        Ok(updated)
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<Order, DomainError> {
        self.load(order_id).await
    }

    async fn load(&self, order_id: Uuid) -> Result<Order, DomainError> {
        self.blocking(move |repo| repo.find_by_id(order_id))
            .await?
            .ok_or(DomainError::NotFound("order"))
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn OrderRepository) -> Result<T, DomainError> + Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || f(repo.as_ref()))
            .await
            .map_err(|e| DomainError::Persistence(format!("blocking task failed: {e}")))?
    }

    /// Best-effort publish. The state change is already committed; a failed
    /// dispatch is logged and never surfaced to the caller.
    async fn emit(&self, event: OrderEvent) {
        if let Err(e) = self.notifier.dispatch(&event).await {
            log::warn!(
                "event {} for order {} not delivered: {}",
                event.kind.as_str(),
                event.order_id,
                e
            );
        }
    }
}
