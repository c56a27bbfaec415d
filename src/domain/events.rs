use uuid::Uuid;

/// Lifecycle events published after a state change commits. Delivery is
/// best-effort; a failed publish is logged and never fails the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEventKind {
    Placed,
    Approved,
    Rejected,
    Assigned,
    Delivered,
}

impl OrderEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderEventKind::Placed => "order.placed",
            OrderEventKind::Approved => "order.approved",
            OrderEventKind::Rejected => "order.rejected",
            OrderEventKind::Assigned => "order.assigned",
            OrderEventKind::Delivered => "order.delivered",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderEvent {
    pub kind: OrderEventKind,
    pub order_id: Uuid,
    /// Recipient of the customer-facing notification.
    pub customer_id: Uuid,
    pub courier_id: Option<Uuid>,
}

impl OrderEvent {
    pub fn message(&self) -> String {
        match self.kind {
            OrderEventKind::Placed => format!("Your order {} has been placed", self.order_id),
            OrderEventKind::Approved => format!("Your order {} was approved", self.order_id),
            OrderEventKind::Rejected => format!("Your order {} was rejected", self.order_id),
            OrderEventKind::Assigned => {
                format!("A courier is on the way with order {}", self.order_id)
            }
            OrderEventKind::Delivered => format!("Your order {} was delivered", self.order_id),
        }
    }
}
