//! Order lifecycle transitions as a pure function over
//! (current order, requested action, actor). No I/O happens here; the
//! persistence layer re-checks the expected prior state with a conditional
//! update, so this module only decides what a transition *would* produce.

use uuid::Uuid;

use super::errors::DomainError;
use super::order::{Actor, Order, OrderStatus, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Approve,
    Reject,
    Assign { courier_id: Uuid },
    Deliver,
}

impl OrderAction {
    /// Parse the vendor decision carried by `PATCH /orders/{id}/action`.
    pub fn parse_vendor_action(s: &str) -> Result<Self, DomainError> {
        match s {
            "approve" => Ok(OrderAction::Approve),
            "reject" => Ok(OrderAction::Reject),
            other => Err(DomainError::InvalidAction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OrderAction::Approve => "approve",
            OrderAction::Reject => "reject",
            OrderAction::Assign { .. } => "assign",
            OrderAction::Deliver => "deliver",
        }
    }
}

/// Outcome of a permitted transition: the status to persist and, for
/// assignment, the courier to bind. The caller persists it conditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: OrderStatus,
    pub courier_id: Option<Uuid>,
}

pub fn transition(
    order: &Order,
    action: OrderAction,
    actor: &Actor,
) -> Result<Transition, DomainError> {
    match action {
        OrderAction::Approve | OrderAction::Reject => {
            if actor.role != Role::Vendor || actor.id != order.vendor_id {
                return Err(DomainError::Forbidden(
                    "only the vendor this order was placed with may decide it".to_string(),
                ));
            }
            if order.status != OrderStatus::PendingVendor {
                return Err(invalid_state(order, action));
            }
            let next = if action == OrderAction::Approve {
                OrderStatus::Approved
            } else {
                OrderStatus::Rejected
            };
            Ok(Transition {
                next,
                courier_id: None,
            })
        }
        OrderAction::Assign { courier_id } => {
            if actor.role != Role::Courier || actor.id != courier_id {
                return Err(DomainError::Forbidden(
                    "couriers may only assign themselves".to_string(),
                ));
            }
            if order.status != OrderStatus::Approved {
                return Err(invalid_state(order, action));
            }
            Ok(Transition {
                next: OrderStatus::EnRoute,
                courier_id: Some(courier_id),
            })
        }
        OrderAction::Deliver => {
            if order.status != OrderStatus::EnRoute {
                return Err(invalid_state(order, action));
            }
            if order.courier_id != Some(actor.id) {
                return Err(DomainError::Forbidden(
                    "courier is not assigned to this order".to_string(),
                ));
            }
            Ok(Transition {
                next: OrderStatus::Delivered,
                courier_id: None,
            })
        }
    }
}

fn invalid_state(order: &Order, action: OrderAction) -> DomainError {
    DomainError::InvalidState {
        current: order.status,
        action: action.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            courier_id: None,
            status,
            total_price: BigDecimal::from_str("25.00").unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            items: vec![],
        }
    }

    fn vendor_of(o: &Order) -> Actor {
        Actor {
            id: o.vendor_id,
            role: Role::Vendor,
        }
    }

    fn courier(id: Uuid) -> Actor {
        Actor {
            id,
            role: Role::Courier,
        }
    }

    #[test]
    fn vendor_approves_pending_order() {
        let o = order(OrderStatus::PendingVendor);
        let t = transition(&o, OrderAction::Approve, &vendor_of(&o)).unwrap();
        assert_eq!(t.next, OrderStatus::Approved);
        assert_eq!(t.courier_id, None);
    }

    #[test]
    fn vendor_rejects_pending_order() {
        let o = order(OrderStatus::PendingVendor);
        let t = transition(&o, OrderAction::Reject, &vendor_of(&o)).unwrap();
        assert_eq!(t.next, OrderStatus::Rejected);
    }

    #[test]
    fn other_vendor_cannot_decide() {
        let o = order(OrderStatus::PendingVendor);
        let stranger = Actor {
            id: Uuid::new_v4(),
            role: Role::Vendor,
        };
        let err = transition(&o, OrderAction::Approve, &stranger).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[test]
    fn customer_cannot_decide_own_order() {
        let o = order(OrderStatus::PendingVendor);
        let actor = Actor {
            id: o.vendor_id,
            role: Role::Customer,
        };
        let err = transition(&o, OrderAction::Approve, &actor).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[test]
    fn approve_outside_pending_vendor_is_invalid_state() {
        for status in [
            OrderStatus::Approved,
            OrderStatus::Rejected,
            OrderStatus::AwaitingCourier,
            OrderStatus::EnRoute,
            OrderStatus::Delivered,
        ] {
            let o = order(status);
            let err = transition(&o, OrderAction::Approve, &vendor_of(&o)).unwrap_err();
            match err {
                DomainError::InvalidState { current, ref action } => {
                    assert_eq!(current, status);
                    assert_eq!(action, "approve");
                }
                other => panic!("expected InvalidState, got {other:?}"),
            }
        }
    }

    #[test]
    fn courier_assigns_approved_order() {
        let o = order(OrderStatus::Approved);
        let courier_id = Uuid::new_v4();
        let t = transition(
            &o,
            OrderAction::Assign { courier_id },
            &courier(courier_id),
        )
        .unwrap();
        assert_eq!(t.next, OrderStatus::EnRoute);
        assert_eq!(t.courier_id, Some(courier_id));
    }

    #[test]
    fn courier_cannot_assign_somebody_else() {
        let o = order(OrderStatus::Approved);
        let err = transition(
            &o,
            OrderAction::Assign {
                courier_id: Uuid::new_v4(),
            },
            &courier(Uuid::new_v4()),
        )
        .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[test]
    fn assign_from_pending_is_invalid_state() {
        let o = order(OrderStatus::PendingVendor);
        let id = Uuid::new_v4();
        let err = transition(&o, OrderAction::Assign { courier_id: id }, &courier(id)).unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE");
    }

    #[test]
    fn awaiting_courier_does_not_accept_assignment() {
        // Vestigial stored status: readable, but not a legal source state.
        let o = order(OrderStatus::AwaitingCourier);
        let id = Uuid::new_v4();
        let err = transition(&o, OrderAction::Assign { courier_id: id }, &courier(id)).unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE");
    }

    #[test]
    fn assigned_courier_delivers() {
        let mut o = order(OrderStatus::EnRoute);
        let id = Uuid::new_v4();
        o.courier_id = Some(id);
        let t = transition(&o, OrderAction::Deliver, &courier(id)).unwrap();
        assert_eq!(t.next, OrderStatus::Delivered);
    }

    #[test]
    fn wrong_courier_cannot_deliver_even_en_route() {
        let mut o = order(OrderStatus::EnRoute);
        o.courier_id = Some(Uuid::new_v4());
        let err = transition(&o, OrderAction::Deliver, &courier(Uuid::new_v4())).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[test]
    fn deliver_from_delivered_is_invalid_state() {
        let mut o = order(OrderStatus::Delivered);
        let id = Uuid::new_v4();
        o.courier_id = Some(id);
        let err = transition(&o, OrderAction::Deliver, &courier(id)).unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE");
    }

    #[test]
    fn unknown_vendor_action_string_is_rejected() {
        let err = OrderAction::parse_vendor_action("cancel").unwrap_err();
        assert_eq!(err.code(), "INVALID_ACTION");
    }
}
