use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

/// Persisted order status. `AwaitingCourier` is still decodable for legacy
/// rows but no transition accepts or produces it; assignment moves an order
/// from `Approved` straight to `EnRoute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    PendingVendor,
    Approved,
    Rejected,
    AwaitingCourier,
    EnRoute,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingVendor => "PENDING_VENDOR",
            OrderStatus::Approved => "APPROVED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::AwaitingCourier => "AWAITING_COURIER",
            OrderStatus::EnRoute => "EN_ROUTE",
            OrderStatus::Delivered => "DELIVERED",
        }
    }

    /// Terminal orders accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Rejected | OrderStatus::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_VENDOR" => Ok(OrderStatus::PendingVendor),
            "APPROVED" => Ok(OrderStatus::Approved),
            "REJECTED" => Ok(OrderStatus::Rejected),
            "AWAITING_COURIER" => Ok(OrderStatus::AwaitingCourier),
            "EN_ROUTE" => Ok(OrderStatus::EnRoute),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            other => Err(DomainError::Persistence(format!(
                "unknown order status '{other}' in storage"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Vendor,
    Courier,
    Admin,
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "vendor" => Ok(Role::Vendor),
            "courier" => Ok(Role::Courier),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::Unauthorized(format!("unknown role '{other}'"))),
        }
    }
}

/// Authenticated identity attached by upstream middleware. The core trusts
/// it; credential validation happens at the gateway.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    pub courier_id: Option<Uuid>,
    pub status: OrderStatus,
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

/// Validate an item list and return the order total (Σ price × quantity).
/// The total is computed exactly once, here, and never recalculated.
pub fn validate_items(items: &[OrderItemInput]) -> Result<BigDecimal, DomainError> {
    if items.is_empty() {
        return Err(DomainError::InvalidInput(
            "order must contain at least one item".to_string(),
        ));
    }

    let mut total = BigDecimal::zero();
    for item in items {
        if item.quantity < 1 {
            return Err(DomainError::InvalidItemFormat(format!(
                "quantity must be a positive integer, got {}",
                item.quantity
            )));
        }
        if item.price < BigDecimal::zero() {
            return Err(DomainError::InvalidItemFormat(format!(
                "price must be non-negative, got {}",
                item.price
            )));
        }
        total += &item.price * BigDecimal::from(item.quantity);
    }
    Ok(total)
}
