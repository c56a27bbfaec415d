use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::domain::errors::DomainError;
use crate::domain::order::{Actor, Order, OrderItemInput, Role};
use crate::errors::AppError;

use super::actor::require_role;

// ── Request / response DTOs ──────────────────────────────────────────────────

/// Item price on the wire: the web clients send plain JSON numbers (9.99),
/// precision-minded callers may send a decimal string ("9.99").
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PriceValue {
    Text(String),
    Number(f64),
}

impl PriceValue {
    fn to_decimal(&self) -> Result<BigDecimal, AppError> {
        let parsed = match self {
            PriceValue::Text(s) => BigDecimal::from_str(s).ok(),
            // Shortest round-trip formatting recovers the decimal the client
            // wrote rather than the f64's binary expansion.
            PriceValue::Number(n) if n.is_finite() => BigDecimal::from_str(&n.to_string()).ok(),
            PriceValue::Number(_) => None,
        };
        parsed.ok_or_else(|| {
            let shown = match self {
                PriceValue::Text(s) => s.clone(),
                PriceValue::Number(n) => n.to_string(),
            };
            AppError(DomainError::InvalidItemFormat(format!(
                "price '{shown}' is not a decimal number"
            )))
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: PriceValue,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Defaults to the authenticated customer; if present it must match.
    pub customer_id: Option<Uuid>,
    pub vendor_id: Uuid,
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VendorActionRequest {
    /// "approve" or "reject"
    pub action: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignCourierRequest {
    pub courier_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    pub courier_id: Option<Uuid>,
    pub status: String,
    pub total_price: String,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderEnvelope {
    pub success: bool,
    pub order: OrderResponse,
}

impl From<Order> for OrderEnvelope {
    fn from(order: Order) -> Self {
        OrderEnvelope {
            success: true,
            order: OrderResponse {
                id: order.id,
                customer_id: order.customer_id,
                vendor_id: order.vendor_id,
                courier_id: order.courier_id,
                status: order.status.as_str().to_string(),
                total_price: order.total_price.to_string(),
                created_at: order.created_at.to_rfc3339(),
                updated_at: order.updated_at.to_rfc3339(),
                items: order
                    .items
                    .into_iter()
                    .map(|i| OrderItemResponse {
                        id: i.id,
                        product_id: i.product_id,
                        quantity: i.quantity,
                        price: i.price.to_string(),
                    })
                    .collect(),
            },
        }
    }
}

fn parse_items(items: Vec<CreateOrderItemRequest>) -> Result<Vec<OrderItemInput>, AppError> {
    items
        .into_iter()
        .map(|i| {
            let price = i.price.to_decimal()?;
            Ok(OrderItemInput {
                product_id: i.product_id,
                quantity: i.quantity,
                price,
            })
        })
        .collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places a new order for the authenticated customer. The order and all of
/// its items are inserted in one transaction; the total is computed here,
/// once, and never recalculated.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderEnvelope),
        (status = 400, description = "INVALID_INPUT or INVALID_ITEM_FORMAT"),
        (status = 403, description = "Caller is not a customer"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrderService>,
    actor: Actor,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&actor, Role::Customer)?;
    let body = body.into_inner();

    if matches!(body.customer_id, Some(id) if id != actor.id) {
        return Err(AppError(DomainError::Forbidden(
            "cannot place an order for another customer".to_string(),
        )));
    }

    let items = parse_items(body.items)?;
    let order = service
        .create_order(actor.id, body.vendor_id, items)
        .await
        .map_err(AppError)?;

    Ok(HttpResponse::Created().json(OrderEnvelope::from(order)))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderEnvelope),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<OrderService>,
    _actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = service.get_order(path.into_inner()).await.map_err(AppError)?;
    Ok(HttpResponse::Ok().json(OrderEnvelope::from(order)))
}

/// PATCH /orders/{id}/action
///
/// Vendor decision on a pending order: approve or reject.
#[utoipa::path(
    patch,
    path = "/orders/{id}/action",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = VendorActionRequest,
    responses(
        (status = 200, description = "Decision applied", body = OrderEnvelope),
        (status = 400, description = "INVALID_STATE or INVALID_ACTION"),
        (status = 403, description = "Not the order's vendor"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn vendor_action(
    service: web::Data<OrderService>,
    actor: Actor,
    path: web::Path<Uuid>,
    body: web::Json<VendorActionRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&actor, Role::Vendor)?;
    let order = service
        .apply_vendor_action(path.into_inner(), &body.action, actor)
        .await
        .map_err(AppError)?;
    Ok(HttpResponse::Ok().json(OrderEnvelope::from(order)))
}

/// PATCH /orders/{id}/assign
///
/// Binds an approved courier to an approved order and moves it en route.
/// Under concurrent attempts exactly one caller wins; the rest observe
/// INVALID_STATE from the conditional update.
#[utoipa::path(
    patch,
    path = "/orders/{id}/assign",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = AssignCourierRequest,
    responses(
        (status = 200, description = "Courier assigned", body = OrderEnvelope),
        (status = 400, description = "INVALID_STATE"),
        (status = 403, description = "Courier not approved or not the caller"),
        (status = 404, description = "Order or courier not found"),
        (status = 502, description = "Courier service unavailable"),
        (status = 504, description = "Courier service timed out"),
    ),
    tag = "orders"
)]
pub async fn assign_courier(
    service: web::Data<OrderService>,
    actor: Actor,
    path: web::Path<Uuid>,
    body: web::Json<AssignCourierRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&actor, Role::Courier)?;
    let order = service
        .assign_courier(path.into_inner(), body.courier_id, actor)
        .await
        .map_err(AppError)?;
    Ok(HttpResponse::Ok().json(OrderEnvelope::from(order)))
}

/// PATCH /orders/{id}/delivered
#[utoipa::path(
    patch,
    path = "/orders/{id}/delivered",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order delivered", body = OrderEnvelope),
        (status = 400, description = "INVALID_STATE"),
        (status = 403, description = "Caller is not the assigned courier"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn mark_delivered(
    service: web::Data<OrderService>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_role(&actor, Role::Courier)?;
    let order = service
        .mark_delivered(path.into_inner(), actor)
        .await
        .map_err(AppError)?;
    Ok(HttpResponse::Ok().json(OrderEnvelope::from(order)))
}
