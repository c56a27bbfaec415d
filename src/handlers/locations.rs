use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::location_relay::LocationRelay;
use crate::domain::location::{LocationRecord, LocationUpdate};
use crate::domain::order::{Actor, Role};
use crate::errors::AppError;

use super::actor::require_role;

// ── DTOs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishLocationRequest {
    pub order_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
}

/// Event payload delivered to subscribers of `order-{id}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationEvent {
    pub order_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl From<LocationUpdate> for LocationEvent {
    fn from(u: LocationUpdate) -> Self {
        LocationEvent {
            order_id: u.order_id,
            latitude: u.latitude,
            longitude: u.longitude,
            user_id: u.user_id,
            timestamp: u.timestamp,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecordResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_id: Option<Uuid>,
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_at: String,
}

impl From<LocationRecord> for LocationRecordResponse {
    fn from(r: LocationRecord) -> Self {
        LocationRecordResponse {
            id: r.id,
            user_id: r.user_id,
            order_id: r.order_id,
            latitude: r.latitude,
            longitude: r.longitude,
            recorded_at: r.recorded_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /locations
///
/// Courier position update: validated, broadcast to the order's subscribers,
/// and appended to history.
#[utoipa::path(
    post,
    path = "/locations",
    request_body = PublishLocationRequest,
    responses(
        (status = 201, description = "Location accepted", body = LocationEvent),
        (status = 400, description = "Coordinates out of range"),
        (status = 403, description = "Caller is not a courier"),
    ),
    tag = "locations"
)]
pub async fn publish_location(
    relay: web::Data<LocationRelay>,
    actor: Actor,
    body: web::Json<PublishLocationRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&actor, Role::Courier)?;
    let body = body.into_inner();

    let update = LocationUpdate {
        order_id: body.order_id,
        user_id: actor.id,
        latitude: body.latitude,
        longitude: body.longitude,
        timestamp: Utc::now(),
    };
    let record = relay.publish(update).await.map_err(AppError)?;

    // When a store is wired in, echo the persisted row (with its id and
    // recorded_at) instead of the in-memory event.
    let body = match record {
        Some(record) => serde_json::json!({
            "success": true,
            "location": LocationRecordResponse::from(record),
        }),
        None => serde_json::json!({
            "success": true,
            "location": LocationEvent::from(update),
        }),
    };
    Ok(HttpResponse::Created().json(body))
}

/// GET /locations/{userId}
///
/// The 50 most recent fixes for a user, newest first.
#[utoipa::path(
    get,
    path = "/locations/{user_id}",
    params(("user_id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 200, description = "Recent locations", body = [LocationRecordResponse]),
    ),
    tag = "locations"
)]
pub async fn location_history(
    relay: web::Data<LocationRelay>,
    _actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let records = relay
        .recent_for_user(path.into_inner())
        .await
        .map_err(AppError)?;
    let records: Vec<LocationRecordResponse> =
        records.into_iter().map(LocationRecordResponse::from).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "locations": records,
    })))
}

/// GET /locations/subscribe/{orderId}
///
/// Server-sent event stream of position updates for one order. The
/// subscription ends when the client disconnects; a slow consumer that
/// overflows the channel skips the missed updates rather than erroring out.
#[utoipa::path(
    get,
    path = "/locations/subscribe/{order_id}",
    params(("order_id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "text/event-stream of LocationEvent payloads"),
    ),
    tag = "locations"
)]
pub async fn subscribe_order(
    relay: web::Data<LocationRelay>,
    _actor: Actor,
    path: web::Path<Uuid>,
) -> HttpResponse {
    let rx = relay.join(path.into_inner());

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(update) => {
                    let Ok(payload) = serde_json::to_string(&LocationEvent::from(update)) else {
                        continue;
                    };
                    let chunk = web::Bytes::from(format!("data: {payload}\n\n"));
                    return Some((Ok::<_, actix_web::Error>(chunk), rx));
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream)
}
