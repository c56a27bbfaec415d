use std::future::{ready, Ready};
use std::str::FromStr;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Actor, Role};
use crate::errors::AppError;

/// The gateway authenticates callers and forwards the resulting identity in
/// headers; this service trusts them and never sees credentials.
const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";

fn actor_from_request(req: &HttpRequest) -> Result<Actor, AppError> {
    let id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError(DomainError::Unauthorized(
                "missing authenticated user id".to_string(),
            ))
        })?;
    let id = Uuid::parse_str(id).map_err(|_| {
        AppError(DomainError::Unauthorized(
            "malformed authenticated user id".to_string(),
        ))
    })?;

    let role = req
        .headers()
        .get(USER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError(DomainError::Unauthorized(
                "missing authenticated role".to_string(),
            ))
        })?;
    let role = Role::from_str(role).map_err(AppError)?;

    Ok(Actor { id, role })
}

impl FromRequest for Actor {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(actor_from_request(req))
    }
}

/// Route-level role gate, the moral equivalent of the gateway's
/// `requireRole` middleware.
pub fn require_role(actor: &Actor, role: Role) -> Result<(), AppError> {
    if actor.role == role {
        Ok(())
    } else {
        Err(AppError(DomainError::Forbidden(format!(
            "requires the {} role",
            match role {
                Role::Customer => "customer",
                Role::Vendor => "vendor",
                Role::Courier => "courier",
                Role::Admin => "admin",
            }
        ))))
    }
}
