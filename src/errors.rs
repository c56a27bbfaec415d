use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// HTTP-facing wrapper around [`DomainError`]. Every response carries a
/// stable `errorCode`; internal detail is exposed only in debug builds.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct AppError(#[from] pub DomainError);

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            DomainError::InvalidInput(_)
            | DomainError::InvalidItemFormat(_)
            | DomainError::InvalidAction(_)
            | DomainError::InvalidState { .. } => StatusCode::BAD_REQUEST,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::DependencyUnavailable(_) => StatusCode::BAD_GATEWAY,
            DomainError::DependencyTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DomainError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match &self.0 {
            // Storage detail never leaves a release build.
            DomainError::Persistence(_) if !cfg!(debug_assertions) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({
            "success": false,
            "error": message,
            "errorCode": self.0.code(),
        });
        if cfg!(debug_assertions) {
            body["details"] = json!(format!("{:?}", self.0));
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}
