use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{CourierDirectory, CourierStanding};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Courier lookups against the courier service's HTTP API.
pub struct HttpCourierDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCourierDirectory {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build courier HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CourierStatusBody {
    status: String,
}

pub(crate) fn map_transport_error(service: &str, e: reqwest::Error) -> DomainError {
    if e.is_timeout() {
        DomainError::DependencyTimeout(service.to_string())
    } else {
        DomainError::DependencyUnavailable(format!("{service}: {e}"))
    }
}

#[async_trait]
impl CourierDirectory for HttpCourierDirectory {
    async fn fetch_standing(
        &self,
        courier_id: Uuid,
    ) -> Result<Option<CourierStanding>, DomainError> {
        let url = format!("{}/couriers/{}", self.base_url, courier_id);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| map_transport_error("courier service", e))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(DomainError::DependencyUnavailable(format!(
                "courier service returned {}",
                resp.status()
            )));
        }

        let body: CourierStatusBody = resp
            .json()
            .await
            .map_err(|e| map_transport_error("courier service", e))?;

        match body.status.as_str() {
            "pending" => Ok(Some(CourierStanding::Pending)),
            "approved" => Ok(Some(CourierStanding::Approved)),
            "rejected" => Ok(Some(CourierStanding::Rejected)),
            other => Err(DomainError::DependencyUnavailable(format!(
                "courier service reported unknown status '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connection_failure_maps_to_dependency_unavailable() {
        // Port 1 is unassigned; the connect fails without timing out.
        let directory = HttpCourierDirectory::new("http://127.0.0.1:1");
        let err = directory.fetch_standing(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), "DEPENDENCY_UNAVAILABLE");
    }

    #[tokio::test]
    async fn silent_upstream_maps_to_dependency_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections but never answer, so the client waits out its
        // request timeout.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let directory = HttpCourierDirectory::new(&format!("http://{addr}"));
        let err = directory.fetch_standing(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), "DEPENDENCY_TIMEOUT");
    }
}
