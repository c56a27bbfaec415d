use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::errors::DomainError;
use crate::domain::events::OrderEvent;
use crate::domain::ports::NotificationDispatcher;

use super::courier_client::map_transport_error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Fire-and-forget dispatch to the notification service. The core does not
/// depend on any response contract beyond "the request went out"; retry and
/// channel fallback live on the notification side.
pub struct HttpNotificationDispatcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNotificationDispatcher {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build notification HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl NotificationDispatcher for HttpNotificationDispatcher {
    async fn dispatch(&self, event: &OrderEvent) -> Result<(), DomainError> {
        let url = format!("{}/notifications", self.base_url);
        let payload = json!({
            "userId": event.customer_id,
            "type": event.kind.as_str(),
            "channel": "push",
            "to": event.customer_id.to_string(),
            "message": event.message(),
        });

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| map_transport_error("notification service", e))?;

        if !resp.status().is_success() {
            return Err(DomainError::DependencyUnavailable(format!(
                "notification service returned {}",
                resp.status()
            )));
        }
        Ok(())
    }
}
