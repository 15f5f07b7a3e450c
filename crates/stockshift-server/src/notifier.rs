//! Webhook delivery of transfer events.
//!
//! `notify` only schedules the POST; delivery runs on a spawned task so the
//! lifecycle request never waits on the webhook. Delivery failures are logged.

use std::time::Duration;

use reqwest::Client;
use stockshift_core::{NotifyError, Notifier, TransferEvent};

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    /// # Errors
    ///
    /// Returns [`NotifyError::Transport`] if the HTTP client cannot be built.
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("stockshift/0.1 (transfer-notifications)")
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }

    /// POST one event and wait for the response.
    ///
    /// # Errors
    ///
    /// [`NotifyError::Transport`] on network failure, [`NotifyError::Status`]
    /// on a non-2xx response.
    pub async fn deliver(&self, event: &TransferEvent) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Status(status.as_u16()))
        }
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, event: &TransferEvent) -> Result<(), NotifyError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| NotifyError::Transport(format!("no async runtime: {e}")))?;

        let notifier = self.clone();
        let event = event.clone();
        handle.spawn(async move {
            match notifier.deliver(&event).await {
                Ok(()) => tracing::debug!(
                    suggestion_id = %event.suggestion_id,
                    action = event.action.as_str(),
                    "transfer notification delivered"
                ),
                Err(e) => tracing::error!(
                    suggestion_id = %event.suggestion_id,
                    action = event.action.as_str(),
                    error = %e,
                    "transfer notification failed"
                ),
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use stockshift_core::TransferAction;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn event() -> TransferEvent {
        TransferEvent {
            suggestion_id: "ts-001".to_string(),
            action: TransferAction::Approved,
            actor: "alice".to_string(),
            from_store_id: "store-006".to_string(),
            from_store_name: "Supercenter - Houston".to_string(),
            to_store_id: "store-003".to_string(),
            to_store_name: "Suburbs Supercenter".to_string(),
            sku: "SKU-1001".to_string(),
            product_name: "iPhone 14 Pro".to_string(),
            quantity: 160,
            estimated_savings: 320.0,
            reason: "High surplus matched with critical shortage".to_string(),
            rejection_reason: None,
            tracking_code: Some("TRK-ts-001-42".to_string()),
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn deliver_posts_event_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/transfers"))
            .and(body_partial_json(serde_json::json!({
                "suggestion_id": "ts-001",
                "action": "approved",
                "actor": "alice",
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let notifier =
            WebhookNotifier::new(&format!("{}/hooks/transfers", server.uri()), 5).expect("client");
        notifier.deliver(&event()).await.expect("delivered");
    }

    #[tokio::test]
    async fn deliver_surfaces_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(&server.uri(), 5).expect("client");
        let err = notifier.deliver(&event()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Status(500)));
    }

    #[tokio::test]
    async fn notify_dispatches_in_background() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(&server.uri(), 5).expect("client");
        notifier.notify(&event()).expect("scheduled");

        let mut received = 0;
        for _ in 0..50 {
            received = server.received_requests().await.map_or(0, |r| r.len());
            if received > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(received, 1);
    }

    #[test]
    fn notify_without_runtime_is_an_error() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9", 1).expect("client");
        assert!(matches!(
            notifier.notify(&event()),
            Err(NotifyError::Transport(_))
        ));
    }
}
