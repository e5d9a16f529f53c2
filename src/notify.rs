//! Push-notification hook, fired on invitation creation.
//!
//! Fire-and-forget: delivery failure is logged and discarded, never rolling
//! back the invitation that triggered it.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, device_token: &str, title: &str, body: &str);
}

#[derive(Serialize)]
struct PushMessage<'a> {
    to: &'a str,
    title: &'a str,
    body: &'a str,
}

/// Delivers over HTTP to the configured push gateway.
pub struct PushGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl PushGateway {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Notifier for PushGateway {
    async fn notify(&self, device_token: &str, title: &str, body: &str) {
        let message = PushMessage {
            to: device_token,
            title,
            body,
        };
        let result = self
            .client
            .post(&self.endpoint)
            .json(&message)
            .send()
            .await
            .and_then(|resp| resp.error_for_status());
        match result {
            Ok(_) => tracing::debug!(title, "notification sent"),
            Err(err) => tracing::warn!(%err, "notification delivery failed"),
        }
    }
}

/// Used when no gateway is configured, and in tests.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _device_token: &str, _title: &str, _body: &str) {}
}

/// TASKBOARD_PUSH_URL selects the HTTP gateway; unset means notifications
/// are dropped silently.
pub fn from_env() -> Arc<dyn Notifier> {
    match std::env::var("TASKBOARD_PUSH_URL") {
        Ok(endpoint) if !endpoint.is_empty() => Arc::new(PushGateway::new(endpoint)),
        _ => Arc::new(NoopNotifier),
    }
}
