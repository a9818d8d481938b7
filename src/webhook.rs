//! Delivery of payloads to a Slack incoming webhook

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::{NotifyError, Result};
use crate::payload::Payload;

/// Acknowledgement text Slack returns for an accepted message
pub const ACK_OK: &str = "ok";

/// Arguments applied to every message sent through the webhook.
/// Keys set in the payload itself take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Transport able to POST a JSON body and return the raw acknowledgement text
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post(&self, url: &str, body: &Value) -> Result<String>;
}

/// reqwest-backed transport
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn post(&self, url: &str, body: &Value) -> Result<String> {
        let response = self.client.post(url).json(body).send().await?;
        debug!("Webhook responded with HTTP {}", response.status());
        Ok(response.text().await?)
    }
}

/// Merge the webhook defaults with the payload; payload keys win.
pub fn merge_defaults(defaults: &WebhookDefaults, payload: &Payload) -> Result<Value> {
    let mut merged = serde_json::to_value(defaults)?;
    let payload = serde_json::to_value(payload)?;

    if let (Value::Object(target), Value::Object(source)) = (&mut merged, payload) {
        target.extend(source);
    }
    Ok(merged)
}

/// Send the payload and check Slack's acknowledgement.
/// Anything other than exactly `ok` is a delivery error carrying the raw text.
pub async fn send(
    transport: &dyn WebhookTransport,
    url: &str,
    defaults: &WebhookDefaults,
    payload: &Payload,
) -> Result<()> {
    let body = merge_defaults(defaults, payload)?;
    let ack = transport.post(url, &body).await?;

    if ack != ACK_OK {
        error!("Slack rejected the notification: {}", ack);
        return Err(NotifyError::Delivery(ack));
    }
    info!("Notification delivered to Slack");
    Ok(())
}
