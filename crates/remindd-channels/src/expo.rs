//! Expo push channel.
//!
//! Single HTTP POST to Expo's public push endpoint — no credential setup.
//! Expo can accept the HTTP request yet fail the individual ticket, so a 2xx
//! response still needs its body inspected.

use async_trait::async_trait;
use remindd_core::{RemindError, Result};
use serde_json::Value;

use crate::router::token_snippet;
use crate::PushChannel;

const EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";
const SEND_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

pub struct ExpoChannel {
    client: reqwest::Client,
    /// Log the would-be send and skip the network entirely.
    simulate: bool,
}

impl ExpoChannel {
    pub fn new(simulate: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            simulate,
        }
    }
}

/// Request body for one push message.
fn push_payload(token: &str, title: &str, body: &str) -> Value {
    serde_json::json!({
        "to": token,
        "title": title,
        "body": body,
        "sound": "default",
    })
}

/// Extract a per-ticket error from a 2xx response body.
///
/// Expo returns `{"data": {...}}` for a single message and `{"data": [...]}`
/// for batches; either way a ticket with `"status": "error"` is a failed send.
fn ticket_error(response: &Value) -> Option<String> {
    let data = response.get("data")?;
    let ticket = match data {
        Value::Array(tickets) => tickets.first()?,
        other => other,
    };
    if ticket.get("status").and_then(Value::as_str) == Some("error") {
        let message = ticket
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown ticket error");
        Some(message.to_string())
    } else {
        None
    }
}

#[async_trait]
impl PushChannel for ExpoChannel {
    fn name(&self) -> &str {
        "expo"
    }

    async fn send(&self, token: &str, title: &str, body: &str) -> Result<()> {
        if self.simulate {
            tracing::info!(
                "🧪 [simulate] Expo push skipped: {} | {title}",
                token_snippet(token)
            );
            return Ok(());
        }

        let resp = self
            .client
            .post(EXPO_PUSH_URL)
            .json(&push_payload(token, title, body))
            .timeout(SEND_TIMEOUT)
            .send()
            .await
            .map_err(|e| RemindError::Channel(format!("Expo send failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemindError::Http(format!("Expo API error {status}: {body}")));
        }

        let response: Value = resp
            .json()
            .await
            .map_err(|e| RemindError::Channel(format!("Expo response decode failed: {e}")))?;
        if let Some(message) = ticket_error(&response) {
            return Err(RemindError::Ticket(format!("Expo ticket error: {message}")));
        }

        tracing::info!("✅ Expo push sent: {}", token_snippet(token));
        Ok(())
    }
}
