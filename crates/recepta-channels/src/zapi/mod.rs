//! Z-API WhatsApp gateway adapter.
//!
//! Outbound: one POST per reply to the provider's `send-text` endpoint,
//! addressed by two secret path components (instance id + token).
//! Inbound payload interpretation lives in [`extract`].

pub mod extract;

use async_trait::async_trait;
use recepta_core::{config::ZapiConfig, error::RelayError, phone, traits::Channel};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Z-API WhatsApp channel.
pub struct ZapiChannel {
    client: reqwest::Client,
    base_url: String,
    instance_id: String,
    token: String,
    /// Extra `Client-Token` header some Z-API accounts require.
    client_token: Option<String>,
}

impl ZapiChannel {
    /// Create from config values.
    pub fn from_config(cfg: &ZapiConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| RelayError::Channel(format!("failed to build http client: {e}")))?;

        let client_token = if cfg.client_token.is_empty() {
            None
        } else {
            Some(cfg.client_token.clone())
        };

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            instance_id: cfg.instance_id.clone(),
            token: cfg.token.clone(),
            client_token,
        })
    }

    fn send_url(&self) -> String {
        format!(
            "{}/instances/{}/token/{}/send-text",
            self.base_url, self.instance_id, self.token
        )
    }
}

#[async_trait]
impl Channel for ZapiChannel {
    fn name(&self) -> &str {
        "zapi"
    }

    /// Send a text message. The destination is re-normalized here since
    /// callers arrive with mixed `+`-prefixed and bare-digit forms.
    async fn send_text(&self, phone: &str, message: &str) -> Result<(), RelayError> {
        let to = phone::normalize(phone);
        if to.is_empty() {
            return Err(RelayError::Channel("empty destination phone".to_string()));
        }

        let url = self.send_url();
        debug!("zapi: sending to {to}");

        let mut request = self.client.post(&url).json(&json!({
            "phone": to,
            "message": message,
        }));
        if let Some(ref ct) = self.client_token {
            request = request.header("Client-Token", ct);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| RelayError::Channel(format!("zapi send failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Channel(format!(
                "zapi send failed ({status}): {body}"
            )));
        }

        Ok(())
    }
}
