//! OpenAI-compatible API provider.
//!
//! Works with OpenAI's API and any compatible chat-completion endpoint.
//! One request per inbound message, single attempt, bounded timeout.

use async_trait::async_trait;
use recepta_core::{
    config::OpenAiConfig,
    context::Context,
    error::RelayError,
    traits::Provider,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// OpenAI-compatible provider.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiProvider {
    /// Create from config values. The HTTP client carries the bounded
    /// timeout, so a hung endpoint aborts only its own request.
    pub fn from_config(cfg: &OpenAiConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| RelayError::Provider(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
        })
    }
}

/// Build OpenAI-format messages from context (system as a message role).
fn build_messages(context: &Context) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if !context.system_prompt.is_empty() {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: context.system_prompt.clone(),
        });
    }
    messages.push(ChatMessage {
        role: "user".to_string(),
        content: context.user_message.clone(),
    });
    messages
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, context: &Context) -> Result<String, RelayError> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: build_messages(context),
            temperature: self.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("openai: POST {url} model={}", self.model);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::Provider(format!("openai request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(RelayError::Provider(format!(
                "openai returned {status}: {text}"
            )));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| RelayError::Provider(format!("openai: failed to parse response: {e}")))?;

        parsed
            .choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .map(|m| m.content.trim().to_string())
            .ok_or_else(|| RelayError::Provider("openai: response had no choices".to_string()))
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_empty() {
            warn!("openai: no API key configured");
            return false;
        }
        // Basic check: try to list models.
        let url = format!("{}/models", self.base_url.trim_end_matches('/'));
        match self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("openai not available: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> OpenAiProvider {
        OpenAiProvider::from_config(&OpenAiConfig {
            api_key: "sk-test".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(test_provider().name(), "openai");
    }

    #[test]
    fn test_build_messages_system_then_user() {
        let ctx = Context::new("Seja a recepção.", "MENSAGEM DO PACIENTE:\nQuero agendar");
        let messages = build_messages(&ctx);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "Seja a recepção.");
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.starts_with("MENSAGEM DO PACIENTE:"));
    }

    #[test]
    fn test_build_messages_empty_system_omitted() {
        let ctx = Context::new("", "oi");
        let messages = build_messages(&ctx);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }

    #[test]
    fn test_request_body_carries_temperature() {
        let body = ChatCompletionRequest {
            model: "gpt-4o-mini".into(),
            messages: build_messages(&Context::new("sys", "oi")),
            temperature: 0.2,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 1e-6);
        assert_eq!(json["messages"][0]["role"], "system");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"WA_MSG:\n- Olá!"},"finish_reason":"stop"}],"model":"gpt-4o-mini"}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let text = resp
            .choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .map(|m| m.content.clone());
        assert_eq!(text.as_deref(), Some("WA_MSG:\n- Olá!"));
    }

    #[test]
    fn test_response_without_choices_is_none() {
        let resp: ChatCompletionResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.choices.is_none());
    }
}
