mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::RelayError;
use defaults::*;

/// Top-level Recepta configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
}

/// General agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Path to a system-prompt override file. Empty = embedded default.
    #[serde(default)]
    pub prompt_path: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            prompt_path: String::new(),
        }
    }
}

/// HTTP server configuration for the webhook surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Shared secret for the GET /webhook verification handshake.
    /// Empty = verification always rejected.
    #[serde(default)]
    pub verify_token: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            verify_token: String::new(),
        }
    }
}

/// Provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,
}

/// OpenAI-compatible completion endpoint config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// Sampling temperature. Low keeps the receptionist on script.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_openai_model(),
            base_url: default_openai_base_url(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Channel configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub zapi: ZapiConfig,
}

/// Z-API WhatsApp gateway config. The instance id and token are path
/// components of the send endpoint; `client_token` is an optional extra
/// header some accounts require.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZapiConfig {
    #[serde(default = "default_zapi_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub instance_id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub client_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ZapiConfig {
    fn default() -> Self {
        Self {
            base_url: default_zapi_base_url(),
            instance_id: String::new(),
            token: String::new(),
            client_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Load configuration from a TOML file, then apply env-var overrides.
///
/// Falls back to defaults if the file does not exist. Secrets belong in the
/// environment, never in source.
pub fn load(path: &str) -> Result<Config, RelayError> {
    let path = Path::new(path);
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| RelayError::Config(format!("failed to parse config: {e}")))?
    } else {
        tracing::info!("config file not found at {}, using defaults", path.display());
        Config::default()
    };

    config.apply_env_overrides();
    Ok(config)
}

impl Config {
    /// Override secret-bearing fields from the environment.
    pub fn apply_env_overrides(&mut self) {
        env_override(&mut self.provider.openai.api_key, "OPENAI_API_KEY");
        env_override(&mut self.channel.zapi.instance_id, "ZAPI_INSTANCE_ID");
        env_override(&mut self.channel.zapi.token, "ZAPI_TOKEN");
        env_override(&mut self.channel.zapi.client_token, "ZAPI_CLIENT_TOKEN");
        env_override(&mut self.api.verify_token, "WEBHOOK_VERIFY_TOKEN");
    }
}

fn env_override(target: &mut String, var: &str) {
    if let Ok(value) = std::env::var(var) {
        if !value.is_empty() {
            *target = value;
        }
    }
}
