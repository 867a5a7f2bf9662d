//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Recepta".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_api_port() -> u16 {
    10000
}

pub fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

pub fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_temperature() -> f32 {
    0.2
}

pub fn default_zapi_base_url() -> String {
    "https://api.z-api.io".to_string()
}

pub fn default_timeout_secs() -> u64 {
    20
}
