use crate::{context::Context, error::RelayError};
use async_trait::async_trait;

/// Completion provider trait — the brain.
///
/// Given a context, returns the model's raw text reply. The reply is opaque
/// here; splitting it into the message/action blocks happens downstream.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Run one completion. A single attempt, no retry; callers absorb
    /// failures with a canned fallback.
    async fn complete(&self, context: &Context) -> Result<String, RelayError>;

    /// Check if the provider is reachable and configured.
    async fn is_available(&self) -> bool;
}

/// Messaging channel trait — the outbound leg.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Send a text message to a phone number. Implementations re-normalize
    /// the destination, so callers may pass `+`-prefixed or bare digits.
    async fn send_text(&self, phone: &str, message: &str) -> Result<(), RelayError>;
}
