//! Inbound message pipeline.
//!
//! One webhook delivery flows through five steps: payload extraction,
//! phone normalization, completion request, reply parsing, delivery.
//! Every step degrades instead of failing: unusable payloads are ignored,
//! completion failures substitute the canned fallback, and delivery errors
//! are logged and swallowed. Nothing in here surfaces an error to the
//! webhook caller.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use recepta_channels::zapi::extract::{extract, Extraction};
use recepta_core::{
    context::Context,
    message::NormalizedMessage,
    phone,
    prompt::{UNSUPPORTED_MEDIA_NOTICE, USER_MESSAGE_PREFIX},
    traits::{Channel, Provider},
};

use crate::reply;

/// How one inbound payload was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The payload was processed (a reply may or may not have gone out).
    Ok,
    /// The payload was dropped, with the reason.
    Ignored(&'static str),
}

/// The relay pipeline: one provider in, one channel out, no state kept
/// between requests.
pub struct Gateway {
    provider: Arc<dyn Provider>,
    channel: Arc<dyn Channel>,
    system_prompt: String,
}

impl Gateway {
    pub fn new(
        provider: Arc<dyn Provider>,
        channel: Arc<dyn Channel>,
        system_prompt: String,
    ) -> Self {
        Self {
            provider,
            channel,
            system_prompt,
        }
    }

    /// Process one inbound webhook payload end to end.
    pub async fn handle_inbound(&self, payload: &Value) -> Outcome {
        let (sender, text) = match extract(payload) {
            Extraction::Ignored(reason) => {
                debug!("ignoring payload: {reason}");
                return Outcome::Ignored(reason);
            }
            Extraction::Unsupported { sender } => {
                return self.handle_unsupported(&sender).await;
            }
            Extraction::Message { sender, text } => (sender, text),
        };

        let canonical = phone::normalize(&sender);
        if !phone::is_plausible(&canonical) {
            warn!("dropping message with implausible sender {sender:?}");
            return Outcome::Ignored("implausible sender");
        }

        let msg = NormalizedMessage::new(canonical, text);
        info!(id = %msg.id, sender = %msg.sender, "inbound message");

        let context = Context::new(
            self.system_prompt.clone(),
            format!("{USER_MESSAGE_PREFIX}\n{}", msg.text),
        );

        let raw = match self.provider.complete(&context).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(id = %msg.id, "completion failed, using fallback reply: {e}");
                reply::fallback_reply(&e)
            }
        };

        let parsed = reply::parse_reply(&raw);
        info!(id = %msg.id, intent = ?parsed.action.intent, "parsed model reply");

        if parsed.message.is_empty() {
            // An empty reply block is a deliberate stay-silent, not a fault.
            warn!(id = %msg.id, "model reply had no message block, nothing to send");
            return Outcome::Ok;
        }

        self.deliver(&msg.sender, &parsed.message).await;
        Outcome::Ok
    }

    /// Media message from a real sender: answer with the text-only notice
    /// instead of going silent.
    async fn handle_unsupported(&self, sender: &str) -> Outcome {
        let canonical = phone::normalize(sender);
        if !phone::is_plausible(&canonical) {
            return Outcome::Ignored("implausible sender");
        }
        info!(sender = %canonical, "unsupported media, sending notice");
        self.deliver(&canonical, UNSUPPORTED_MEDIA_NOTICE).await;
        Outcome::Ok
    }

    /// Best-effort outbound send. A lost reply is logged, never propagated.
    async fn deliver(&self, to: &str, message: &str) {
        if let Err(e) = self.channel.send_text(to, message).await {
            error!(channel = self.channel.name(), "delivery to {to} failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use recepta_core::error::RelayError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockProvider {
        reply: Result<String, String>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn replying(raw: &str) -> Self {
            Self {
                reply: Ok(raw.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(msg: &str) -> Self {
            Self {
                reply: Err(msg.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, _context: &Context) -> Result<String, RelayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(RelayError::Provider)
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct MockChannel {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Channel for MockChannel {
        fn name(&self) -> &str {
            "mock"
        }

        async fn send_text(&self, phone: &str, message: &str) -> Result<(), RelayError> {
            self.sent
                .lock()
                .unwrap()
                .push((phone.to_string(), message.to_string()));
            Ok(())
        }
    }

    fn gateway(provider: Arc<MockProvider>) -> (Gateway, Arc<MockChannel>) {
        let channel = Arc::new(MockChannel::default());
        let gw = Gateway::new(provider, channel.clone(), "prompt de teste".to_string());
        (gw, channel)
    }

    fn inbound() -> Value {
        json!({ "phone": "5531999999999", "text": "Quero agendar uma avaliação" })
    }

    #[tokio::test]
    async fn test_message_flows_to_exactly_one_send() {
        let provider = Arc::new(MockProvider::replying(
            "WA_MSG:\n- Claro! Qual o melhor período para você?\n\nCRM_ACTION: {\"intent\":\"create_lead\",\"channel\":\"whatsapp\"}",
        ));
        let (gw, channel) = gateway(provider.clone());

        assert_eq!(gw.handle_inbound(&inbound()).await, Outcome::Ok);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+5531999999999");
        assert_eq!(sent[0].1, "Claro! Qual o melhor período para você?");
    }

    #[tokio::test]
    async fn test_provider_failure_sends_fallback() {
        let provider = Arc::new(MockProvider::failing("upstream timeout"));
        let (gw, channel) = gateway(provider);

        assert_eq!(gw.handle_inbound(&inbound()).await, Outcome::Ok);

        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("instabilidade"));
        // The action block stays on the relay side of the wire.
        assert!(!sent[0].1.contains("CRM_ACTION"));
    }

    #[tokio::test]
    async fn test_empty_reply_block_suppresses_send() {
        let provider = Arc::new(MockProvider::replying(
            "CRM_ACTION: {\"intent\":\"no_action\"}",
        ));
        let (gw, channel) = gateway(provider);

        assert_eq!(gw.handle_inbound(&inbound()).await, Outcome::Ok);
        assert!(channel.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_self_sent_message_skips_provider() {
        let provider = Arc::new(MockProvider::replying("WA_MSG:\n- eco"));
        let payload = json!({ "fromMe": true, "phone": "5531999999999", "text": "eco" });
        let (gw, channel) = gateway(provider.clone());

        assert_eq!(
            gw.handle_inbound(&payload).await,
            Outcome::Ignored("self-sent message")
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(channel.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_implausible_sender_is_dropped() {
        let payload = json!({ "phone": "12345", "text": "oi" });
        let provider = Arc::new(MockProvider::replying("WA_MSG:\n- oi"));
        let (gw, channel) = gateway(provider.clone());

        assert_eq!(
            gw.handle_inbound(&payload).await,
            Outcome::Ignored("implausible sender")
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(channel.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_media_message_gets_text_only_notice() {
        let provider = Arc::new(MockProvider::replying("unused"));
        let payload = json!({ "phone": "5531999999999", "type": "audio" });
        let (gw, channel) = gateway(provider.clone());

        assert_eq!(gw.handle_inbound(&payload).await, Outcome::Ok);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+5531999999999");
        assert_eq!(sent[0].1, UNSUPPORTED_MEDIA_NOTICE);
    }

    #[tokio::test]
    async fn test_user_message_carries_prefix() {
        struct CapturingProvider {
            seen: Mutex<Option<Context>>,
        }

        #[async_trait]
        impl Provider for CapturingProvider {
            fn name(&self) -> &str {
                "capturing"
            }

            async fn complete(&self, context: &Context) -> Result<String, RelayError> {
                *self.seen.lock().unwrap() = Some(context.clone());
                Ok("WA_MSG:\n- ok".to_string())
            }

            async fn is_available(&self) -> bool {
                true
            }
        }

        let provider = Arc::new(CapturingProvider {
            seen: Mutex::new(None),
        });
        let gw = Gateway::new(
            provider.clone(),
            Arc::new(MockChannel::default()),
            "prompt de teste".to_string(),
        );

        gw.handle_inbound(&inbound()).await;

        let ctx = provider.seen.lock().unwrap().clone().unwrap();
        assert_eq!(ctx.system_prompt, "prompt de teste");
        assert!(ctx.user_message.starts_with(USER_MESSAGE_PREFIX));
        assert!(ctx.user_message.contains("Quero agendar uma avaliação"));
    }
}
