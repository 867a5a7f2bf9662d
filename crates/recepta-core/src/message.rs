use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An inbound message after extraction and phone normalization.
///
/// Constructed once per webhook delivery and discarded when the request
/// completes; nothing is persisted across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub id: Uuid,
    /// Canonical `+digits` sender phone.
    pub sender: String,
    /// Message text content.
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl NormalizedMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: sender.into(),
            text: text.into(),
            received_at: Utc::now(),
        }
    }
}
