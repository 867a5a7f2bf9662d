use serde::{Deserialize, Serialize};

/// Prompt material passed to a provider for one completion.
///
/// The relay is stateless: there is no conversation history, just the
/// fixed system prompt and the current inbound text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// System prompt prepended to the request.
    pub system_prompt: String,
    /// The current user message.
    pub user_message: String,
}

impl Context {
    pub fn new(system_prompt: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_message: user_message.into(),
        }
    }
}
