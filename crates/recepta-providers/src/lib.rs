//! # recepta-providers
//!
//! Completion provider implementations for the Recepta relay.

pub mod openai;

pub use openai::OpenAiProvider;
