//! # recepta-core
//!
//! Core types, traits, configuration, and error handling for the Recepta relay.

pub mod action;
pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod phone;
pub mod prompt;
pub mod traits;
