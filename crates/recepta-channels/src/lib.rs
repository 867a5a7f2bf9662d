//! # recepta-channels
//!
//! Messaging gateway integrations for the Recepta relay.

pub mod zapi;

pub use zapi::ZapiChannel;
