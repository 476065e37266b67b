//! Tidepool - media gallery proxy
//!
//! This library crate exposes the server, configuration and source adapters
//! for integration testing.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod provider;
pub mod server;
