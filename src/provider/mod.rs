//! Concrete fallback provider implementations.
//!
//! Each submodule wraps a single external API and implements the
//! [`FallbackProvider`](tidepool_search::FallbackProvider) trait.

pub mod pexels;

pub use pexels::PexelsProvider;
