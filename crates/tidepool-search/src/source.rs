//! Traits for the two external media sources.
//!
//! Both sources are trait objects so the [`Aggregator`](crate::Aggregator)
//! treats every media kind the same way and tests can swap in fakes.

use async_trait::async_trait;
use tidepool_common::{CatalogItem, MediaKind, ProviderItem, Result};

/// Lists the curated catalog held in object storage.
///
/// Implementations report transport and auth failures as
/// [`Error::StorageUnavailable`](tidepool_common::Error::StorageUnavailable).
#[async_trait]
pub trait CatalogLister: Send + Sync {
    /// Short, lowercase identifier for this backend (e.g. `"s3"`).
    fn name(&self) -> &'static str;

    /// List every object stored under `prefix`, in storage order.
    async fn list(&self, prefix: &str) -> Result<Vec<CatalogItem>>;

    /// Publicly reachable URL for an object key.
    fn public_url(&self, key: &str) -> String;
}

/// Stock-media API used to top up pages the catalog cannot fill.
///
/// Implementations report non-success responses and transport failures as
/// [`Error::ProviderUnavailable`](tidepool_common::Error::ProviderUnavailable).
#[async_trait]
pub trait FallbackProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"pexels"`).
    fn name(&self) -> &'static str;

    /// Fetch up to `count` items of `kind` matching `query` from page `page`.
    async fn search(
        &self,
        kind: MediaKind,
        query: &str,
        count: u32,
        page: u32,
    ) -> Result<Vec<ProviderItem>>;

    /// Fetch a single item by provider id. `Ok(None)` when the provider has
    /// no such item.
    async fn detail(&self, kind: MediaKind, id: &str) -> Result<Option<ProviderItem>>;
}
