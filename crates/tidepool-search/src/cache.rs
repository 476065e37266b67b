//! Optional TTL cache in front of a catalog lister.
//!
//! Caches full listings per storage prefix so repeated searches do not
//! re-list the bucket. Entries expire on age; expired entries are swept on
//! every insert and the map never holds more than `max_entries` prefixes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tidepool_common::{CatalogItem, Result};
use tracing::trace;

use crate::source::CatalogLister;

/// Entry in the listing cache.
struct CacheEntry {
    items: Arc<Vec<CatalogItem>>,
    fetched_at: Instant,
}

/// Default cap on cached prefixes.
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

/// [`CatalogLister`] decorator caching listings by prefix.
pub struct CachedCatalog {
    inner: Arc<dyn CatalogLister>,
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn CatalogLister>, ttl: Duration) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Cap the number of cached prefixes (at least one).
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Drop expired entries, then the oldest ones until there is room for
    /// one more.
    fn make_room(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.fetched_at.elapsed() < ttl);

        while self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.fetched_at)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    /// Drop every cached listing.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached prefixes (including expired ones not yet evicted).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CatalogLister for CachedCatalog {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn list(&self, prefix: &str) -> Result<Vec<CatalogItem>> {
        if let Some(entry) = self.entries.get(prefix) {
            if entry.fetched_at.elapsed() < self.ttl {
                trace!(prefix, "Catalog cache hit");
                return Ok(entry.items.as_ref().clone());
            }
        }
        // Expired or missing; failures are not cached
        self.entries.remove(prefix);

        let items = self.inner.list(prefix).await?;
        self.make_room();
        self.entries.insert(
            prefix.to_string(),
            CacheEntry {
                items: Arc::new(items.clone()),
                fetched_at: Instant::now(),
            },
        );
        Ok(items)
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }
}
