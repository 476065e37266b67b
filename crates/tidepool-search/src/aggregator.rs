//! Request pipeline tying catalog, matcher, planner, fallback and assembler
//! together.
//!
//! The pipeline is strictly sequential: the shortfall handed to the provider
//! depends on the local match result, so listing and fallback never run
//! concurrently. Dropping a returned future abandons whichever external call
//! is in flight.

use std::sync::Arc;
use std::time::Duration;

use tidepool_common::{
    AggregatedResponse, CanonicalMediaItem, CatalogItem, Error, MediaKind, Result, SearchQuery,
};
use tracing::{debug, info};

use crate::assembler::assemble;
use crate::fallback::FallbackClient;
use crate::fuzzy::{FuzzyMatcher, DEFAULT_THRESHOLD};
use crate::planner::plan;
use crate::source::{CatalogLister, FallbackProvider};

/// Storage prefix for each media kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPrefixes {
    pub photos: String,
    pub videos: String,
    pub collections: String,
}

impl Default for CatalogPrefixes {
    fn default() -> Self {
        Self {
            photos: "photos/".to_string(),
            videos: "videos/".to_string(),
            collections: "collections/".to_string(),
        }
    }
}

impl CatalogPrefixes {
    pub fn for_kind(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Photos => &self.photos,
            MediaKind::Videos => &self.videos,
            MediaKind::Collections => &self.collections,
        }
    }
}

/// Tunables for [`Aggregator`].
#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    /// Keyword always present in fallback queries.
    pub base_term: String,
    /// Fuzzy match distance threshold (0.0 exact .. 1.0 anything).
    pub threshold: f64,
    pub prefixes: CatalogPrefixes,
    /// Upper bound on a single catalog listing.
    pub storage_timeout: Duration,
    /// Upper bound on a single provider call.
    pub provider_timeout: Duration,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            base_term: "water".to_string(),
            threshold: DEFAULT_THRESHOLD,
            prefixes: CatalogPrefixes::default(),
            storage_timeout: Duration::from_secs(10),
            provider_timeout: Duration::from_secs(15),
        }
    }
}

/// The hybrid search-and-fallback engine.
///
/// Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct Aggregator {
    catalog: Arc<dyn CatalogLister>,
    fallback: FallbackClient,
    matcher: FuzzyMatcher,
    prefixes: CatalogPrefixes,
    storage_timeout: Duration,
}

impl Aggregator {
    pub fn new(
        catalog: Arc<dyn CatalogLister>,
        provider: Arc<dyn FallbackProvider>,
        options: AggregatorOptions,
    ) -> Self {
        Self {
            catalog,
            fallback: FallbackClient::new(provider, options.base_term, options.provider_timeout),
            matcher: FuzzyMatcher::new(options.threshold),
            prefixes: options.prefixes,
            storage_timeout: options.storage_timeout,
        }
    }

    pub fn prefixes(&self) -> &CatalogPrefixes {
        &self.prefixes
    }

    /// Fuzzy-search the catalog for `kind`, topping up from the provider.
    pub async fn search(&self, kind: MediaKind, query: &SearchQuery) -> Result<AggregatedResponse> {
        let prefix = self.prefixes.for_kind(kind).to_string();
        self.run(kind, &prefix, query).await
    }

    /// Browse the catalog for `kind` in storage order (curated photos,
    /// popular videos, featured collections). Query text is ignored.
    pub async fn featured(&self, kind: MediaKind, query: &SearchQuery) -> Result<AggregatedResponse> {
        let query = query.clone().without_text();
        self.search(kind, &query).await
    }

    /// Browse one collection's folder in storage order.
    pub async fn collection(&self, id: &str, query: &SearchQuery) -> Result<AggregatedResponse> {
        let id = validate_id(id)?;
        let prefix = format!("{}{}/", self.prefixes.collections, id);
        let query = query.clone().without_text();
        self.run(MediaKind::Collections, &prefix, &query).await
    }

    /// Resolve a single item, preferring the local catalog.
    ///
    /// `id` may be the full key, the key relative to the kind's prefix, or
    /// the file stem. Misses fall through to the provider's detail lookup,
    /// except for collections which only exist locally.
    pub async fn detail(&self, kind: MediaKind, id: &str) -> Result<CanonicalMediaItem> {
        let id = validate_id(id)?;
        let prefix = self.prefixes.for_kind(kind);
        let catalog = self.list(prefix).await?;

        let local = catalog.into_iter().find(|item| {
            item.key == id || item.key.strip_prefix(prefix) == Some(id) || item.stem() == id
        });
        if let Some(item) = local {
            debug!(%kind, key = %item.key, "Detail resolved from catalog");
            return Ok(CanonicalMediaItem {
                url: self.catalog.public_url(&item.key),
                key: item.key,
                last_modified: item.last_modified,
                size: item.size,
            });
        }

        if kind == MediaKind::Collections {
            return Err(Error::not_found(format!("{kind}/{id}")));
        }

        self.fallback
            .fetch_detail(kind, id)
            .await?
            .ok_or_else(|| Error::not_found(format!("{kind}/{id}")))
    }

    async fn run(&self, kind: MediaKind, prefix: &str, query: &SearchQuery) -> Result<AggregatedResponse> {
        let catalog = self.list(prefix).await?;
        let listed = catalog.len();

        let matched = self.matcher.match_items(&query.text, prefix, catalog);
        let fill = plan(&matched, query.page, query.per_page);

        let fallback_items = if fill.needs_fallback() {
            self.fallback
                .fetch_fallback(kind, &query.text, fill.shortfall)
                .await?
        } else {
            Vec::new()
        };

        info!(
            %kind,
            prefix,
            query = %query.text,
            page = query.page,
            per_page = query.per_page,
            listed,
            matched = matched.len(),
            local = fill.local_slice.len(),
            fallback = fallback_items.len(),
            "Aggregated page"
        );

        Ok(assemble(&matched, &fill.local_slice, fallback_items, |key| {
            self.catalog.public_url(key)
        }))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<CatalogItem>> {
        tokio::time::timeout(self.storage_timeout, self.catalog.list(prefix))
            .await
            .map_err(|_| {
                Error::storage_unavailable(format!(
                    "{} listing of {prefix:?} timed out after {:?}",
                    self.catalog.name(),
                    self.storage_timeout
                ))
            })?
    }
}

fn validate_id(id: &str) -> Result<&str> {
    let id = id.trim().trim_matches('/');
    if id.is_empty() || id.split('/').any(|segment| segment == "..") {
        return Err(Error::invalid_query(format!("invalid media id: {id:?}")));
    }
    Ok(id)
}
