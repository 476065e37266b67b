//! Assembly of the aggregation engine from configuration.

use std::sync::Arc;

use anyhow::Result;
use tidepool_search::{Aggregator, CatalogLister, FallbackProvider};

use crate::catalog::build_catalog;
use crate::config::Config;
use crate::provider::PexelsProvider;

/// Build the engine with the configured catalog and the Pexels provider.
pub fn build_aggregator(config: &Config) -> Result<Aggregator> {
    let catalog = build_catalog(&config.storage)?;
    let provider: Arc<dyn FallbackProvider> = Arc::new(PexelsProvider::new(&config.provider)?);
    Ok(build_aggregator_with(config, catalog, provider))
}

/// Build the engine around caller-supplied sources.
pub fn build_aggregator_with(
    config: &Config,
    catalog: Arc<dyn CatalogLister>,
    provider: Arc<dyn FallbackProvider>,
) -> Aggregator {
    tracing::debug!(
        catalog = catalog.name(),
        provider = provider.name(),
        "Building aggregator"
    );
    Aggregator::new(catalog, provider, config.aggregator_options())
}
