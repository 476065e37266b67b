//! Object-storage catalog listing.
//!
//! Wraps any [`ObjectStore`] (S3-compatible bucket, local directory or
//! in-memory store) behind the engine's [`CatalogLister`] trait.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use tidepool_common::{CatalogItem, Error};
use tidepool_search::{CachedCatalog, CatalogLister};
use tracing::debug;

use crate::config::{StorageBackend, StorageConfig};

/// Catalog backed by an [`ObjectStore`].
pub struct ObjectStoreCatalog {
    store: Arc<dyn ObjectStore>,
    backend: &'static str,
    public_base_url: String,
}

impl ObjectStoreCatalog {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        backend: &'static str,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            backend,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the store described by `config`.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let base_url = config.resolved_public_base_url();

        let catalog = match config.backend {
            StorageBackend::S3 => {
                let bucket = config
                    .bucket
                    .as_deref()
                    .context("Storage backend 's3' requires a bucket")?;

                let mut builder = AmazonS3Builder::from_env()
                    .with_bucket_name(bucket)
                    .with_region(&config.region)
                    .with_allow_http(config.allow_http);
                if let Some(ref endpoint) = config.endpoint {
                    builder = builder.with_endpoint(endpoint);
                }
                if let Some(ref key_id) = config.access_key_id {
                    builder = builder.with_access_key_id(key_id);
                }
                if let Some(ref secret) = config.secret_access_key {
                    builder = builder.with_secret_access_key(secret);
                }

                let store = builder
                    .build()
                    .with_context(|| format!("Failed to configure S3 bucket {bucket:?}"))?;
                Self::new(Arc::new(store), "s3", base_url)
            }
            StorageBackend::Local => {
                let store = LocalFileSystem::new_with_prefix(&config.root).with_context(|| {
                    format!("Failed to open storage root {:?}", config.root)
                })?;
                Self::new(Arc::new(store), "local", base_url)
            }
            StorageBackend::Memory => Self::new(Arc::new(InMemory::new()), "memory", base_url),
        };

        Ok(catalog)
    }

    /// Underlying store, for seeding and inspection.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }
}

#[async_trait]
impl CatalogLister for ObjectStoreCatalog {
    fn name(&self) -> &'static str {
        self.backend
    }

    async fn list(&self, prefix: &str) -> tidepool_common::Result<Vec<CatalogItem>> {
        let prefix = prefix.trim_matches('/');
        let location = (!prefix.is_empty()).then(|| ObjectPath::from(prefix));

        let mut items: Vec<CatalogItem> = self
            .store
            .list(location.as_ref())
            .map_ok(|meta| CatalogItem {
                key: meta.location.to_string(),
                last_modified: meta.last_modified,
                size: meta.size as u64,
            })
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| {
                Error::storage_unavailable(format!(
                    "{} listing of {prefix:?} failed: {e}",
                    self.backend
                ))
            })?;

        // Backends differ in listing order; key order matches S3 everywhere.
        items.sort_by(|a, b| a.key.cmp(&b.key));
        debug!(backend = self.backend, prefix, count = items.len(), "Listed catalog");
        Ok(items)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key.trim_start_matches('/'))
    }
}

/// Build the configured catalog, wrapped in a listing cache when
/// `cache_ttl_secs` is non-zero.
pub fn build_catalog(config: &StorageConfig) -> Result<Arc<dyn CatalogLister>> {
    let catalog: Arc<dyn CatalogLister> = Arc::new(ObjectStoreCatalog::from_config(config)?);
    if config.cache_ttl_secs == 0 {
        return Ok(catalog);
    }
    tracing::info!("Catalog listing cache enabled ({}s TTL)", config.cache_ttl_secs);
    Ok(Arc::new(CachedCatalog::new(
        catalog,
        Duration::from_secs(config.cache_ttl_secs),
    )))
}
