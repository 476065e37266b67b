//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires an in-memory object store as the
//! catalog and a [`wiremock`] server standing in for the Pexels API. The
//! [`TestHarness::serve`] method starts Axum on a random port for HTTP-level
//! testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use serde_json::{json, Value};
use tidepool_search::CatalogLister;
use wiremock::MockServer;

use tidepool::catalog::ObjectStoreCatalog;
use tidepool::config::{Config, StorageBackend};
use tidepool::engine::build_aggregator_with;
use tidepool::provider::PexelsProvider;
use tidepool::server::{create_router, AppContext};

pub const API_KEY: &str = "test-key";
pub const PUBLIC_BASE: &str = "https://bucket.example.com";

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory bucket and a mock provider.
pub struct TestHarness {
    pub ctx: AppContext,
    pub store: Arc<InMemory>,
    pub provider: MockServer,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    /// Create a new harness with a custom configuration. Storage and
    /// provider endpoints are always redirected to the test doubles.
    pub async fn with_config(config: Config) -> Self {
        Self::build(config, None).await
    }

    /// Create a harness whose catalog is `catalog` instead of the in-memory
    /// bucket. Seeding has no effect on such a harness.
    pub async fn with_catalog(catalog: Arc<dyn CatalogLister>) -> Self {
        Self::build(Config::default(), Some(catalog)).await
    }

    async fn build(mut config: Config, catalog: Option<Arc<dyn CatalogLister>>) -> Self {
        let provider = MockServer::start().await;

        config.storage.backend = StorageBackend::Memory;
        config.storage.public_base_url = Some(PUBLIC_BASE.to_string());
        config.provider.base_url = provider.uri();
        config.provider.api_key = API_KEY.to_string();
        config.provider.requests_per_second = 1000;

        let store = Arc::new(InMemory::new());
        let catalog = catalog.unwrap_or_else(|| {
            Arc::new(ObjectStoreCatalog::new(
                store.clone() as Arc<dyn ObjectStore>,
                "memory",
                config.storage.resolved_public_base_url(),
            )) as Arc<dyn CatalogLister>
        });
        let pexels = Arc::new(PexelsProvider::new(&config.provider).expect("provider"));
        let aggregator = build_aggregator_with(&config, catalog, pexels);

        Self {
            ctx: AppContext::new(config, aggregator),
            store,
            provider,
        }
    }

    /// Put an object under each key.
    pub async fn seed<S: AsRef<str>>(&self, keys: impl IntoIterator<Item = S>) {
        for key in keys {
            self.store
                .put(
                    &ObjectPath::from(key.as_ref()),
                    PutPayload::from_static(b"media-bytes"),
                )
                .await
                .expect("failed to seed object");
        }
    }

    /// Start an Axum server on a random port and return the bound address.
    pub async fn serve(&self) -> SocketAddr {
        let app = create_router(self.ctx.clone(), None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        addr
    }
}

/// A Pexels photo search page with `n` photos numbered from 1000.
pub fn photo_page(n: usize) -> Value {
    let photos: Vec<Value> = (0..n)
        .map(|i| {
            let id = 1000 + i;
            json!({
                "id": id,
                "url": format!("https://www.pexels.com/photo/{id}/"),
                "src": { "original": format!("https://images.pexels.com/photos/{id}/original.jpeg") }
            })
        })
        .collect();
    json!({ "page": 1, "per_page": n, "photos": photos, "total_results": 8000 })
}

/// A Pexels video search page with `n` videos numbered from 5000.
pub fn video_page(n: usize) -> Value {
    let videos: Vec<Value> = (0..n)
        .map(|i| {
            let id = 5000 + i;
            json!({
                "id": id,
                "url": format!("https://www.pexels.com/video/{id}/"),
                "video_files": [
                    { "link": format!("https://videos.pexels.com/{id}/sd.mp4"), "width": 640 },
                    { "link": format!("https://videos.pexels.com/{id}/hd.mp4"), "width": 1920 }
                ]
            })
        })
        .collect();
    json!({ "page": 1, "per_page": n, "videos": videos, "total_results": 900 })
}
