use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tidepool_search::{AggregatorOptions, CatalogPrefixes, DEFAULT_THRESHOLD};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    /// Engine tunables derived from the storage, provider and search sections.
    pub fn aggregator_options(&self) -> AggregatorOptions {
        AggregatorOptions {
            base_term: self.search.fallback_term.clone(),
            threshold: self.search.threshold,
            prefixes: CatalogPrefixes {
                photos: self.storage.photos_prefix.clone(),
                videos: self.storage.videos_prefix.clone(),
                collections: self.storage.collections_prefix.clone(),
            },
            storage_timeout: Duration::from_secs(self.storage.timeout_secs),
            provider_timeout: Duration::from_secs(self.provider.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Frontend bundle served for every non-API path
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3-compatible bucket (AWS, DigitalOcean Spaces, MinIO, ...)
    S3,
    /// Directory on the local filesystem
    #[default]
    Local,
    /// Process-local store, empty at startup
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default)]
    pub bucket: Option<String>,

    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for non-AWS providers
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub access_key_id: Option<String>,

    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// Permit plain-HTTP endpoints (local MinIO)
    #[serde(default)]
    pub allow_http: bool,

    /// Root directory for the local backend
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Base URL object keys are appended to when building public links.
    /// Derived from bucket/endpoint/region when unset.
    #[serde(default)]
    pub public_base_url: Option<String>,

    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,

    /// Listing cache lifetime (0 disables the cache)
    #[serde(default)]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_photos_prefix")]
    pub photos_prefix: String,

    #[serde(default = "default_videos_prefix")]
    pub videos_prefix: String,

    #[serde(default = "default_collections_prefix")]
    pub collections_prefix: String,
}

fn default_region() -> String {
    "us-east-1".to_string()
}
fn default_root() -> PathBuf {
    PathBuf::from("./media")
}
fn default_storage_timeout() -> u64 {
    10
}
fn default_photos_prefix() -> String {
    "photos/".to_string()
}
fn default_videos_prefix() -> String {
    "videos/".to_string()
}
fn default_collections_prefix() -> String {
    "collections/".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: None,
            region: default_region(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            allow_http: false,
            root: default_root(),
            public_base_url: None,
            timeout_secs: default_storage_timeout(),
            cache_ttl_secs: 0,
            photos_prefix: default_photos_prefix(),
            videos_prefix: default_videos_prefix(),
            collections_prefix: default_collections_prefix(),
        }
    }
}

impl StorageConfig {
    /// Base URL for public object links, without a trailing slash.
    pub fn resolved_public_base_url(&self) -> String {
        if let Some(url) = self.public_base_url.as_deref().filter(|u| !u.is_empty()) {
            return url.trim_end_matches('/').to_string();
        }

        match self.backend {
            StorageBackend::S3 => {
                let bucket = self.bucket.as_deref().unwrap_or_default();
                match self.endpoint.as_deref() {
                    Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
                    None => format!("https://{}.s3.{}.amazonaws.com", bucket, self.region),
                }
            }
            StorageBackend::Local => "/media".to_string(),
            StorageBackend::Memory => "memory:".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Pexels API key (also read from PEXELS_API_KEY)
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_provider_url")]
    pub base_url: String,

    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_provider_url() -> String {
    "https://api.pexels.com".to_string()
}
fn default_provider_timeout() -> u64 {
    15
}
fn default_requests_per_second() -> u32 {
    5
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_provider_url(),
            timeout_secs: default_provider_timeout(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Fuzzy match distance threshold, 0.0 (exact) to 1.0 (anything)
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Keyword prepended to every fallback query
    #[serde(default = "default_fallback_term")]
    pub fallback_term: String,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}
fn default_fallback_term() -> String {
    "water".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            fallback_term: default_fallback_term(),
        }
    }
}
