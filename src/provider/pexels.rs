//! Pexels stock-media provider.
//!
//! Implements [`FallbackProvider`] against the Pexels REST API.
//!
//! Features:
//! - Token-bucket rate limiting via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` header support (max 3 retries).
//! - Configurable request timeout.
//! - Photos and collections search `/v1/search`; videos search `/videos/search`.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tidepool_common::{Error, MediaKind, ProviderItem};
use tidepool_search::FallbackProvider;
use tracing::{debug, warn};

use crate::config::ProviderConfig;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAX_RETRIES: u32 = 3;

/// Largest `per_page` the Pexels search endpoints honor.
const MAX_PER_PAGE: u32 = 80;

// ---------------------------------------------------------------------------
// Pexels API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PexelsPhotoPage {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideoPage {
    #[serde(default)]
    videos: Vec<PexelsVideo>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    id: u64,
    url: Option<String>,
    src: Option<PexelsPhotoSrc>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhotoSrc {
    original: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideo {
    id: u64,
    url: Option<String>,
    #[serde(default)]
    video_files: Vec<PexelsVideoFile>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideoFile {
    link: String,
    width: Option<u32>,
}

impl From<PexelsPhoto> for ProviderItem {
    fn from(photo: PexelsPhoto) -> Self {
        let original_url = photo
            .src
            .and_then(|src| src.original)
            .or(photo.url)
            .unwrap_or_default();
        ProviderItem {
            id: photo.id.to_string(),
            original_url,
        }
    }
}

impl From<PexelsVideo> for ProviderItem {
    /// The widest rendition stands in for the original upload.
    fn from(video: PexelsVideo) -> Self {
        let original_url = video
            .video_files
            .into_iter()
            .max_by_key(|file| file.width.unwrap_or(0))
            .map(|file| file.link)
            .or(video.url)
            .unwrap_or_default();
        ProviderItem {
            id: video.id.to_string(),
            original_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// Pexels fallback provider.
///
/// # Examples
///
/// ```no_run
/// use tidepool::config::ProviderConfig;
/// use tidepool::provider::PexelsProvider;
///
/// let config = ProviderConfig {
///     api_key: "your-api-key".into(),
///     ..Default::default()
/// };
/// let provider = PexelsProvider::new(&config).unwrap();
/// ```
pub struct PexelsProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: Url,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl PexelsProvider {
    /// Create a provider from its configuration section.
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        let rps = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rps));

        // A trailing slash keeps Url::join from dropping the last path segment.
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)
            .with_context(|| format!("invalid provider base URL: {}", config.base_url))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url,
            rate_limiter,
        })
    }

    /// Returns `true` when an API key has been configured.
    pub fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Build an endpoint URL; the API key travels in a header, never here.
    fn url(&self, path: &str, params: &[(&str, &str)]) -> anyhow::Result<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("invalid provider path: {path}"))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Detail endpoint for `id`, pushed as a single escaped path segment.
    /// `None` for kinds the provider has no detail endpoint for.
    fn detail_url(&self, kind: MediaKind, id: &str) -> anyhow::Result<Option<Url>> {
        let base = match kind {
            MediaKind::Photos => "v1/photos",
            MediaKind::Videos => "videos/videos",
            MediaKind::Collections => return Ok(None),
        };
        let mut url = self.url(base, &[])?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("provider base URL cannot carry a path"))?
            .push(id);
        Ok(Some(url))
    }

    fn search_path(kind: MediaKind) -> &'static str {
        match kind {
            MediaKind::Photos | MediaKind::Collections => "v1/search",
            MediaKind::Videos => "videos/search",
        }
    }

    /// Execute a GET request with rate limiting and 429-retry logic.
    ///
    /// Any final status is returned as-is; callers decide what counts as
    /// failure.
    async fn get(&self, url: &Url) -> anyhow::Result<reqwest::Response> {
        if !self.is_available() {
            anyhow::bail!("no Pexels API key configured");
        }

        let mut retries = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            let resp = self
                .client
                .get(url.clone())
                .header(reqwest::header::AUTHORIZATION, &self.api_key)
                .send()
                .await
                .with_context(|| format!("Pexels request failed: {url}"))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(
                    retry = retries,
                    wait_secs = wait,
                    "Pexels returned 429, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            return Ok(resp);
        }
    }

    /// Fetch `count` items at page `page` of `count`-sized pages.
    ///
    /// Requests above [`MAX_PER_PAGE`] are split across consecutive provider
    /// pages; the result is short only when the provider runs out of items.
    async fn search_items(
        &self,
        kind: MediaKind,
        query: &str,
        count: u32,
        page: u32,
    ) -> anyhow::Result<Vec<ProviderItem>> {
        if count <= MAX_PER_PAGE {
            return self.search_page(kind, query, count, page).await;
        }

        let offset = u64::from(page.saturating_sub(1)) * u64::from(count);
        let mut provider_page = u32::try_from(offset / u64::from(MAX_PER_PAGE) + 1)
            .context("requested page is out of range")?;
        let mut skip = (offset % u64::from(MAX_PER_PAGE)) as usize;

        let mut items = Vec::with_capacity(count as usize);
        while items.len() < count as usize {
            let batch = self
                .search_page(kind, query, MAX_PER_PAGE, provider_page)
                .await?;
            let exhausted = batch.len() < MAX_PER_PAGE as usize;
            items.extend(batch.into_iter().skip(skip));
            skip = 0;
            if exhausted {
                break;
            }
            provider_page += 1;
        }
        items.truncate(count as usize);
        Ok(items)
    }

    async fn search_page(
        &self,
        kind: MediaKind,
        query: &str,
        count: u32,
        page: u32,
    ) -> anyhow::Result<Vec<ProviderItem>> {
        let per_page = count.to_string();
        let page = page.to_string();
        let url = self.url(
            Self::search_path(kind),
            &[("query", query), ("per_page", &per_page), ("page", &page)],
        )?;
        debug!(url = %url, %kind, "Pexels search");

        let resp = self
            .get(&url)
            .await?
            .error_for_status()
            .with_context(|| format!("Pexels request returned error: {url}"))?;

        let items = match kind {
            MediaKind::Videos => resp
                .json::<PexelsVideoPage>()
                .await
                .context("failed to parse Pexels video search response")?
                .videos
                .into_iter()
                .map(ProviderItem::from)
                .collect(),
            MediaKind::Photos | MediaKind::Collections => resp
                .json::<PexelsPhotoPage>()
                .await
                .context("failed to parse Pexels photo search response")?
                .photos
                .into_iter()
                .map(ProviderItem::from)
                .collect(),
        };
        Ok(items)
    }

    async fn detail_item(&self, kind: MediaKind, id: &str) -> anyhow::Result<Option<ProviderItem>> {
        let Some(url) = self.detail_url(kind, id)? else {
            return Ok(None);
        };
        debug!(url = %url, %kind, "Pexels detail");

        let resp = self.get(&url).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = resp
            .error_for_status()
            .with_context(|| format!("Pexels request returned error: {url}"))?;

        let item: ProviderItem = match kind {
            MediaKind::Videos => resp
                .json::<PexelsVideo>()
                .await
                .context("failed to parse Pexels video response")?
                .into(),
            _ => resp
                .json::<PexelsPhoto>()
                .await
                .context("failed to parse Pexels photo response")?
                .into(),
        };
        Ok(Some(item))
    }
}

#[async_trait]
impl FallbackProvider for PexelsProvider {
    fn name(&self) -> &'static str {
        "pexels"
    }

    async fn search(
        &self,
        kind: MediaKind,
        query: &str,
        count: u32,
        page: u32,
    ) -> tidepool_common::Result<Vec<ProviderItem>> {
        self.search_items(kind, query, count, page)
            .await
            .map_err(|e| Error::provider_unavailable(format!("{e:#}")))
    }

    async fn detail(&self, kind: MediaKind, id: &str) -> tidepool_common::Result<Option<ProviderItem>> {
        self.detail_item(kind, id)
            .await
            .map_err(|e| Error::provider_unavailable(format!("{e:#}")))
    }
}
