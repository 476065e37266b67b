//! Topping up short pages from the stock-media provider.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tidepool_common::{CanonicalMediaItem, Error, MediaKind, Result};
use tracing::{debug, warn};

use crate::source::FallbackProvider;

/// Query sent to the provider: the base term alone for a blank user query,
/// otherwise `"{base_term} {user_query}"`.
///
/// The base term keeps fallback results on-topic even for unqualified
/// browsing.
pub fn effective_query(base_term: &str, user_query: &str) -> String {
    let base_term = base_term.trim();
    let user_query = user_query.trim();
    match (base_term.is_empty(), user_query.is_empty()) {
        (_, true) => base_term.to_string(),
        (true, false) => user_query.to_string(),
        (false, false) => format!("{base_term} {user_query}"),
    }
}

/// Fetches fallback items and maps them into the canonical shape.
#[derive(Clone)]
pub struct FallbackClient {
    provider: Arc<dyn FallbackProvider>,
    base_term: String,
    timeout: Duration,
}

impl FallbackClient {
    pub fn new(provider: Arc<dyn FallbackProvider>, base_term: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider,
            base_term: base_term.into(),
            timeout,
        }
    }

    pub fn base_term(&self) -> &str {
        &self.base_term
    }

    /// Fetch exactly `count` items (page 1) for `user_query`.
    ///
    /// A zero `count` returns immediately without contacting the provider.
    /// Any provider failure, timeout or short delivery surfaces as
    /// [`Error::ProviderUnavailable`]; a page is never silently truncated.
    pub async fn fetch_fallback(
        &self,
        kind: MediaKind,
        user_query: &str,
        count: u32,
    ) -> Result<Vec<CanonicalMediaItem>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let query = effective_query(&self.base_term, user_query);
        debug!(
            provider = self.provider.name(),
            %kind,
            query = %query,
            count,
            "Fetching fallback items"
        );

        let items = tokio::time::timeout(self.timeout, self.provider.search(kind, &query, count, 1))
            .await
            .map_err(|_| {
                Error::provider_unavailable(format!(
                    "{} search timed out after {:?}",
                    self.provider.name(),
                    self.timeout
                ))
            })??;

        if items.len() < count as usize {
            warn!(
                provider = self.provider.name(),
                requested = count,
                received = items.len(),
                "Provider returned fewer fallback items than requested"
            );
            return Err(Error::provider_unavailable(format!(
                "{} returned {} of {count} requested items",
                self.provider.name(),
                items.len()
            )));
        }

        let fetched_at = Utc::now();
        Ok(items
            .into_iter()
            .take(count as usize)
            .map(|item| item.into_canonical(fetched_at))
            .collect())
    }

    /// Look up a single provider item by id.
    pub async fn fetch_detail(&self, kind: MediaKind, id: &str) -> Result<Option<CanonicalMediaItem>> {
        let item = tokio::time::timeout(self.timeout, self.provider.detail(kind, id))
            .await
            .map_err(|_| {
                Error::provider_unavailable(format!(
                    "{} detail timed out after {:?}",
                    self.provider.name(),
                    self.timeout
                ))
            })??;
        Ok(item.map(|item| item.into_canonical(Utc::now())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tidepool_common::ProviderItem;

    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<(MediaKind, String, u32, u32)>>,
        available: usize,
        fail: bool,
        stall: bool,
    }

    #[async_trait]
    impl FallbackProvider for RecordingProvider {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn search(
            &self,
            kind: MediaKind,
            query: &str,
            count: u32,
            page: u32,
        ) -> Result<Vec<ProviderItem>> {
            self.calls
                .lock()
                .unwrap()
                .push((kind, query.to_string(), count, page));
            if self.stall {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.fail {
                return Err(Error::provider_unavailable("status 500"));
            }
            Ok((0..self.available)
                .map(|i| ProviderItem {
                    id: format!("p{i}"),
                    original_url: format!("https://images.example.com/p{i}.jpeg"),
                })
                .collect())
        }

        async fn detail(&self, _kind: MediaKind, id: &str) -> Result<Option<ProviderItem>> {
            Ok((id == "p1").then(|| ProviderItem {
                id: "p1".into(),
                original_url: "https://images.example.com/p1.jpeg".into(),
            }))
        }
    }

    fn client(provider: Arc<RecordingProvider>) -> FallbackClient {
        FallbackClient::new(provider, "water", Duration::from_secs(5))
    }

    #[test]
    fn effective_query_rules() {
        assert_eq!(effective_query("water", ""), "water");
        assert_eq!(effective_query("water", "   "), "water");
        assert_eq!(effective_query("water", "lake"), "water lake");
        assert_eq!(effective_query("water", " lake shore "), "water lake shore");
        assert_eq!(effective_query("", "lake"), "lake");
    }

    #[tokio::test]
    async fn zero_count_skips_provider() {
        let provider = Arc::new(RecordingProvider::default());
        let items = client(provider.clone())
            .fetch_fallback(MediaKind::Photos, "lake", 0)
            .await
            .unwrap();
        assert!(items.is_empty());
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn requests_exact_count_on_first_page() {
        let provider = Arc::new(RecordingProvider {
            available: 40,
            ..Default::default()
        });
        let items = client(provider.clone())
            .fetch_fallback(MediaKind::Videos, "lake", 15)
            .await
            .unwrap();

        assert_eq!(items.len(), 15);
        assert!(items.iter().all(|i| i.size == 0));
        assert_eq!(items[0].key, "p0");
        assert_eq!(items[0].url, "https://images.example.com/p0.jpeg");

        let calls = provider.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![(MediaKind::Videos, "water lake".to_string(), 15, 1)]
        );
    }

    #[tokio::test]
    async fn failure_is_not_swallowed() {
        let provider = Arc::new(RecordingProvider {
            fail: true,
            ..Default::default()
        });
        let err = client(provider)
            .fetch_fallback(MediaKind::Photos, "", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn short_delivery_is_an_error() {
        let provider = Arc::new(RecordingProvider {
            available: 80,
            ..Default::default()
        });
        let err = client(provider.clone())
            .fetch_fallback(MediaKind::Photos, "", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProviderUnavailable(_)));
        assert_eq!(provider.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_maps_to_provider_unavailable() {
        let provider = Arc::new(RecordingProvider {
            stall: true,
            ..Default::default()
        });
        let err = client(provider)
            .fetch_fallback(MediaKind::Photos, "", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn detail_lookup() {
        let provider = Arc::new(RecordingProvider::default());
        let client = client(provider);
        let hit = client.fetch_detail(MediaKind::Photos, "p1").await.unwrap();
        assert_eq!(hit.unwrap().key, "p1");
        assert!(client
            .fetch_detail(MediaKind::Photos, "missing")
            .await
            .unwrap()
            .is_none());
    }
}
