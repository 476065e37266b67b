//! Final page assembly.

use tidepool_common::{AggregatedResponse, CanonicalMediaItem, CatalogItem};

/// Build the response page.
///
/// Local items are mapped with `url_for` and always precede the fallback
/// items. `total_results` is the size of the whole locally matched corpus,
/// regardless of which page was sliced or how many fallback items follow.
pub fn assemble<F>(
    matched: &[CatalogItem],
    local_slice: &[CatalogItem],
    fallback_items: Vec<CanonicalMediaItem>,
    url_for: F,
) -> AggregatedResponse
where
    F: Fn(&str) -> String,
{
    let mut items = Vec::with_capacity(local_slice.len() + fallback_items.len());
    items.extend(local_slice.iter().map(|item| CanonicalMediaItem {
        url: url_for(&item.key),
        key: item.key.clone(),
        last_modified: item.last_modified,
        size: item.size,
    }));
    items.extend(fallback_items);

    AggregatedResponse {
        total_results: matched.len() as u64,
        items,
    }
}
