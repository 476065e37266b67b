//! Approximate matching of query text against catalog keys.
//!
//! Only the part of a key that names the media is scored: the listing prefix
//! and the file extension are dropped first (see [`searchable_text`]), so a
//! query such as `jpg` or `photo` does not match every object.
//!
//! Keys and queries are lowercased and every non-alphanumeric character is
//! folded to a space, so `lake sunset` lines up with `photos/lake-sunset.jpg`.
//! The query is then slid across the key using windows one character
//! shorter, equal to, and one character longer than the query. The smallest
//! Levenshtein distance over all windows, divided by the query length, is the
//! candidate's distance (0.0 = exact substring, 1.0 = nothing in common).

use tidepool_common::CatalogItem;

/// Maximum distance a key may have and still count as a match.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Filters and ranks catalog items by similarity to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl FuzzyMatcher {
    /// Create a matcher. `threshold` is clamped into `[0.0, 1.0]`.
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_nan() {
            DEFAULT_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Keep the candidates within the threshold, best match first.
    ///
    /// Keys are scored relative to `prefix`, the prefix they were listed
    /// under. A blank query returns `candidates` untouched. Equal distances
    /// keep their catalog order.
    pub fn match_items(
        &self,
        query: &str,
        prefix: &str,
        candidates: Vec<CatalogItem>,
    ) -> Vec<CatalogItem> {
        let needle = normalize(query);
        if needle.trim().is_empty() {
            return candidates;
        }
        let needle: Vec<char> = needle.trim().chars().collect();

        let mut scored: Vec<(f64, CatalogItem)> = candidates
            .into_iter()
            .filter_map(|item| {
                let text = normalize(searchable_text(&item.key, prefix));
                let d = window_distance(&needle, &text);
                (d <= self.threshold).then_some((d, item))
            })
            .collect();

        // sort_by is stable, which keeps catalog order on ties
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.into_iter().map(|(_, item)| item).collect()
    }

    /// Distance between `query` and `key` on the 0..=1 scale used for
    /// filtering.
    pub fn distance(query: &str, key: &str) -> f64 {
        let needle: Vec<char> = normalize(query).trim().chars().collect();
        if needle.is_empty() {
            return 0.0;
        }
        window_distance(&needle, &normalize(key))
    }
}

/// The portion of `key` that is matched against queries: `key` without the
/// listing `prefix` and without the file extension.
pub fn searchable_text<'a>(key: &'a str, prefix: &str) -> &'a str {
    let rest = key.strip_prefix(prefix).unwrap_or(key);
    let name_start = rest.rfind('/').map_or(0, |i| i + 1);
    match rest[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &rest[..name_start + dot],
        _ => rest,
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}

fn window_distance(needle: &[char], haystack: &str) -> f64 {
    let query: String = needle.iter().collect();
    let hay: Vec<char> = haystack.chars().collect();
    let m = needle.len();

    let mut best = if hay.len() <= m + 1 {
        strsim::levenshtein(&query, haystack)
    } else {
        usize::MAX
    };

    let min_width = m.saturating_sub(1).max(1);
    for width in min_width..=m + 1 {
        if width > hay.len() {
            break;
        }
        for start in 0..=hay.len() - width {
            let window: String = hay[start..start + width].iter().collect();
            best = best.min(strsim::levenshtein(&query, &window));
            if best == 0 {
                return 0.0;
            }
        }
    }

    (best as f64 / m as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(key: &str) -> CatalogItem {
        CatalogItem::new(key, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), 1)
    }

    fn keys(items: &[CatalogItem]) -> Vec<&str> {
        items.iter().map(|i| i.key.as_str()).collect()
    }

    fn catalog() -> Vec<CatalogItem> {
        vec![
            item("photos/mountain-dawn.jpg"),
            item("photos/lake-sunset.jpg"),
            item("photos/desert.jpg"),
            item("photos/lakr-shore.jpg"),
            item("photos/LAKE-morning.jpg"),
        ]
    }

    #[test]
    fn blank_query_is_identity() {
        let matcher = FuzzyMatcher::default();
        let input = catalog();
        assert_eq!(matcher.match_items("", "photos/", input.clone()), input);
        assert_eq!(matcher.match_items("   \t", "photos/", input.clone()), input);
    }

    #[test]
    fn empty_candidates() {
        let matcher = FuzzyMatcher::default();
        assert!(matcher.match_items("lake", "photos/", Vec::new()).is_empty());
        assert!(matcher.match_items("", "photos/", Vec::new()).is_empty());
    }

    #[test]
    fn exact_substring_scores_zero() {
        assert_eq!(FuzzyMatcher::distance("lake", "photos/lake-sunset.jpg"), 0.0);
        assert_eq!(FuzzyMatcher::distance("Lake Sunset", "photos/lake-sunset.jpg"), 0.0);
    }

    #[test]
    fn single_typo_within_threshold() {
        let d = FuzzyMatcher::distance("sunsett", "photos/lake-sunset.jpg");
        assert!(d > 0.0 && d <= DEFAULT_THRESHOLD, "distance was {d}");
    }

    #[test]
    fn unrelated_key_is_far() {
        let d = FuzzyMatcher::distance("xyz123notfound", "photos/lake-sunset.jpg");
        assert!(d > DEFAULT_THRESHOLD);
    }

    #[test]
    fn ranks_best_first_with_stable_ties() {
        let matcher = FuzzyMatcher::default();
        let matched = matcher.match_items("lake", "photos/", catalog());
        // exact matches keep catalog order, the one-letter typo trails
        assert_eq!(
            keys(&matched),
            vec![
                "photos/lake-sunset.jpg",
                "photos/LAKE-morning.jpg",
                "photos/lakr-shore.jpg",
            ]
        );
    }

    #[test]
    fn never_returns_items_beyond_threshold() {
        let matcher = FuzzyMatcher::new(0.2);
        for query in ["lake", "lakr", "mountian", "dsert", "sea"] {
            for hit in matcher.match_items(query, "photos/", catalog()) {
                let text = searchable_text(&hit.key, "photos/");
                assert!(FuzzyMatcher::distance(query, text) <= 0.2);
            }
        }
    }

    #[test]
    fn zero_threshold_only_keeps_exact() {
        let matcher = FuzzyMatcher::new(0.0);
        let matched = matcher.match_items("lakr", "photos/", catalog());
        assert_eq!(keys(&matched), vec!["photos/lakr-shore.jpg"]);
    }

    #[test]
    fn prefix_and_extension_are_not_matched() {
        let matcher = FuzzyMatcher::default();
        for query in ["jpg", "photo", "photos", ".jpg"] {
            assert!(
                matcher.match_items(query, "photos/", catalog()).is_empty(),
                "{query} matched"
            );
        }
    }

    #[test]
    fn searchable_text_strips_prefix_and_extension() {
        assert_eq!(searchable_text("photos/lake-sunset.jpg", "photos/"), "lake-sunset");
        assert_eq!(
            searchable_text("collections/summer/a.b.png", "collections/"),
            "summer/a.b"
        );
        assert_eq!(searchable_text("photos/.hidden", "photos/"), ".hidden");
        assert_eq!(searchable_text("other/readme", "photos/"), "other/readme");
        assert_eq!(searchable_text("photos/v1.2/clip", "photos/"), "v1.2/clip");
    }

    #[test]
    fn threshold_is_clamped() {
        assert_eq!(FuzzyMatcher::new(7.0).threshold(), 1.0);
        assert_eq!(FuzzyMatcher::new(-1.0).threshold(), 0.0);
        assert_eq!(FuzzyMatcher::new(f64::NAN).threshold(), DEFAULT_THRESHOLD);
    }

    #[test]
    fn key_shorter_than_query() {
        let d = FuzzyMatcher::distance("waterfall", "a/wtr");
        assert!(d > DEFAULT_THRESHOLD);
        assert!(d <= 1.0);
    }
}
