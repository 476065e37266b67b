//! Core type definitions for catalog records, canonical items and pages.
//!
//! Everything here is request-scoped: values are built per request and
//! dropped with it. Wire-facing types serialize in camelCase because the
//! gallery frontend reads `totalResults` and `lastModified` directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page number used when the caller omits or garbles `page`.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the caller omits or garbles `per_page`.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Family of media served by the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still images.
    Photos,
    /// Video clips.
    Videos,
    /// Curated groups of media, stored one folder per collection.
    Collections,
}

impl MediaKind {
    /// All kinds, in display order.
    pub const ALL: [MediaKind; 3] = [MediaKind::Photos, MediaKind::Videos, MediaKind::Collections];
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Photos => write!(f, "photos"),
            Self::Videos => write!(f, "videos"),
            Self::Collections => write!(f, "collections"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "photos" | "photo" => Ok(Self::Photos),
            "videos" | "video" => Ok(Self::Videos),
            "collections" | "collection" => Ok(Self::Collections),
            other => Err(crate::Error::invalid_query(format!(
                "unknown media kind: {other}"
            ))),
        }
    }
}

/// Raw object record produced by the catalog lister.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Full storage path; unique within a bucket.
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
}

impl CatalogItem {
    pub fn new(key: impl Into<String>, last_modified: DateTime<Utc>, size: u64) -> Self {
        Self {
            key: key.into(),
            last_modified,
            size,
        }
    }

    /// Final path segment of the key without its extension
    /// (`photos/lake-sunset.jpg` -> `lake-sunset`).
    pub fn stem(&self) -> &str {
        let name = self.key.rsplit('/').next().unwrap_or(&self.key);
        match name.rfind('.') {
            Some(0) | None => name,
            Some(idx) => &name[..idx],
        }
    }
}

/// The normalized item shape every caller receives, whatever its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMediaItem {
    pub key: String,
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
}

/// An item as reported by the stock-media provider, reduced to the fields
/// the canonical mapping needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderItem {
    /// Provider-specific identifier.
    pub id: String,
    /// Link to the original-resolution asset.
    pub original_url: String,
}

impl ProviderItem {
    /// Map into the canonical shape.
    ///
    /// The provider reports neither a modification time nor a byte size, so
    /// `fetched_at` stands in for the former and the size is always zero.
    pub fn into_canonical(self, fetched_at: DateTime<Utc>) -> CanonicalMediaItem {
        CanonicalMediaItem {
            key: self.id,
            url: self.original_url,
            last_modified: fetched_at,
            size: 0,
        }
    }
}

/// Parsed search and pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free text, possibly empty. Never contains leading/trailing whitespace.
    pub text: String,
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, page: u32, per_page: u32) -> Self {
        Self {
            text: text.into().trim().to_string(),
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Build a query from raw request parameters.
    ///
    /// Missing, non-numeric or zero pagination values are replaced by
    /// [`DEFAULT_PAGE`] / [`DEFAULT_PER_PAGE`] rather than rejected.
    pub fn from_raw(text: Option<&str>, page: Option<&str>, per_page: Option<&str>) -> Self {
        Self {
            text: text.map(str::trim).unwrap_or_default().to_string(),
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            per_page: parse_positive(per_page).unwrap_or(DEFAULT_PER_PAGE),
        }
    }

    /// Same pagination, query text cleared.
    pub fn without_text(mut self) -> Self {
        self.text.clear();
        self
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v >= 1)
}

/// One page of aggregated results.
///
/// `total_results` counts the locally matched corpus only. It ignores both
/// pagination and any fallback items appended to `items`, so a client paging
/// past the local corpus keeps receiving full pages with a smaller total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResponse {
    pub total_results: u64,
    pub items: Vec<CanonicalMediaItem>,
}
