//! Tidepool-Common: Shared types and errors.
//!
//! This crate provides the vocabulary used across tidepool:
//!
//! - **Media Types**: catalog records, the canonical item shape returned to
//!   callers, provider items and the aggregated page response
//! - **Queries**: parsed search/pagination parameters with default recovery
//! - **Error Handling**: the shared error taxonomy and result alias
//!
//! # Examples
//!
//! ```
//! use tidepool_common::{MediaKind, SearchQuery, Error, Result};
//!
//! // Unparsable pagination falls back to defaults
//! let query = SearchQuery::from_raw(Some("lake"), Some("abc"), None);
//! assert_eq!(query.page, 1);
//! assert_eq!(query.per_page, 20);
//!
//! assert_eq!(MediaKind::Videos.to_string(), "videos");
//!
//! fn example() -> Result<()> {
//!     Err(Error::provider_unavailable("status 500"))
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
