//! Tidepool-Search: the hybrid search-and-fallback aggregation engine.
//!
//! A request flows through a fixed, linear pipeline:
//!
//! 1. [`CatalogLister`] lists every object under the media kind's prefix.
//! 2. [`FuzzyMatcher`] narrows and ranks the listing when query text is present.
//! 3. [`plan`] slices the requested page out of the matches and computes the
//!    shortfall.
//! 4. [`FallbackClient`] tops up the shortfall from the [`FallbackProvider`]
//!    (only when the shortfall is non-zero).
//! 5. [`assemble`] maps local items to the canonical shape, appends the
//!    fallback items and stamps `total_results`.
//!
//! [`Aggregator`] wires the steps together. Everything except the two
//! source traits is pure and request-scoped.

pub mod aggregator;
pub mod assembler;
pub mod cache;
pub mod fallback;
pub mod fuzzy;
pub mod planner;
pub mod source;

pub use aggregator::{Aggregator, AggregatorOptions, CatalogPrefixes};
pub use assembler::assemble;
pub use cache::{CachedCatalog, DEFAULT_MAX_ENTRIES};
pub use fallback::{effective_query, FallbackClient};
pub use fuzzy::{searchable_text, FuzzyMatcher, DEFAULT_THRESHOLD};
pub use planner::{plan, FillPlan};
pub use source::{CatalogLister, FallbackProvider};
