//! Client-side caching.
//!
//! - `query`: in-memory query results keyed by entity and search term,
//!   with staleness and eviction windows and a retrying fetch helper
//! - `store`: a small JSON file for UI state such as search terms

pub mod query;
pub mod store;

pub use query::{fetch_with_retry, QueryCache, QueryEntry, QueryKey, QueryKind, QueryPolicy, QueryStatus};
pub use store::PersistedStore;
