//! In-memory query cache keyed by entity and search term.
//!
//! The cache holds no async machinery of its own. Callers ask it whether a
//! key needs fetching (`observe`), claim the fetch (`begin_fetch`), run the
//! request wherever they like, and hand the outcome back (`complete`).
//! Time is always passed in so staleness and eviction are deterministic.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::EntityKind;
use crate::utils::age_display;

const RETRY_BASE_DELAY_MS: u64 = 1000;
const RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

// ============================================================================
// Policy
// ============================================================================

/// Freshness rules for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Data older than this is refetched the next time the key is observed.
    pub stale_time: Duration,
    /// Unobserved entries older than this are evicted.
    pub cache_time: Duration,
    /// Extra attempts after a failed fetch.
    pub retry: u32,
}

impl QueryPolicy {
    pub const APP_DEFAULT: QueryPolicy = QueryPolicy {
        stale_time: Duration::from_secs(2 * 60),
        cache_time: Duration::from_secs(10 * 60),
        retry: 1,
    };

    /// Entity list pages.
    pub const LIST: QueryPolicy = QueryPolicy {
        stale_time: Duration::from_secs(5 * 60),
        cache_time: Duration::from_secs(10 * 60),
        retry: 1,
    };

    /// Exponential backoff: 1s, 2s, 4s, ... capped at 30s.
    pub fn retry_delay(attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(RETRY_BASE_DELAY_MS.saturating_mul(factor)).min(RETRY_MAX_DELAY)
    }
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self::APP_DEFAULT
    }
}

// ============================================================================
// Keys
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// A list page filtered by a (possibly empty) search term.
    List(String),
    Statistics,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub entity: EntityKind,
    pub kind: QueryKind,
}

impl QueryKey {
    /// The search term is trimmed so "Toyota " and "Toyota" share an entry.
    pub fn list(entity: EntityKind, term: &str) -> Self {
        Self {
            entity,
            kind: QueryKind::List(term.trim().to_string()),
        }
    }

    pub fn statistics(entity: EntityKind) -> Self {
        Self {
            entity,
            kind: QueryKind::Statistics,
        }
    }

    /// Search term of a list key, empty for other kinds.
    pub fn term(&self) -> &str {
        match &self.kind {
            QueryKind::List(term) => term,
            QueryKind::Statistics => "",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            QueryKind::List(term) => write!(f, "{}:list:{}", self.entity, term),
            QueryKind::Statistics => write!(f, "{}:statistics", self.entity),
        }
    }
}

// ============================================================================
// Entries
// ============================================================================

/// What a view should show for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never fetched and nothing in flight.
    Idle,
    /// No data yet, a fetch is running.
    Loading,
    /// No data, the last fetch failed.
    Error,
    /// Data is available (possibly being refreshed).
    Success,
}

#[derive(Debug, Clone)]
pub struct QueryEntry<V> {
    pub data: Option<V>,
    pub error: Option<String>,
    pub updated_at: Option<Instant>,
    pub updated_wall: Option<DateTime<Utc>>,
    pub invalidated: bool,
    pub fetching: bool,
    pub last_observed: Instant,
    pub policy: QueryPolicy,
}

impl<V> QueryEntry<V> {
    fn new(policy: QueryPolicy, now: Instant) -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
            updated_wall: None,
            invalidated: false,
            fetching: false,
            last_observed: now,
            policy,
        }
    }

    pub fn is_stale(&self, now: Instant) -> bool {
        match self.updated_at {
            Some(at) => now.saturating_duration_since(at) >= self.policy.stale_time,
            None => true,
        }
    }

    /// Whether an observer at `now` should trigger a fetch.
    ///
    /// A failed key is not refetched automatically; it waits for an
    /// explicit invalidation (the "try again" action).
    fn needs_fetch(&self, now: Instant) -> bool {
        if self.fetching {
            return false;
        }
        if self.invalidated {
            return true;
        }
        self.error.is_none() && (self.data.is_none() || self.is_stale(now))
    }

    pub fn status(&self) -> QueryStatus {
        if self.data.is_some() {
            QueryStatus::Success
        } else if self.fetching {
            QueryStatus::Loading
        } else if self.error.is_some() {
            QueryStatus::Error
        } else {
            QueryStatus::Idle
        }
    }

    /// "just now", "5m ago", ... for the last successful fetch.
    pub fn age_display(&self, now: DateTime<Utc>) -> Option<String> {
        self.updated_wall
            .map(|at| age_display((now - at).num_minutes()))
    }
}

// ============================================================================
// Cache
// ============================================================================

#[derive(Debug)]
pub struct QueryCache<V> {
    entries: HashMap<QueryKey, QueryEntry<V>>,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record that a view is showing `key` and report whether it should be
    /// fetched now.
    pub fn observe(&mut self, key: &QueryKey, policy: QueryPolicy, now: Instant) -> bool {
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| QueryEntry::new(policy, now));
        entry.last_observed = now;
        entry.policy = policy;
        entry.needs_fetch(now)
    }

    /// Claim the fetch for `key`. Returns `false` when one is already in
    /// flight, which folds concurrent identical requests into one.
    ///
    /// Claiming consumes a pending invalidation. One raised while the fetch
    /// is in flight survives `complete` and triggers another fetch.
    pub fn begin_fetch(&mut self, key: &QueryKey, now: Instant) -> bool {
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| QueryEntry::new(QueryPolicy::APP_DEFAULT, now));
        if entry.fetching {
            debug!(key = %key, "Fetch already in flight");
            return false;
        }
        entry.fetching = true;
        entry.invalidated = false;
        true
    }

    /// Store the outcome of a fetch. Data from an earlier success survives
    /// a failed refresh.
    pub fn complete(
        &mut self,
        key: &QueryKey,
        result: Result<V, String>,
        now: Instant,
        wall: DateTime<Utc>,
    ) {
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| QueryEntry::new(QueryPolicy::APP_DEFAULT, now));
        entry.fetching = false;
        match result {
            Ok(data) => {
                entry.data = Some(data);
                entry.error = None;
                entry.updated_at = Some(now);
                entry.updated_wall = Some(wall);
            }
            Err(error) => {
                warn!(key = %key, error = %error, "Query failed");
                entry.error = Some(error);
            }
        }
    }

    /// Mark every entry of `entity` as needing a refetch on next observation.
    /// Returns how many entries were marked.
    pub fn invalidate_entity(&mut self, entity: EntityKind) -> usize {
        let mut count = 0;
        for (key, entry) in self.entries.iter_mut() {
            if key.entity == entity {
                entry.invalidated = true;
                count += 1;
            }
        }
        debug!(entity = %entity, count, "Invalidated queries");
        count
    }

    pub fn entry(&self, key: &QueryKey) -> Option<&QueryEntry<V>> {
        self.entries.get(key)
    }

    pub fn data(&self, key: &QueryKey) -> Option<&V> {
        self.entries.get(key).and_then(|e| e.data.as_ref())
    }

    pub fn error(&self, key: &QueryKey) -> Option<&str> {
        self.entries.get(key).and_then(|e| e.error.as_deref())
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(|e| e.fetching)
    }

    pub fn status(&self, key: &QueryKey) -> QueryStatus {
        self.entries
            .get(key)
            .map(QueryEntry::status)
            .unwrap_or(QueryStatus::Idle)
    }

    /// Drop entries nobody has observed for longer than their eviction
    /// window. In-flight entries are kept. Returns how many were removed.
    pub fn collect_garbage(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            entry.fetching
                || now.saturating_duration_since(entry.last_observed) < entry.policy.cache_time
        });
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, "Evicted unobserved queries");
        }
        removed
    }
}

// ============================================================================
// Retrying fetch
// ============================================================================

/// Run `fetch` and retry failures per `policy`, sleeping with exponential
/// backoff between attempts.
pub async fn fetch_with_retry<T, E, F, Fut>(
    policy: QueryPolicy,
    label: &str,
    mut fetch: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let mut attempt = 0;
    loop {
        match fetch().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.retry => {
                let delay = QueryPolicy::retry_delay(attempt);
                warn!(
                    query = label,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Query failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
