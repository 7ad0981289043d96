//! In-memory response caching.
//!
//! # Responsibilities
//! - Memoize successful response bodies keyed by resource URL
//! - Evaluate staleness lazily at read time
//!
//! # Design Decisions
//! - No proactive expiry and no eviction; entries only die by overwrite.
//!   Keys are URLs, a bounded set in practice, so unbounded growth is an
//!   accepted trade-off
//! - Last write wins; there is no versioning

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::transport::ResponseBody;

/// One cached response body.
#[derive(Debug, Clone)]
struct CacheEntry {
    data: ResponseBody,
    stored_at: Instant,
}

/// Keyed, time-bounded memoization of response bodies.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
}

impl ResponseCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the payload for `key` if present and fresh.
    ///
    /// An absent `max_age` means a stored entry is never considered stale.
    pub fn load(&self, key: &str, max_age: Option<Duration>) -> Option<ResponseBody> {
        let entry = self.entries.get(key)?;
        if let Some(limit) = max_age {
            if entry.stored_at.elapsed() > limit {
                return None;
            }
        }
        Some(entry.data.clone())
    }

    /// Store `data` under `key`, overwriting any existing entry.
    pub fn save(&self, key: &str, data: ResponseBody) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                data,
                stored_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
