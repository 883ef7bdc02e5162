// src/cache.rs
// Time-bounded memoization of processed collections, keyed by the dashboard
// time-range selector. Explicit component rather than global state so it can
// be swapped or shrunk in tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::article::CleanArticle;

/// The dashboard's time-range selector: exactly three options, each mapped to
/// a `(start, end)` UTC window ending at now. Doubles as the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    Day,
    Week,
    Month,
}

impl TimeRange {
    /// Parse the `range` query value. Unknown values fall back to one day so
    /// a typo in the shell never turns into an error page.
    pub fn from_query(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "7d" | "week" => TimeRange::Week,
            "30d" | "month" => TimeRange::Month,
            _ => TimeRange::Day,
        }
    }

    pub fn days(self) -> i64 {
        match self {
            TimeRange::Day => 1,
            TimeRange::Week => 7,
            TimeRange::Month => 30,
        }
    }

    pub fn window(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - chrono::Duration::days(self.days()), now)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Day => "24h",
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
        }
    }
}

#[derive(Debug)]
struct Entry {
    stored_at: Instant,
    articles: Vec<CleanArticle>,
}

/// Thread-safe TTL cache over processed collections.
///
/// Absolute TTL, no sliding refresh: a hit does not extend an entry's life.
/// Expired entries are dropped on access; with three possible keys there is
/// nothing to evict beyond that.
#[derive(Debug)]
pub struct ArticleCache {
    inner: Mutex<HashMap<TimeRange, Entry>>,
    ttl: Duration,
}

impl ArticleCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Convenience constructor for the default 1h window.
    pub fn new_1h() -> Self {
        Self::with_ttl(Duration::from_secs(3600))
    }

    /// Fresh entry for `range`, or `None` on miss or expiry.
    pub fn get(&self, range: TimeRange) -> Option<Vec<CleanArticle>> {
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        match map.get(&range) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.articles.clone()),
            Some(_) => {
                map.remove(&range);
                None
            }
            None => None,
        }
    }

    /// Store a collection for `range`, replacing any previous entry.
    pub fn put(&self, range: TimeRange, articles: Vec<CleanArticle>) {
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        map.insert(
            range,
            Entry {
                stored_at: Instant::now(),
                articles,
            },
        );
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs()
    }
}
