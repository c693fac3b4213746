use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    fetched_at: Instant,
}

/// In-memory response cache keyed by URL.
///
/// Entries expire `ttl` after they were fetched. Expired entries are
/// dropped lazily on lookup and in bulk by [`ResponseCache::sweep`], which
/// runs at most once per `ttl`. Not synchronized; the fetcher owns it
/// behind a mutex.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
    last_sweep: Instant,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
            last_sweep: Instant::now(),
        }
    }

    /// Cached body of `url` if it is younger than the TTL.
    pub fn get(&mut self, url: &str, now: Instant) -> Option<String> {
        let entry = self.entries.get(url)?;
        if now.saturating_duration_since(entry.fetched_at) < self.ttl {
            return Some(entry.body.clone());
        }
        self.entries.remove(url);
        None
    }

    pub fn insert(&mut self, url: impl Into<String>, body: impl Into<String>, now: Instant) {
        self.entries.insert(
            url.into(),
            CacheEntry {
                body: body.into(),
                fetched_at: now,
            },
        );
    }

    /// Purges expired entries when the last sweep is older than the TTL
    /// and at least one entry has expired. Returns the number removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        if now.saturating_duration_since(self.last_sweep) < self.ttl {
            return 0;
        }
        let ttl = self.ttl;
        let expired = |entry: &CacheEntry| now.saturating_duration_since(entry.fetched_at) >= ttl;
        if !self.entries.values().any(expired) {
            return 0;
        }

        let before = self.entries.len();
        self.entries.retain(|_, entry| !expired(entry));
        self.last_sweep = now;
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(86_400);

    #[tokio::test(start_paused = true)]
    async fn hit_within_ttl() {
        let mut cache = ResponseCache::new(DAY);
        let start = Instant::now();
        cache.insert("u", "body", start);

        assert_eq!(cache.get("u", start + DAY / 2).as_deref(), Some("body"));
        assert_eq!(cache.get("other", start), None);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_dropped_on_lookup() {
        let mut cache = ResponseCache::new(DAY);
        let start = Instant::now();
        cache.insert("u", "body", start);

        assert_eq!(cache.get("u", start + DAY), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_runs_once_per_ttl() {
        let mut cache = ResponseCache::new(DAY);
        let start = Instant::now();
        cache.insert("old", "a", start);

        // Too early: nothing has expired and the last sweep is fresh.
        assert_eq!(cache.sweep(start + DAY / 2), 0);

        cache.insert("new", "b", start + DAY);
        assert_eq!(cache.sweep(start + DAY + Duration::from_secs(1)), 1);
        assert_eq!(cache.len(), 1);

        // The next sweep waits another full TTL.
        cache.insert("stale", "c", start);
        assert_eq!(cache.sweep(start + DAY + Duration::from_secs(2)), 0);
    }
}
