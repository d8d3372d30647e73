//! Filter-keyed list cache with a freshness window, plus the visibility rules
//! that decide when to throw it away.
//!
//! Time comes from `tokio::time::Instant` so tests can pause and advance the
//! clock.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Timing knobs for one cached list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Entries older than this are evicted on lookup.
    pub ttl: Duration,
    /// While visible, the whole cache is dropped this often.
    pub refresh_interval: Duration,
    /// Returning from hidden clears the cache only if hidden at least this long...
    pub hidden_threshold: Duration,
    /// ...and the most recent fill is older than this.
    pub stale_fill_threshold: Duration,
}

impl CachePolicy {
    /// Public job board.
    pub const JOBS: CachePolicy = CachePolicy {
        ttl: Duration::from_secs(10 * 60),
        refresh_interval: Duration::from_secs(15 * 60),
        hidden_threshold: Duration::from_secs(2 * 60),
        stale_fill_threshold: Duration::from_secs(5 * 60),
    };
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy::JOBS
    }
}

struct Entry<T> {
    items: Vec<T>,
    stored_at: Instant,
}

pub struct ListCache<T> {
    ttl: Duration,
    entries: HashMap<String, Entry<T>>,
    last_fill: Option<Instant>,
}

impl<T: Clone> ListCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new(), last_fill: None }
    }

    /// Fresh entry for `key`. A stale entry is removed and `None` returned.
    pub fn get(&mut self, key: &str) -> Option<Vec<T>> {
        let fresh = self.entries.get(key)?.stored_at.elapsed() < self.ttl;
        if fresh {
            debug!(key, "list cache hit");
            self.entries.get(key).map(|e| e.items.clone())
        } else {
            debug!(key, "list cache entry expired");
            self.entries.remove(key);
            None
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, items: Vec<T>) {
        let now = Instant::now();
        self.entries.insert(key.into(), Entry { items, stored_at: now });
        self.last_fill = Some(now);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_fill = None;
    }

    pub fn last_fill(&self) -> Option<Instant> {
        self.last_fill
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tracks page visibility and answers "should the cache be dropped now?".
#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    policy: CachePolicy,
    hidden_since: Option<Instant>,
}

impl VisibilityTracker {
    pub fn new(policy: CachePolicy) -> Self {
        Self { policy, hidden_since: None }
    }

    pub fn is_visible(&self) -> bool {
        self.hidden_since.is_none()
    }

    pub fn hidden(&mut self) {
        if self.hidden_since.is_none() {
            self.hidden_since = Some(Instant::now());
        }
    }

    /// Back to visible. True when the cache should be cleared: hidden longer
    /// than the threshold and the last fill (if any) older than the stale
    /// threshold.
    pub fn visible(&mut self, last_fill: Option<Instant>) -> bool {
        let Some(since) = self.hidden_since.take() else {
            return false;
        };
        let hidden_long = since.elapsed() > self.policy.hidden_threshold;
        let fill_stale = last_fill.map_or(true, |t| t.elapsed() > self.policy.stale_fill_threshold);
        hidden_long && fill_stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let mut cache = ListCache::new(Duration::from_secs(600));
        cache.insert("rust---", vec![1, 2, 3]);

        advance(Duration::from_secs(599)).await;
        assert_eq!(cache.get("rust---"), Some(vec![1, 2, 3]));

        advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("rust---"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_resets_last_fill() {
        let mut cache = ListCache::new(Duration::from_secs(60));
        cache.insert("a", vec!['x']);
        assert!(cache.last_fill().is_some());
        cache.clear();
        assert!(cache.last_fill().is_none());
        assert_eq!(cache.get("a"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_absence_keeps_cache() {
        let mut vis = VisibilityTracker::new(CachePolicy::JOBS);
        let fill = Instant::now();
        advance(Duration::from_secs(10 * 60)).await;
        vis.hidden();
        advance(Duration::from_secs(60)).await;
        assert!(!vis.visible(Some(fill)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_absence_with_stale_fill_clears() {
        let mut vis = VisibilityTracker::new(CachePolicy::JOBS);
        let fill = Instant::now();
        vis.hidden();
        advance(Duration::from_secs(6 * 60)).await;
        assert!(vis.visible(Some(fill)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_absence_with_recent_fill_keeps_cache() {
        let mut vis = VisibilityTracker::new(CachePolicy::JOBS);
        vis.hidden();
        advance(Duration::from_secs(3 * 60)).await;
        let fill = Instant::now();
        advance(Duration::from_secs(60)).await;
        assert!(!vis.visible(Some(fill)));
    }

    #[test]
    fn test_visible_without_hidden_is_noop() {
        let mut vis = VisibilityTracker::new(CachePolicy::JOBS);
        assert!(vis.is_visible());
        assert!(!vis.visible(None));
    }
}
