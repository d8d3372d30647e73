//! The list page controller: filter changes go through the cache, misses are
//! fetched in a background task, and a newer filter set aborts the older
//! fetch so its result can never overwrite the current one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{CachePolicy, ListCache, VisibilityTracker};
use crate::fetch::{Fingerprint, ListSource, Poller};
use crate::pagination::{paginate, Page};

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    /// Fingerprint of the filters `items` belong to.
    pub fingerprint: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self { items: Vec::new(), loading: false, error: None, fingerprint: None }
    }
}

type SharedCache<T> = Arc<Mutex<ListCache<T>>>;

fn lock<T>(cache: &Mutex<ListCache<T>>) -> MutexGuard<'_, ListCache<T>> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ListController<S: ListSource> {
    source: Arc<S>,
    cache: SharedCache<S::Item>,
    visibility: VisibilityTracker,
    policy: CachePolicy,
    state: Arc<watch::Sender<ListState<S::Item>>>,
    /// Bumped on every `start`; a fetch only publishes if it still matches.
    generation: Arc<Mutex<u64>>,
    inflight: Option<JoinHandle<()>>,
}

impl<S: ListSource> ListController<S> {
    pub fn new(source: S, policy: CachePolicy) -> Self {
        let (state, _) = watch::channel(ListState::default());
        Self {
            source: Arc::new(source),
            cache: Arc::new(Mutex::new(ListCache::new(policy.ttl))),
            visibility: VisibilityTracker::new(policy),
            policy,
            state: Arc::new(state),
            generation: Arc::new(Mutex::new(0)),
            inflight: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<S::Item>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ListState<S::Item> {
        self.state.borrow().clone()
    }

    /// Waits until no fetch is pending and returns the state.
    pub async fn settled(&self) -> ListState<S::Item> {
        let mut rx = self.state.subscribe();
        let settled = match rx.wait_for(|s| !s.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }

    /// Show the list for `filters`: served from the cache when fresh,
    /// otherwise fetched. Any fetch still running for older filters is
    /// aborted.
    pub fn start(&mut self, filters: S::Filters) {
        let key = filters.fingerprint();
        let generation = {
            let mut g = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
            *g += 1;
            *g
        };
        if let Some(handle) = self.inflight.take() {
            debug!("aborting superseded fetch");
            handle.abort();
        }

        if let Some(items) = lock(&self.cache).get(&key) {
            self.state.send_replace(ListState {
                items,
                loading: false,
                error: None,
                fingerprint: Some(key),
            });
            return;
        }

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let source = self.source.clone();
        let cache = self.cache.clone();
        let state = self.state.clone();
        let current = self.generation.clone();
        self.inflight = Some(tokio::spawn(async move {
            let result = source.fetch(&filters).await;
            let latest = current.lock().unwrap_or_else(PoisonError::into_inner);
            if *latest != generation {
                debug!(key = %key, "discarding result for superseded filters");
                return;
            }
            let next = match result {
                Ok(items) => {
                    lock(&cache).insert(key.clone(), items.clone());
                    ListState { items, loading: false, error: None, fingerprint: Some(key) }
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "list fetch failed");
                    ListState {
                        items: Vec::new(),
                        loading: false,
                        error: Some(e.to_string()),
                        fingerprint: Some(key),
                    }
                }
            };
            state.send_replace(next);
        }));
    }

    /// Page `n` (1-based, clamped) of the current items.
    pub fn page(&self, n: usize, size: usize) -> Page<S::Item> {
        paginate(&self.state.borrow().items, n, size)
    }

    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
    }

    pub fn cached_entries(&self) -> usize {
        lock(&self.cache).len()
    }

    pub fn hidden(&mut self) {
        self.visibility.hidden();
    }

    /// Back to visible. Returns true when the cache was cleared.
    pub fn visible(&mut self) -> bool {
        let last_fill = lock(&self.cache).last_fill();
        let stale = self.visibility.visible(last_fill);
        if stale {
            debug!("cache cleared after long absence");
            self.clear_cache();
        }
        stale
    }

    /// Clears the cache every refresh interval while `visible` is true.
    pub fn spawn_refresh(&self, visible: watch::Receiver<bool>) -> Poller {
        let cache = self.cache.clone();
        Poller::spawn(self.policy.refresh_interval, visible, move || {
            lock(&cache).clear();
            async {}
        })
    }
}

impl<S: ListSource> Drop for ListController<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
    }
}
