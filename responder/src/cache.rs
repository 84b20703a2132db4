//! Bounded completion cache keyed by `(query, mode)`.
//!
//! FIFO eviction at capacity, optional TTL, clock injected for tests.
//! Concurrent readers and writers share one `RwLock`; a racing insert for the
//! same key simply overwrites an equivalent value.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ai_llm_service::Completion;
use tokio::sync::RwLock;
use tracing::debug;

use crate::prompt::Mode;

/// Time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub query: String,
    pub mode: Mode,
}

impl CacheKey {
    pub fn new(query: &str, mode: Mode) -> Self {
        Self {
            query: query.to_string(),
            mode,
        }
    }
}

struct Entry {
    value: Completion,
    stored_at: Instant,
}

#[derive(Default)]
struct Inner {
    map: HashMap<CacheKey, Entry>,
    order: VecDeque<CacheKey>,
}

pub struct ResponseCache {
    inner: RwLock<Inner>,
    capacity: usize,
    ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self::with_clock(capacity, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, ttl: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity,
            ttl,
            clock,
        }
    }

    /// Cached completion for `key`, unless missing or expired.
    pub async fn get(&self, key: &CacheKey) -> Option<Completion> {
        let inner = self.inner.read().await;
        let entry = inner.map.get(key)?;
        if let Some(ttl) = self.ttl {
            if self.clock.now().saturating_duration_since(entry.stored_at) >= ttl {
                debug!(mode = %key.mode, "cache entry expired");
                return None;
            }
        }
        Some(entry.value.clone())
    }

    /// Stores `value`, evicting the oldest entry when full.
    pub async fn insert(&self, key: CacheKey, value: Completion) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.write().await;
        let entry = Entry {
            value,
            stored_at: self.clock.now(),
        };
        if let Some(slot) = inner.map.get_mut(&key) {
            *slot = entry;
            return;
        }
        while inner.map.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.map.remove(&oldest);
        }
        inner.order.push_back(key.clone());
        inner.map.insert(key, entry);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Manually advanced clock.
    pub(crate) struct ManualClock(Mutex<Instant>);

    impl ManualClock {
        pub(crate) fn new() -> Self {
            Self(Mutex::new(Instant::now()))
        }

        pub(crate) fn advance(&self, d: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += d;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.0.lock().unwrap()
        }
    }

    fn completion(text: &str) -> Completion {
        Completion {
            text: text.into(),
            model: "sonar".into(),
            tokens_used: 10,
        }
    }

    #[tokio::test]
    async fn keys_distinguish_modes() {
        let cache = ResponseCache::new(8, None);
        cache
            .insert(CacheKey::new("services", Mode::View), completion("view"))
            .await;
        assert_eq!(
            cache.get(&CacheKey::new("services", Mode::View)).await.unwrap().text,
            "view"
        );
        assert!(cache.get(&CacheKey::new("services", Mode::Text)).await.is_none());
    }

    #[tokio::test]
    async fn evicts_oldest_at_capacity() {
        let cache = ResponseCache::new(2, None);
        for q in ["a", "b", "c"] {
            cache.insert(CacheKey::new(q, Mode::Text), completion(q)).await;
        }
        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&CacheKey::new("a", Mode::Text)).await.is_none());
        assert!(cache.get(&CacheKey::new("c", Mode::Text)).await.is_some());
    }

    #[tokio::test]
    async fn overwrite_keeps_size() {
        let cache = ResponseCache::new(2, None);
        let key = CacheKey::new("a", Mode::Decide);
        cache.insert(key.clone(), completion("1")).await;
        cache.insert(key.clone(), completion("2")).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&key).await.unwrap().text, "2");
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = ResponseCache::with_clock(4, Some(Duration::from_secs(60)), clock.clone());
        let key = CacheKey::new("a", Mode::Text);
        cache.insert(key.clone(), completion("x")).await;

        clock.advance(Duration::from_secs(59));
        assert!(cache.get(&key).await.is_some());
        clock.advance(Duration::from_secs(1));
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn zero_capacity_disables_caching() {
        let cache = ResponseCache::new(0, None);
        cache.insert(CacheKey::new("a", Mode::Text), completion("x")).await;
        assert!(cache.is_empty().await);
    }
}
