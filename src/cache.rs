//! TTL-bounded LRU cache over verification decisions.
//!
//! Absorbs duplicate identical verification calls within a short window so
//! retry storms neither re-derive signature proofs nor touch the replay
//! ledger a second time. A throttle on duplicate work, not a security
//! control.

use crate::clock::Clock;
use crate::verifier::Decision;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

/// Default maximum number of cached decisions.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Default time-to-live for a cached decision.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

/// Cache key: the exact presented request.
type RequestKey = (String, String, u64);

/// Memoization layer keyed by the exact `(addr, auth, tx)` triple.
///
/// Entries are evicted by LRU order beyond capacity and expire after a
/// fixed TTL regardless of access. There is no explicit invalidation; the
/// TTL is kept short so genuine state transitions (expiry, throughput,
/// ledger) are not masked for long.
pub struct DecisionCache {
    inner: Mutex<LruCache<RequestKey, (Decision, Duration)>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl DecisionCache {
    /// Create a cache with the given capacity and TTL.
    ///
    /// A zero capacity is clamped to 1.
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(cap)),
            ttl,
            clock,
        }
    }

    /// Look up a previously computed decision for this exact request.
    ///
    /// Expired entries are dropped on access and count as a miss.
    pub fn get(&self, addr: &str, auth: &str, tx: u64) -> Option<Decision> {
        let key = (addr.to_owned(), auth.to_owned(), tx);
        let now = self.clock.now();

        let mut cache = self.inner.lock();
        if let Some((decision, inserted_at)) = cache.get(&key) {
            if now.saturating_sub(*inserted_at) < self.ttl {
                return Some(decision.clone());
            }
        } else {
            return None;
        }

        // Entry outlived its TTL; drop it on access.
        cache.pop(&key);
        None
    }

    /// Record a computed decision for this exact request.
    pub fn insert(&self, addr: &str, auth: &str, tx: u64, decision: Decision) {
        let key = (addr.to_owned(), auth.to_owned(), tx);
        let now = self.clock.now();
        self.inner.lock().put(key, (decision, now));
    }

    /// Number of live entries (including any not yet expired-on-access).
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
