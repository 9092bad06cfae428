//! Bounded translation cache
//!
//! Least-recently-used map guarded by a mutex so that encode and decode calls on
//! the same converter may share it across worker threads.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

/// Default number of translations held per direction
pub const DEFAULT_CACHE_SIZE: usize = 50;

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

#[derive(Debug)]
struct LruCache<K, V> {
    capacity: usize,
    cache: HashMap<K, V>,
    /// Front is most recently used
    order: VecDeque<K>,
    stats: CacheStats,
}

impl<K: Hash + Eq + Clone, V: Clone> LruCache<K, V> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cache: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            stats: CacheStats::default(),
        }
    }

    fn touch(&mut self, key: &K) {
        self.order.retain(|k| k != key);
        self.order.push_front(key.clone());
    }

    fn get(&mut self, key: &K) -> Option<V> {
        match self.cache.get(key).cloned() {
            Some(value) => {
                self.touch(key);
                self.stats.hits += 1;
                Some(value)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    fn put(&mut self, key: K, value: V) {
        if !self.cache.contains_key(&key) && self.cache.len() >= self.capacity {
            if let Some(lru) = self.order.pop_back() {
                self.cache.remove(&lru);
                self.stats.evictions += 1;
            }
        }
        self.touch(&key);
        self.cache.insert(key, value);
    }

    fn clear(&mut self) {
        self.cache.clear();
        self.order.clear();
    }
}

/// Thread-safe bounded LRU cache mapping one schema representation to its
/// translation in the other type system
#[derive(Debug)]
pub struct TranslationCache<K, V> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K: Hash + Eq + Clone, V: Clone> TranslationCache<K, V> {
    /// Create a cache holding at most `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity.max(1))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, V>> {
        // A panic while holding the lock cannot leave the map half-updated in a
        // way that breaks lookups, so a poisoned cache stays usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Look up a translation, marking it most recently used
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key)
    }

    /// Insert a translation, evicting the least recently used entry when full
    pub fn put(&self, key: K, value: V) {
        self.lock().put(key, value);
    }

    /// Return the cached translation or compute, store and return a new one
    ///
    /// The lock is not held while `translate` runs, so concurrent misses on the
    /// same key may both translate; the results are identical.
    pub fn get_or_try_insert<E>(
        &self,
        key: K,
        translate: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = translate()?;
        self.put(key, value.clone());
        Ok(value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock().cache.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    pub fn stats(&self) -> CacheStats {
        let guard = self.lock();
        CacheStats {
            entries: guard.cache.len(),
            ..guard.stats
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<K: Hash + Eq + Clone, V: Clone> Default for TranslationCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}
