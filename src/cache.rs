//! Bounded LRU cache
//!
//! Fixed-capacity memoization store shared across generation sessions. Entries
//! live in a slab threaded by an intrusive recency list so `get` and `put` are
//! O(1); the whole structure sits behind one `parking_lot::Mutex`.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use tracing::trace;

/// Hit/miss/eviction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct Slot<K, V> {
    key: K,
    value: V,
    /// Towards the most recently used end.
    prev: Option<usize>,
    /// Towards the least recently used end.
    next: Option<usize>,
}

struct LruInner<K, V> {
    index: HashMap<K, usize>,
    slots: Vec<Option<Slot<K, V>>>,
    free: Vec<usize>,
    /// Most recently used.
    head: Option<usize>,
    /// Least recently used.
    tail: Option<usize>,
    stats: CacheStats,
}

impl<K: Eq + Hash + Clone, V> LruInner<K, V> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            stats: CacheStats::default(),
        }
    }

    fn slot(&self, idx: usize) -> &Slot<K, V> {
        self.slots[idx].as_ref().expect("linked slot is occupied")
    }

    fn slot_mut(&mut self, idx: usize) -> &mut Slot<K, V> {
        self.slots[idx].as_mut().expect("linked slot is occupied")
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let slot = self.slot(idx);
            (slot.prev, slot.next)
        };
        match prev {
            Some(p) => self.slot_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slot_mut(n).prev = prev,
            None => self.tail = prev,
        }
        let slot = self.slot_mut(idx);
        slot.prev = None;
        slot.next = None;
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let slot = self.slot_mut(idx);
            slot.prev = None;
            slot.next = old_head;
        }
        if let Some(h) = old_head {
            self.slot_mut(h).prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn touch(&mut self, idx: usize) {
        if self.head != Some(idx) {
            self.unlink(idx);
            self.push_front(idx);
        }
    }

    fn remove_slot(&mut self, idx: usize) -> Slot<K, V> {
        self.unlink(idx);
        let slot = self.slots[idx].take().expect("linked slot is occupied");
        self.index.remove(&slot.key);
        self.free.push(idx);
        slot
    }

    fn insert_new(&mut self, key: K, value: V) {
        let slot = Slot {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, idx);
        self.push_front(idx);
    }
}

/// Fixed-capacity, strictly least-recently-used cache.
///
/// `0 <= len() <= capacity()` holds at every point observable from outside the
/// lock.
pub struct BoundedCache<K, V> {
    capacity: usize,
    inner: Mutex<LruInner<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Mutex::new(LruInner::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a value, promoting it to most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        match inner.index.get(key).copied() {
            Some(idx) => {
                inner.touch(idx);
                inner.stats.hits += 1;
                Some(inner.slot(idx).value.clone())
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Membership test that does not affect recency.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.lock().index.contains_key(key)
    }

    /// Insert or replace a value, evicting the least recently used entry when
    /// the cache is full. Returns the evicted key, if any.
    pub fn put(&self, key: K, value: V) -> Option<K> {
        let mut inner = self.inner.lock();
        if let Some(idx) = inner.index.get(&key).copied() {
            inner.slot_mut(idx).value = value;
            inner.touch(idx);
            return None;
        }

        let mut evicted = None;
        if inner.index.len() >= self.capacity {
            if let Some(lru) = inner.tail {
                let slot = inner.remove_slot(lru);
                inner.stats.evictions += 1;
                trace!(capacity = self.capacity, "Evicted least recently used cache entry");
                evicted = Some(slot.key);
            }
        }
        inner.insert_new(key, value);
        evicted
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let idx = inner.index.get(key).copied()?;
        Some(inner.remove_slot(idx).value)
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        let stats = inner.stats;
        *inner = LruInner::with_capacity(self.capacity);
        inner.stats = stats;
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats
    }

    /// Return the cached value or compute, store and return it.
    ///
    /// `compute` runs outside the lock, so it may itself use this cache.
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute();
        self.put(key, value.clone());
        value
    }

    /// Fallible variant of [`get_or_insert_with`](Self::get_or_insert_with).
    /// Errors are returned as-is and never cached.
    pub fn get_or_try_insert_with<F, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        self.put(key, value.clone());
        Ok(value)
    }

    /// Keys ordered from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<K> {
        let inner = self.inner.lock();
        let mut keys = Vec::with_capacity(inner.index.len());
        let mut cursor = inner.head;
        while let Some(idx) = cursor {
            let slot = inner.slot(idx);
            keys.push(slot.key.clone());
            cursor = slot.next;
        }
        keys
    }
}

impl<K, V> fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("BoundedCache")
            .field("capacity", &self.capacity)
            .field("len", &inner.index.len())
            .field("stats", &inner.stats)
            .finish()
    }
}
