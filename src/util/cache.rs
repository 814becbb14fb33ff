//! Module implementing a thread-safe memoizing cache.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use antidote::Mutex;


/// A thread-safe cache of keys & shared values.
/// Actual values stored in the cache are `Arc<V>`'s.
///
/// Nothing is ever evicted: the cache is meant for a small, fixed set
/// of resources (like the fonts of a single generator) that are expensive
/// to load and cheap to keep around.
/// Hits and misses are counted so that callers can verify that.
pub struct SharedCache<K: Eq + Hash, V> {
    inner: Mutex<HashMap<K, Arc<V>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<K: Eq + Hash, V> SharedCache<K, V> {
    #[inline]
    pub fn new() -> Self {
        SharedCache{
            inner: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }
}

impl<K: Eq + Hash, V> Default for SharedCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> SharedCache<K, V> {
    /// Get the element corresponding to given key if it's present in the cache.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
        where K: Borrow<Q>, Q: ?Sized + Eq + Hash
    {
        match self.inner.lock().get(key) {
            Some(v) => { self.hits.fetch_add(1, Ordering::Relaxed); Some(v.clone()) }
            None => { self.misses.fetch_add(1, Ordering::Relaxed); None }
        }
    }

    /// Put an item into cache under given key.
    ///
    /// Always returns the (`Arc`'d) value that ends up under the key.
    /// If another thread managed to put a value there first, that value wins
    /// and `v` is dropped, so every caller observes the same shared instance.
    pub fn put(&self, k: K, v: V) -> Arc<V> {
        self.inner.lock().entry(k).or_insert_with(|| Arc::new(v)).clone()
    }

    /// Current size of the cache.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

impl<K: Eq + Hash, V> fmt::Debug for SharedCache<K, V> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let mut ds = fmt.debug_struct("SharedCache");
        if let Ok(inner) = self.inner.try_lock() {
            ds.field("len", &inner.len());
        }
        ds.field("hits", &self.hits());
        ds.field("misses", &self.misses());
        ds.finish()
    }
}
