//! Thread-safe wrapper around [`BoundedLruCache`].
//!
//! The LRU maps each key to a cell holding the value once it is known. The
//! cache lock is held only to find or create the cell; the value is then
//! computed under that cell's own lock. Threads asking for the same key wait
//! for a single computation, while the computation itself may look up other
//! keys of the same cache, as a parent subtree does for its children.
//!
//! Looking up a key from inside its own computation deadlocks. Subtree keys
//! form a tree, so this only happens for a cyclic plan.

use crate::lru::BoundedLruCache;
use crate::stats::CacheStats;
use alloc::borrow::ToOwned;
use alloc::sync::Arc;
use core::borrow::Borrow;
use core::hash::Hash;
use parking_lot::Mutex;
use sift_core::Result;

/// Value slot for one key. `None` until a computation succeeds.
type Cell<V> = Arc<Mutex<Option<V>>>;

/// LRU cache that can be shared between threads.
///
/// Values are handed out by clone, so `V` should be cheap to clone. A key
/// whose computation failed keeps an empty cell until it is evicted; the
/// next lookup of that key computes again.
pub struct SharedLruCache<K, V> {
    inner: Mutex<BoundedLruCache<K, Cell<V>>>,
}

impl<K, V> SharedLruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates an empty shared cache. Fails on zero capacity.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            inner: Mutex::new(BoundedLruCache::new(capacity)?),
        })
    }

    /// Finds or creates the cell for `key`, promoting it. The cache lock is
    /// released before returning.
    fn cell<Q>(&self, key: &Q) -> Cell<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        Arc::clone(
            self.inner
                .lock()
                .get_or_insert_with(key, || Arc::new(Mutex::new(None))),
        )
    }

    /// Returns a clone of the value for `key`, building it with `make` if
    /// absent. Other threads asking for `key` meanwhile wait for the result.
    pub fn get_or_insert_with<Q, F>(&self, key: &Q, make: F) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> V,
    {
        let cell = self.cell(key);
        let mut slot = cell.lock();
        slot.get_or_insert_with(make).clone()
    }

    /// Fallible variant of [`get_or_insert_with`](Self::get_or_insert_with).
    /// A failed computation stores no value.
    pub fn try_get_or_insert_with<Q, F, E>(&self, key: &Q, make: F) -> core::result::Result<V, E>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> core::result::Result<V, E>,
    {
        let cell = self.cell(key);
        let mut slot = cell.lock();
        if let Some(value) = &*slot {
            return Ok(value.clone());
        }
        let value = make()?;
        *slot = Some(value.clone());
        Ok(value)
    }

    /// Returns a clone of the value for `key` without promoting it. Waits if
    /// the value is being computed.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let cell = self.inner.lock().peek(key).cloned()?;
        let slot = cell.lock();
        slot.clone()
    }

    /// Number of resident keys, including keys still being computed.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }
}
