//! Fixed-capacity cache with least-recently-used eviction.
//!
//! Values live in a slab of nodes that never has holes: the slab grows until
//! it reaches the capacity, after which every miss evicts the least recently
//! used node and reuses its slot. Recency is tracked with a global access
//! counter; `recency` maps each node's last access tick to its slot, so the
//! oldest entry is always the first key of the map.

use crate::stats::CacheStats;
use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::convert::Infallible;
use core::fmt;
use core::hash::Hash;
use hashbrown::HashMap;
use sift_core::{Error, Result};

struct Node<K, V> {
    key: K,
    value: V,
    last_access: u64,
}

/// LRU cache holding at most `capacity` entries.
///
/// Every lookup, hit or miss, promotes its key to most recently used. There
/// is no remove operation: entries leave only through eviction or when the
/// cache is dropped.
pub struct BoundedLruCache<K, V> {
    /// Key to slot in `nodes`.
    index: HashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    /// Last access tick to slot, oldest first.
    recency: BTreeMap<u64, usize>,
    capacity: usize,
    /// Global access counter for LRU tracking.
    access_counter: u64,
    stats: CacheStats,
}

impl<K, V> BoundedLruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Creates an empty cache.
    ///
    /// Fails with `InvalidConfiguration` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid_configuration(format!(
                "cache capacity must be at least 1, got {}",
                capacity
            )));
        }
        tracing::debug!(capacity, "created bounded LRU cache");
        Ok(Self {
            index: HashMap::new(),
            nodes: Vec::new(),
            recency: BTreeMap::new(),
            capacity,
            access_counter: 0,
            stats: CacheStats::default(),
        })
    }

    /// Returns the value for `key`, inserting `V::default()` if absent.
    ///
    /// A fresh default value and a resident value look the same to the
    /// caller. Value types that need the difference must carry it themselves,
    /// as `ResultTable` does with its status.
    pub fn get_or_create<Q>(&mut self, key: &Q) -> &mut V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Returns the value for `key`, building it with `make` if absent.
    pub fn get_or_insert_with<Q, F>(&mut self, key: &Q, make: F) -> &mut V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> V,
    {
        match self.try_get_or_insert_with(key, || Ok::<V, Infallible>(make())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Returns the value for `key`, building it with `make` if absent.
    ///
    /// If `make` fails the error is returned and the cache keeps all of its
    /// entries and counters; nothing is inserted, evicted or recorded.
    pub fn try_get_or_insert_with<Q, F, E>(
        &mut self,
        key: &Q,
        make: F,
    ) -> core::result::Result<&mut V, E>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> core::result::Result<V, E>,
    {
        self.access_counter += 1;
        let tick = self.access_counter;

        let slot = match self.index.get(key).copied() {
            Some(slot) => {
                self.stats.record_hit();
                let previous = core::mem::replace(&mut self.nodes[slot].last_access, tick);
                self.recency.remove(&previous);
                self.recency.insert(tick, slot);
                slot
            }
            None => {
                let value = make()?;
                self.stats.record_miss();
                let node = Node {
                    key: key.to_owned(),
                    value,
                    last_access: tick,
                };
                self.insert_node(node)
            }
        };

        Ok(&mut self.nodes[slot].value)
    }

    /// Places a node for a key that is not resident, evicting first if full.
    fn insert_node(&mut self, node: Node<K, V>) -> usize {
        let slot = match self.evict_if_full() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.index.insert(self.nodes[slot].key.clone(), slot);
        self.recency.insert(self.nodes[slot].last_access, slot);
        slot
    }

    /// Unlinks the least recently used node when the slab is full and
    /// returns its slot for reuse.
    fn evict_if_full(&mut self) -> Option<usize> {
        if self.nodes.len() < self.capacity {
            return None;
        }
        let (_, slot) = self.recency.pop_first()?;
        self.index.remove(&self.nodes[slot].key);
        self.stats.record_eviction();
        tracing::trace!(
            slot,
            resident = self.index.len(),
            "evicted least recently used entry"
        );
        Some(slot)
    }

    /// Returns the value for `key` without promoting it.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&slot| &self.nodes[slot].value)
    }

    /// Checks residency without promoting.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Resident keys from least to most recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> + '_ {
        self.recency.values().map(move |&slot| &self.nodes[slot].key)
    }
}

impl<K, V> BoundedLruCache<K, V> {
    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maximum number of resident entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hit, miss and eviction counters since construction.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl<K, V> fmt::Debug for BoundedLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedLruCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
