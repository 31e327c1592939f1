//! Execution context for query execution.
//!
//! One context is created per query (or per reusable session) and passed
//! down through every operator. It borrows the index and the engine for its
//! whole lifetime and owns a private cache of subtree results keyed by the
//! subtree's canonical string.
//!
//! With the `sync` feature, contexts running on different threads can also
//! share a [`SharedSubtreeCache`]. A miss in the private cache then goes to
//! the shared one, so each subtree is computed once across all of them.

use crate::config::ContextConfig;
use crate::key::key_fingerprint;
use alloc::string::String;
use core::fmt;
use sift_cache::{BoundedLruCache, CacheStats};
use sift_core::{Result, ResultTable};

/// Cache of subtree results, keyed by canonical subtree string.
pub type SubtreeCache = BoundedLruCache<String, ResultTable>;

/// Subtree cache shared between threads evaluating the same query.
#[cfg(feature = "sync")]
pub type SharedSubtreeCache = sift_cache::SharedLruCache<String, ResultTable>;

/// Builds a shared subtree cache sized by `config`.
#[cfg(feature = "sync")]
pub fn shared_subtree_cache(config: &ContextConfig) -> Result<SharedSubtreeCache> {
    config.validate()?;
    SharedSubtreeCache::new(config.subtree_cache_capacity)
}

/// Execution context handed to every operator of one query.
///
/// `I` is the index and `E` the engine. The context never calls either; it
/// only hands out the references so that operators at any depth can reach
/// them. Both must outlive the context, which the `'a` borrow enforces.
pub struct ExecutionContext<'a, I: ?Sized, E: ?Sized> {
    subtree_cache: SubtreeCache,
    #[cfg(feature = "sync")]
    shared_cache: Option<&'a SharedSubtreeCache>,
    index: &'a I,
    engine: &'a E,
}

impl<'a, I: ?Sized, E: ?Sized> ExecutionContext<'a, I, E> {
    /// Creates a context with the default cache capacity.
    pub fn new(index: &'a I, engine: &'a E) -> Result<Self> {
        Self::with_config(index, engine, &ContextConfig::default())
    }

    /// Creates a context whose cache capacity comes from `config`.
    pub fn with_config(index: &'a I, engine: &'a E, config: &ContextConfig) -> Result<Self> {
        config.validate()?;
        let subtree_cache = BoundedLruCache::new(config.subtree_cache_capacity)?;
        tracing::debug!(
            capacity = config.subtree_cache_capacity,
            "created execution context"
        );
        Ok(Self {
            subtree_cache,
            #[cfg(feature = "sync")]
            shared_cache: None,
            index,
            engine,
        })
    }

    /// Creates a context that falls back to `shared` on private cache misses.
    ///
    /// Results computed by this context are published to `shared`, and
    /// results published by other contexts are reused without recomputing.
    #[cfg(feature = "sync")]
    pub fn with_shared_cache(
        index: &'a I,
        engine: &'a E,
        config: &ContextConfig,
        shared: &'a SharedSubtreeCache,
    ) -> Result<Self> {
        let mut ctx = Self::with_config(index, engine, config)?;
        ctx.shared_cache = Some(shared);
        Ok(ctx)
    }

    /// Returns the cached table for a subtree, creating a blank one if absent.
    ///
    /// A blank table is `Uncomputed`; check [`ResultTable::is_computed`]
    /// before trusting its rows. The lookup promotes the key and may evict an
    /// unrelated entry.
    pub fn get_cached_result(&mut self, key: &str) -> &mut ResultTable {
        self.subtree_cache.get_or_create(key)
    }

    /// Like [`get_cached_result`](Self::get_cached_result), also reporting
    /// whether the table had already been computed.
    pub fn lookup(&mut self, key: &str) -> (&mut ResultTable, bool) {
        let table = self.subtree_cache.get_or_create(key);
        let computed = table.is_computed();
        (table, computed)
    }

    /// Returns the computed table for `key`, running `compute` on a miss.
    ///
    /// `compute` gets the context itself, so it may evaluate child subtrees
    /// through the same cache. Its result is marked computed and stored. If it
    /// fails the error is returned and nothing is stored.
    ///
    /// With a shared cache attached, a private miss is answered from the
    /// shared cache when possible, and `compute` runs at most once per key
    /// across every context attached to it.
    pub fn compute_and_store<F>(&mut self, key: &str, compute: F) -> Result<&ResultTable>
    where
        F: FnOnce(&mut Self) -> Result<ResultTable>,
    {
        let cached = self
            .subtree_cache
            .peek(key)
            .is_some_and(ResultTable::is_computed);

        let fresh = if cached {
            tracing::trace!(key = key_fingerprint(key), "subtree cache hit");
            None
        } else {
            tracing::trace!(key = key_fingerprint(key), "subtree cache miss");
            Some(self.compute_missing(key, compute)?)
        };

        let slot = self.subtree_cache.get_or_create(key);
        if let Some(table) = fresh {
            *slot = table;
        }
        Ok(slot)
    }

    #[cfg(feature = "sync")]
    fn compute_missing<F>(&mut self, key: &str, compute: F) -> Result<ResultTable>
    where
        F: FnOnce(&mut Self) -> Result<ResultTable>,
    {
        let Some(shared) = self.shared_cache else {
            return run_computation(self, compute);
        };
        // Holds only this key's cell, so children can be computed meanwhile.
        shared.try_get_or_insert_with(key, || run_computation(self, compute))
    }

    #[cfg(not(feature = "sync"))]
    fn compute_missing<F>(&mut self, _key: &str, compute: F) -> Result<ResultTable>
    where
        F: FnOnce(&mut Self) -> Result<ResultTable>,
    {
        run_computation(self, compute)
    }

    /// The index shared by all operators of this query.
    pub fn index(&self) -> &'a I {
        self.index
    }

    /// The engine shared by all operators of this query.
    pub fn engine(&self) -> &'a E {
        self.engine
    }

    /// Number of subtree results currently cached.
    pub fn cache_len(&self) -> usize {
        self.subtree_cache.len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.subtree_cache.capacity()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.subtree_cache.stats()
    }
}

fn run_computation<C, F>(ctx: &mut C, compute: F) -> Result<ResultTable>
where
    F: FnOnce(&mut C) -> Result<ResultTable>,
{
    let mut table = compute(ctx)?;
    table.mark_computed();
    Ok(table)
}

impl<I: ?Sized, E: ?Sized> fmt::Debug for ExecutionContext<'_, I, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("subtree_cache", &self.subtree_cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use sift_core::{Error, Row, Value};

    struct Index;
    struct Engine;

    fn table_with_rows(n: usize) -> ResultTable {
        let rows: Vec<Row> = (0..n as u64).map(|i| Row::new(vec![Value::Term(i)])).collect();
        ResultTable::computed(vec!["?x".to_string()], rows).unwrap()
    }

    fn small_context<'a>(
        index: &'a Index,
        engine: &'a Engine,
        capacity: usize,
    ) -> ExecutionContext<'a, Index, Engine> {
        let config = ContextConfig::new().with_subtree_cache_capacity(capacity);
        ExecutionContext::with_config(index, engine, &config).unwrap()
    }

    #[test]
    fn test_new_uses_default_capacity() {
        let ctx = ExecutionContext::new(&Index, &Engine).unwrap();
        assert_eq!(ctx.cache_capacity(), crate::DEFAULT_SUBTREE_CACHE_CAPACITY);
        assert_eq!(ctx.cache_len(), 0);
    }

    #[test]
    fn test_zero_capacity_fails() {
        let config = ContextConfig::new().with_subtree_cache_capacity(0);
        let err = ExecutionContext::with_config(&Index, &Engine, &config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_handles_point_at_collaborators() {
        let index = Index;
        let engine = Engine;
        let ctx = ExecutionContext::new(&index, &engine).unwrap();
        assert!(core::ptr::eq(ctx.index(), &index));
        assert!(core::ptr::eq(ctx.engine(), &engine));
    }

    #[test]
    fn test_same_key_aliases_same_table() {
        let mut ctx = small_context(&Index, &Engine, 4);
        *ctx.get_cached_result("Q1") = table_with_rows(2);
        let again = ctx.get_cached_result("Q1");
        assert!(again.is_computed());
        assert_eq!(again.row_count(), 2);
        assert_eq!(ctx.cache_len(), 1);
    }

    #[test]
    fn test_capacity_two_scenario() {
        let mut ctx = small_context(&Index, &Engine, 2);

        let a = ctx.get_cached_result("A");
        assert!(!a.is_computed());
        *a = table_with_rows(5);

        let b = ctx.get_cached_result("B");
        assert!(!b.is_computed());
        *b = table_with_rows(3);

        let a = ctx.get_cached_result("A");
        assert!(a.is_computed());
        assert_eq!(a.row_count(), 5);

        let c = ctx.get_cached_result("C");
        assert!(!c.is_computed());
        assert_eq!(c.row_count(), 0);

        assert_eq!(ctx.cache_len(), 2);
        assert_eq!(ctx.get_cached_result("A").row_count(), 5);
        // "B" was least recently used and is gone; asking again hands out a blank table.
        let (b, computed) = ctx.lookup("B");
        assert!(!computed);
        assert_eq!(b.row_count(), 0);
    }

    #[test]
    fn test_lookup_reports_computed_empty_table() {
        let mut ctx = small_context(&Index, &Engine, 2);
        let (slot, computed) = ctx.lookup("EMPTY");
        assert!(!computed);
        *slot = table_with_rows(0);

        let (slot, computed) = ctx.lookup("EMPTY");
        assert!(computed);
        assert_eq!(slot.row_count(), 0);
    }

    #[test]
    fn test_compute_and_store_runs_once() {
        let mut ctx = small_context(&Index, &Engine, 4);
        let mut runs = 0;
        for _ in 0..3 {
            let table = ctx
                .compute_and_store("SCAN", |_| {
                    runs += 1;
                    Ok(ResultTable::new(vec!["?x".to_string()]))
                })
                .unwrap();
            // Stored results are marked computed even if the closure forgot.
            assert!(table.is_computed());
        }
        assert_eq!(runs, 1);
        assert_eq!(ctx.cache_stats().hits, 2);
    }

    #[test]
    fn test_compute_and_store_failure_stores_nothing() {
        let mut ctx = small_context(&Index, &Engine, 4);
        let err = ctx
            .compute_and_store("BAD", |_| Err(Error::invalid_operation("index offline")))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOperation { .. }));
        assert_eq!(ctx.cache_len(), 0);

        let table = ctx
            .compute_and_store("BAD", |_| Ok(table_with_rows(1)))
            .unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_compute_and_store_recurses() {
        let mut ctx = small_context(&Index, &Engine, 4);
        let parent = ctx
            .compute_and_store("PARENT", |ctx| {
                let child_rows = ctx
                    .compute_and_store("CHILD", |_| Ok(table_with_rows(4)))?
                    .row_count();
                Ok(table_with_rows(child_rows * 2))
            })
            .unwrap();
        assert_eq!(parent.row_count(), 8);
        assert_eq!(ctx.cache_len(), 2);
    }

    #[cfg(feature = "sync")]
    #[test]
    fn test_shared_subtree_cache_uses_config() {
        let config = ContextConfig::new().with_subtree_cache_capacity(1);
        let cache = shared_subtree_cache(&config).unwrap();
        assert_eq!(cache.capacity(), 1);

        let first = cache.get_or_insert_with("A", || table_with_rows(2));
        let again = cache.get_or_insert_with("A", || table_with_rows(9));
        assert!(first.shares_rows(&again));

        cache.get_or_insert_with("B", || table_with_rows(1));
        assert!(cache.peek("A").is_none());

        let zero = ContextConfig::new().with_subtree_cache_capacity(0);
        assert!(shared_subtree_cache(&zero).is_err());
    }

    #[cfg(feature = "sync")]
    #[test]
    fn test_contexts_share_results_through_shared_cache() {
        let shared = shared_subtree_cache(&ContextConfig::default()).unwrap();
        let config = ContextConfig::new().with_subtree_cache_capacity(2);
        let mut first = ExecutionContext::with_shared_cache(&Index, &Engine, &config, &shared).unwrap();
        let mut second = ExecutionContext::with_shared_cache(&Index, &Engine, &config, &shared).unwrap();

        let mut runs = 0;
        let a = first
            .compute_and_store("SCAN", |_| {
                runs += 1;
                Ok(table_with_rows(3))
            })
            .unwrap()
            .clone();
        let b = second
            .compute_and_store("SCAN", |_| {
                runs += 1;
                Ok(table_with_rows(3))
            })
            .unwrap()
            .clone();

        assert_eq!(runs, 1);
        assert!(a.shares_rows(&b));
        assert_eq!(second.cache_len(), 1);
    }

    #[cfg(feature = "sync")]
    #[test]
    fn test_shared_cache_nested_computation() {
        let shared = shared_subtree_cache(&ContextConfig::default()).unwrap();
        let config = ContextConfig::default();
        let mut ctx = ExecutionContext::with_shared_cache(&Index, &Engine, &config, &shared).unwrap();

        let parent = ctx
            .compute_and_store("PARENT", |ctx| {
                let child_rows = ctx
                    .compute_and_store("CHILD", |_| Ok(table_with_rows(4)))?
                    .row_count();
                Ok(table_with_rows(child_rows + 1))
            })
            .unwrap();
        assert_eq!(parent.row_count(), 5);
        assert_eq!(shared.len(), 2);
        assert_eq!(shared.peek("CHILD").map(|t| t.row_count()), Some(4));
    }
}
