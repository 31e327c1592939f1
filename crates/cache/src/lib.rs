//! Sift Cache - bounded memoization caches for query execution.
//!
//! This crate provides:
//!
//! - `BoundedLruCache`: fixed-capacity map with get-or-create and LRU eviction
//! - `CacheStats`: hit, miss and eviction counters
//! - `SharedLruCache`: mutex-guarded cache for multi-threaded evaluation (feature `sync`)
//!
//! # Example
//!
//! ```rust
//! use sift_cache::BoundedLruCache;
//!
//! let mut cache: BoundedLruCache<String, Vec<u32>> = BoundedLruCache::new(2).unwrap();
//! cache.get_or_create("a").push(1);
//! cache.get_or_create("b");
//! cache.get_or_create("a");
//! cache.get_or_create("c"); // evicts "b"
//!
//! assert_eq!(cache.peek("a"), Some(&vec![1]));
//! assert!(!cache.contains("b"));
//! ```

#![no_std]

extern crate alloc;

#[cfg(feature = "sync")]
extern crate std;

mod lru;
#[cfg(feature = "sync")]
mod shared;
mod stats;

pub use lru::BoundedLruCache;
#[cfg(feature = "sync")]
pub use shared::SharedLruCache;
pub use stats::CacheStats;
