//! Sift Query - per-query execution context with subtree memoization.
//!
//! This crate provides:
//!
//! - `context`: `ExecutionContext`, which couples a private subtree result
//!   cache with shared handles to the index and the engine
//! - `config`: `ContextConfig` and the default cache capacity
//! - `key`: canonical cache keys for query subtrees
//! - `operator`: memoized evaluation of operator trees
//!
//! # Example
//!
//! ```rust
//! use sift_query::{ContextConfig, ExecutionContext};
//! use sift_core::ResultTable;
//!
//! struct Index;
//! struct Engine;
//!
//! let config = ContextConfig::new().with_subtree_cache_capacity(2);
//! let mut ctx = ExecutionContext::with_config(&Index, &Engine, &config).unwrap();
//!
//! let table = ctx.get_cached_result("SCAN(2:?s)");
//! assert!(!table.is_computed());
//! *table = ResultTable::computed(vec!["?s".into()], vec![]).unwrap();
//!
//! assert!(ctx.get_cached_result("SCAN(2:?s)").is_computed());
//! ```

#![no_std]

extern crate alloc;

pub mod config;
pub mod context;
pub mod key;
pub mod operator;

pub use config::{ContextConfig, DEFAULT_SUBTREE_CACHE_CAPACITY};
#[cfg(feature = "sync")]
pub use context::{shared_subtree_cache, SharedSubtreeCache};
pub use context::{ExecutionContext, SubtreeCache};
pub use key::{key_fingerprint, KeyWriter, SubtreeKey};
pub use operator::{evaluate, Operator};
