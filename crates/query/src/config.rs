//! Configuration for execution contexts.

use alloc::format;
use sift_core::{Error, Result};

/// Number of subtree results an execution context keeps by default.
pub const DEFAULT_SUBTREE_CACHE_CAPACITY: usize = 1000;

/// Settings applied when an [`ExecutionContext`](crate::ExecutionContext) is built.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContextConfig {
    /// Maximum number of subtree results held by the context's cache.
    pub subtree_cache_capacity: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            subtree_cache_capacity: DEFAULT_SUBTREE_CACHE_CAPACITY,
        }
    }
}

impl ContextConfig {
    /// Creates a config with the default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the subtree cache capacity.
    pub fn with_subtree_cache_capacity(mut self, capacity: usize) -> Self {
        self.subtree_cache_capacity = capacity;
        self
    }

    /// Rejects settings no context can run with.
    pub fn validate(&self) -> Result<()> {
        if self.subtree_cache_capacity == 0 {
            return Err(Error::invalid_configuration(format!(
                "subtree_cache_capacity must be positive, got {}",
                self.subtree_cache_capacity
            )));
        }
        Ok(())
    }
}
