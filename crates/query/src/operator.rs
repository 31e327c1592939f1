//! Memoized evaluation of operator trees.

use crate::context::ExecutionContext;
use crate::key::SubtreeKey;
use sift_core::{Result, ResultTable};

/// A query operator that produces a result table.
///
/// `compute` does the actual work and may call [`evaluate`] on its children;
/// callers should go through [`evaluate`] so that shared subtrees are
/// computed once per context.
pub trait Operator<I: ?Sized, E: ?Sized>: SubtreeKey {
    /// Computes this subtree's result without consulting the cache.
    fn compute(&self, ctx: &mut ExecutionContext<'_, I, E>) -> Result<ResultTable>;
}

/// Evaluates `op`, reusing the context's cached result for its key.
///
/// The returned table shares its rows with the cached entry, so repeated
/// evaluations of a subtree do not copy rows.
pub fn evaluate<I, E, O>(op: &O, ctx: &mut ExecutionContext<'_, I, E>) -> Result<ResultTable>
where
    I: ?Sized,
    E: ?Sized,
    O: Operator<I, E> + ?Sized,
{
    let key = op.cache_key();
    ctx.compute_and_store(&key, |ctx| op.compute(ctx)).cloned()
}
