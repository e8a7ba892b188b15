//! Memo tables for expensive recursive operations.
//!
//! Keys are `ExprId`s, which is sound because the arena pools nodes:
//! structural equality and id equality coincide, and ids stay valid for the
//! lifetime of the owning `Context`.

use crate::expression::ExprId;
use rustc_hash::FxHashMap;

/// Process-lifetime memoization, owned by the `Context` it serves.
#[derive(Debug, Default)]
pub struct MemoCache {
    /// Rational-normal-form results.
    pub normal: FxHashMap<ExprId, ExprId>,
    /// Full polynomial expansion results.
    pub expand: FxHashMap<ExprId, ExprId>,
    /// Polynomial GCD results, keyed by the ordered operand pair.
    pub gcd: FxHashMap<(ExprId, ExprId), ExprId>,
}

impl MemoCache {
    /// Drop all cached results (diagnostics; entries never go stale since
    /// nodes are immutable).
    pub fn clear(&mut self) {
        self.normal.clear();
        self.expand.clear();
        self.gcd.clear();
    }

    pub fn len(&self) -> usize {
        self.normal.len() + self.expand.len() + self.gcd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
