//! Cut pool management.
//!
//! Manages the cuts admitted during branch-and-cut:
//! - Cut storage and indexing
//! - Injection of a chosen cut as a new row of a subproblem
//! - Pluggable choice of which cut to inject

use std::ops::Range;

use brancut_lp::LpResult;

use super::Cut;
use crate::oracle::Relaxation;

/// A cut with pool metadata.
#[derive(Debug, Clone)]
pub struct PooledCut {
    /// The underlying cut.
    pub cut: Cut,

    /// Index in the pool.
    pub id: usize,

    /// Number of times this cut was injected.
    pub times_injected: usize,
}

/// Statistics for the cut pool.
#[derive(Debug, Default, Clone)]
pub struct CutPoolStats {
    /// Total cuts added.
    pub total_added: usize,

    /// Total rows injected.
    pub total_injected: usize,
}

/// Chooses which pooled cut to inject.
pub trait CutSelector {
    /// Pick one pool index out of `candidates` (None = inject nothing).
    fn select(&self, pool: &CutPool, candidates: Range<usize>) -> Option<usize>;
}

/// Latest cut in the candidate range.
#[derive(Debug, Clone, Copy, Default)]
pub struct MostRecent;

impl CutSelector for MostRecent {
    fn select(&self, pool: &CutPool, candidates: Range<usize>) -> Option<usize> {
        let end = candidates.end.min(pool.len());
        (candidates.start < end).then(|| end - 1)
    }
}

/// Cut pool for managing generated cuts.
#[derive(Debug, Clone, Default)]
pub struct CutPool {
    /// All cuts in the pool.
    cuts: Vec<PooledCut>,

    /// Statistics.
    stats: CutPoolStats,
}

impl CutPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cut to the pool; returns its index.
    pub fn add(&mut self, cut: Cut) -> usize {
        let id = self.cuts.len();
        self.cuts.push(PooledCut {
            cut,
            id,
            times_injected: 0,
        });
        self.stats.total_added += 1;
        id
    }

    /// Get a cut by index.
    pub fn get(&self, id: usize) -> Option<&PooledCut> {
        self.cuts.get(id)
    }

    /// Number of cuts stored.
    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    /// Pool statistics.
    pub fn stats(&self) -> &CutPoolStats {
        &self.stats
    }

    /// Add cut `id` (latest if `None`) to `oracle` as a `>=` row.
    ///
    /// Returns the new row index, or `Ok(None)` if there is no such cut.
    pub fn inject<R: Relaxation>(&mut self, oracle: &mut R, id: Option<usize>) -> LpResult<Option<usize>> {
        let Some(id) = id.or_else(|| self.cuts.len().checked_sub(1)) else {
            return Ok(None);
        };
        let Some(pooled) = self.cuts.get_mut(id) else {
            return Ok(None);
        };
        let row = oracle.add_row(&pooled.cut.coefficients, pooled.cut.lower_bound)?;
        pooled.times_injected += 1;
        self.stats.total_injected += 1;
        Ok(Some(row))
    }
}
