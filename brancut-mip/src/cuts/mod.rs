//! Cutting planes for branch-and-cut.
//!
//! - [`GomoryGenerator`]: Gomory mixed-integer cuts read off the final
//!   simplex tableau
//! - [`CutPool`]: storage of admitted cuts and injection into subproblems

mod gomory;
mod pool;

use brancut_lp::sparse::{self, SparseRow};

use crate::search::NodeId;

pub use gomory::{GomoryGenerator, GomorySettings};
pub use pool::{CutPool, CutPoolStats, CutSelector, MostRecent, PooledCut};

/// Source of a cut (for tracking and debugging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutSource {
    /// Gomory mixed-integer cut from the tableau row of a basic column.
    GomoryMixedInteger {
        /// Basic integer column the row belongs to.
        column: usize,
        /// Node whose relaxation produced the row.
        node: NodeId,
    },

    /// User-provided cut.
    User,
}

/// A linear cut: `coefficients * x >= lower_bound`.
#[derive(Debug, Clone)]
pub struct Cut {
    /// Sparse coefficients over the model columns.
    pub coefficients: SparseRow,

    /// Right-hand side.
    pub lower_bound: f64,

    /// Source of this cut.
    pub source: CutSource,
}

impl Cut {
    /// Create a new cut.
    pub fn new(coefficients: SparseRow, lower_bound: f64, source: CutSource) -> Self {
        Self {
            coefficients,
            lower_bound,
            source,
        }
    }

    /// Left-hand side at `x`, or `None` if `x` is shorter than the cut.
    pub fn activity(&self, x: &[f64]) -> Option<f64> {
        (x.len() >= self.coefficients.dim()).then(|| sparse::dot(self.coefficients.view(), x))
    }

    /// Compute violation: `lower_bound - a^T x` (positive means violated).
    pub fn violation(&self, x: &[f64]) -> Option<f64> {
        self.activity(x).map(|a| self.lower_bound - a)
    }

    /// Check whether `x` satisfies the cut within `tol`. A point of the
    /// wrong dimension never does.
    pub fn is_satisfied(&self, x: &[f64], tol: f64) -> bool {
        self.violation(x).is_some_and(|v| v <= tol)
    }
}
