//! Relaxation oracle interface.
//!
//! The engine never talks to an LP solver directly; it goes through
//! [`Relaxation`]. An oracle owns its model, so cloning one yields an
//! independent subproblem that can be tightened without touching the
//! original.
//!
//! Tableau access ([`Relaxation::is_basic`], [`Relaxation::tableau_row`]) is
//! optional. Oracles that do not expose a tableau keep the default
//! implementations and simply never yield cuts.

pub mod classify;
mod simplex_backend;

use brancut_lp::{LpResult, VarKind};
use brancut_lp::sparse::SparseRow;

pub use classify::{evaluate_relaxation, Classification, Evaluation, FractionalVar};

/// Status of a relaxation solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxationStatus {
    /// Optimal solution found.
    Optimal,

    /// Relaxation is infeasible (node can be pruned).
    Infeasible,

    /// Relaxation is unbounded (treated like infeasibility).
    Unbounded,
}

impl RelaxationStatus {
    /// True for [`RelaxationStatus::Optimal`].
    pub fn is_optimal(self) -> bool {
        self == RelaxationStatus::Optimal
    }
}

/// Which bound of a variable to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    /// Lower bound.
    Lower,
    /// Upper bound.
    Upper,
}

/// A variable of the simplex tableau.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableauVar {
    /// Auxiliary variable `r_i = a_i x` of row `i`.
    Row(usize),
    /// Structural column `j`.
    Column(usize),
}

/// Position of a nonbasic variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonbasicStatus {
    /// At its lower bound.
    AtLower,
    /// At its upper bound.
    AtUpper,
    /// Free, held at zero.
    Free,
    /// Lower and upper bound coincide.
    Fixed,
}

/// One nonzero entry of a tableau row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableauEntry {
    /// Nonbasic variable.
    pub var: TableauVar,
    /// Coefficient `xi` in `x_B = sum xi * x_N`.
    pub coefficient: f64,
    /// Where the nonbasic variable sits.
    pub status: NonbasicStatus,
    /// Lower bound of the nonbasic variable.
    pub lower: f64,
    /// Upper bound of the nonbasic variable.
    pub upper: f64,
    /// Kind of the nonbasic variable (rows are continuous).
    pub kind: VarKind,
}

/// Row of the final tableau for one basic variable.
#[derive(Debug, Clone, PartialEq)]
pub struct TableauRow {
    /// Current value of the basic variable.
    pub basic_value: f64,
    /// Nonzero entries over nonbasic variables.
    pub entries: Vec<TableauEntry>,
}

/// LP relaxation oracle.
///
/// Columns are indexed `0..num_variables()`, rows `0..num_rows()`. The
/// objective is maximized. Value accessors are meaningful after a
/// [`solve`](Relaxation::solve) that returned `Optimal`; after any edit the
/// oracle must be solved again.
pub trait Relaxation: Clone {
    /// Solve the relaxation.
    fn solve(&mut self) -> RelaxationStatus;

    /// Objective value of the last optimal solve (`-inf` otherwise).
    fn objective_value(&self) -> f64;

    /// Value of column `j` in the last solve.
    fn variable_value(&self, j: usize) -> f64;

    /// Kind of column `j`.
    fn variable_kind(&self, j: usize) -> VarKind;

    /// Current bounds of column `j`.
    fn variable_bounds(&self, j: usize) -> (f64, f64);

    /// Objective coefficient of column `j`.
    fn objective_coefficient(&self, j: usize) -> f64;

    /// Number of columns.
    fn num_variables(&self) -> usize;

    /// Number of rows.
    fn num_rows(&self) -> usize;

    /// Replace one bound of column `j`.
    fn set_variable_bound(&mut self, j: usize, side: BoundSide, value: f64) -> LpResult<()>;

    /// Append the row `coefficients * x >= lower_bound`; returns its index.
    fn add_row(&mut self, coefficients: &SparseRow, lower_bound: f64) -> LpResult<usize>;

    /// Nonzero `(column, coefficient)` entries of row `i`.
    fn row_coefficients(&self, i: usize) -> Vec<(usize, f64)>;

    /// Whether column `j` is basic in the last optimal solve.
    fn is_basic(&self, _j: usize) -> bool {
        false
    }

    /// Tableau row of basic column `j` (`None` if unsupported or nonbasic).
    fn tableau_row(&self, _j: usize) -> Option<TableauRow> {
        None
    }
}
