//! Bounded-variable primal simplex.
//!
//! The solver works on a dense tableau (see [`tableau`]) and always starts
//! from the slack basis. Infeasible starting bases are handled with a
//! composite phase 1 that maximizes the negated sum of bound violations of
//! the basic variables. Bland's rule is used for both the entering and the
//! leaving choice, so the pivot sequence is deterministic.
//!
//! After an optimal solve the final basis stays available: callers can ask
//! for the status of every variable and for the tableau row of any basic
//! variable, which is what cut separators need.

mod tableau;

use log::{debug, trace};

use crate::error::LpResult;
use crate::problem::{LpModel, VarKind};
use tableau::Tableau;

/// Simplex settings.
#[derive(Debug, Clone)]
pub struct SimplexSettings {
    /// Maximum number of pivots (and bound flips) per solve.
    pub max_pivots: usize,

    /// Primal feasibility tolerance.
    pub tol_feas: f64,

    /// Smallest tableau entry accepted as a pivot.
    pub tol_pivot: f64,

    /// Reduced cost tolerance.
    pub tol_cost: f64,
}

impl Default for SimplexSettings {
    fn default() -> Self {
        Self {
            max_pivots: 50_000,
            tol_feas: 1e-9,
            tol_pivot: 1e-9,
            tol_cost: 1e-9,
        }
    }
}

impl SimplexSettings {
    /// Set the pivot limit.
    pub fn with_max_pivots(mut self, max_pivots: usize) -> Self {
        self.max_pivots = max_pivots;
        self
    }
}

/// Outcome of a simplex solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// An optimal basis was found.
    Optimal,
    /// No point satisfies the rows and bounds.
    Infeasible,
    /// The objective grows without bound.
    Unbounded,
    /// The pivot limit was reached.
    IterationLimit,
    /// No solve since construction or the last edit.
    NotSolved,
}

/// Status of a variable in the current basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarStatus {
    /// In the basis.
    Basic,
    /// Nonbasic at its lower bound.
    AtLower,
    /// Nonbasic at its upper bound.
    AtUpper,
    /// Nonbasic free variable held at zero.
    Free,
    /// Nonbasic with equal bounds.
    Fixed,
}

/// Simplex solver owning its model and its last basis.
#[derive(Debug, Clone)]
pub struct SimplexSolver {
    model: LpModel,
    settings: SimplexSettings,
    tableau: Option<Tableau>,
    status: SolveStatus,
    pivots: usize,
}

impl From<LpModel> for SimplexSolver {
    fn from(model: LpModel) -> Self {
        Self::new(model, SimplexSettings::default())
    }
}

/// Which bound a blocking basic variable hits.
#[derive(Clone, Copy)]
struct Block {
    row: usize,
    ratio: f64,
    var: usize,
    leave: VarStatus,
}

impl SimplexSolver {
    /// Create a solver for a model.
    pub fn new(model: LpModel, settings: SimplexSettings) -> Self {
        Self {
            model,
            settings,
            tableau: None,
            status: SolveStatus::NotSolved,
            pivots: 0,
        }
    }

    /// The model being solved.
    pub fn model(&self) -> &LpModel {
        &self.model
    }

    /// Settings in use.
    pub fn settings(&self) -> &SimplexSettings {
        &self.settings
    }

    /// Replace both bounds of a column. Invalidates the last solve.
    pub fn set_col_bounds(&mut self, col: usize, lower: f64, upper: f64) -> LpResult<()> {
        self.model.set_col_bounds(col, lower, upper)?;
        self.invalidate();
        Ok(())
    }

    /// Append a range row. Invalidates the last solve.
    pub fn add_row(&mut self, entries: &[(usize, f64)], lower: f64, upper: f64) -> LpResult<usize> {
        let row = self.model.add_row(entries, lower, upper)?;
        self.invalidate();
        Ok(row)
    }

    fn invalidate(&mut self) {
        self.tableau = None;
        self.status = SolveStatus::NotSolved;
    }

    /// Status of the last solve.
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Pivots performed by the last solve.
    pub fn pivots(&self) -> usize {
        self.pivots
    }

    /// Number of variables (rows auxiliaries followed by columns).
    pub fn num_vars(&self) -> usize {
        self.model.num_rows() + self.model.num_cols()
    }

    /// Solve from the slack basis.
    pub fn solve(&mut self) -> SolveStatus {
        let mut tab = Tableau::slack_basis(&self.model);
        let m = tab.num_rows();
        self.pivots = 0;

        let tol = self.settings.tol_feas;
        let empty_range = (0..tab.num_vars()).any(|k| tab.lower[k] > tab.upper[k] + tol);
        let status = if empty_range {
            SolveStatus::Infeasible
        } else {
            self.iterate(&mut tab)
        };

        tab.update_values();
        debug!(
            "simplex: {:?} after {} pivots ({} rows, {} cols)",
            status,
            self.pivots,
            m,
            self.model.num_cols()
        );
        self.status = status;
        self.tableau = Some(tab);
        status
    }

    fn iterate(&mut self, tab: &mut Tableau) -> SolveStatus {
        let m = tab.num_rows();
        let nvars = tab.num_vars();
        loop {
            tab.update_values();

            let tol = self.settings.tol_feas;
            let mut cost = vec![0.0; nvars];
            let mut phase_one = false;
            for &b in &tab.head {
                if tab.value[b] < tab.lower[b] - tol {
                    cost[b] = 1.0;
                    phase_one = true;
                } else if tab.value[b] > tab.upper[b] + tol {
                    cost[b] = -1.0;
                    phase_one = true;
                }
            }
            if !phase_one {
                for (j, c) in self.model.objective.iter().enumerate() {
                    cost[m + j] = *c;
                }
            }

            let Some((q, dir)) = self.entering(tab, &cost) else {
                break if phase_one {
                    SolveStatus::Infeasible
                } else {
                    SolveStatus::Optimal
                };
            };
            if self.pivots >= self.settings.max_pivots {
                break SolveStatus::IterationLimit;
            }

            let block = self.ratio_test(tab, q, dir);
            let span = tab.upper[q] - tab.lower[q];
            if span.is_finite() && block.map_or(true, |b| span <= b.ratio) {
                tab.status[q] = if dir > 0.0 {
                    VarStatus::AtUpper
                } else {
                    VarStatus::AtLower
                };
                trace!("bound flip on x{}", q);
                self.pivots += 1;
                continue;
            }

            match block {
                Some(b) => {
                    trace!("pivot: x{} enters, x{} leaves (ratio {:.3e})", q, b.var, b.ratio);
                    tab.pivot(b.row, q, b.leave);
                    self.pivots += 1;
                }
                None => break SolveStatus::Unbounded,
            }
        }
    }

    /// Bland's rule: smallest index with an improving, feasible direction.
    fn entering(&self, tab: &Tableau, cost: &[f64]) -> Option<(usize, f64)> {
        let tol = self.settings.tol_cost;
        (0..tab.num_vars()).find_map(|k| {
            let can_up = matches!(tab.status[k], VarStatus::AtLower | VarStatus::Free);
            let can_down = matches!(tab.status[k], VarStatus::AtUpper | VarStatus::Free);
            if !can_up && !can_down {
                return None;
            }
            let mut d = cost[k];
            for r in 0..tab.num_rows() {
                let c = cost[tab.head[r]];
                if c != 0.0 {
                    d += c * tab.rate(r, k);
                }
            }
            if d > tol && can_up {
                Some((k, 1.0))
            } else if d < -tol && can_down {
                Some((k, -1.0))
            } else {
                None
            }
        })
    }

    /// Smallest step before a basic variable hits a bound; ties go to the
    /// smallest basic variable index.
    fn ratio_test(&self, tab: &Tableau, q: usize, dir: f64) -> Option<Block> {
        let tol = self.settings.tol_feas;
        let mut best: Option<Block> = None;

        for r in 0..tab.num_rows() {
            let alpha = dir * tab.rate(r, q);
            if alpha.abs() <= self.settings.tol_pivot {
                continue;
            }
            let b = tab.head[r];
            let (x, lo, up) = (tab.value[b], tab.lower[b], tab.upper[b]);

            let candidate = if x < lo - tol {
                // Below its lower bound: stops once it gets back to it.
                (alpha > 0.0).then(|| ((lo - x) / alpha, VarStatus::AtLower))
            } else if x > up + tol {
                (alpha < 0.0).then(|| ((x - up) / -alpha, VarStatus::AtUpper))
            } else if alpha > 0.0 {
                up.is_finite()
                    .then(|| (((up - x) / alpha).max(0.0), VarStatus::AtUpper))
            } else {
                lo.is_finite()
                    .then(|| (((x - lo) / -alpha).max(0.0), VarStatus::AtLower))
            };

            let Some((ratio, leave)) = candidate else {
                continue;
            };
            let better = match best {
                None => true,
                Some(cur) => ratio < cur.ratio - tol || (ratio <= cur.ratio + tol && b < cur.var),
            };
            if better {
                best = Some(Block {
                    row: r,
                    ratio,
                    var: b,
                    leave,
                });
            }
        }
        best
    }

    fn optimal_tableau(&self) -> Option<&Tableau> {
        match self.status {
            SolveStatus::Optimal => self.tableau.as_ref(),
            _ => None,
        }
    }

    /// Objective value of the current point (`-inf` unless optimal).
    pub fn objective_value(&self) -> f64 {
        match self.optimal_tableau() {
            Some(_) => self.model.objective_value(&self.column_values()),
            None => f64::NEG_INFINITY,
        }
    }

    /// Value of a column in the last basis.
    pub fn column_value(&self, col: usize) -> f64 {
        let m = self.model.num_rows();
        self.tableau
            .as_ref()
            .and_then(|t| t.value.get(m + col).copied())
            .unwrap_or(0.0)
    }

    /// Values of all columns in the last basis.
    pub fn column_values(&self) -> Vec<f64> {
        (0..self.model.num_cols()).map(|j| self.column_value(j)).collect()
    }

    /// Activity of a row in the last basis.
    pub fn row_activity(&self, row: usize) -> f64 {
        self.tableau
            .as_ref()
            .and_then(|t| t.value.get(row).copied())
            .unwrap_or(0.0)
    }

    /// Status of variable `k` in the last optimal basis.
    pub fn var_status(&self, k: usize) -> Option<VarStatus> {
        self.optimal_tableau().and_then(|t| t.status.get(k).copied())
    }

    /// Bounds of variable `k` (row range for auxiliaries, column bounds otherwise).
    pub fn var_bounds(&self, k: usize) -> (f64, f64) {
        let m = self.model.num_rows();
        if k < m {
            (self.model.row_lower[k], self.model.row_upper[k])
        } else if k - m < self.model.num_cols() {
            (self.model.col_lower[k - m], self.model.col_upper[k - m])
        } else {
            (f64::NEG_INFINITY, f64::INFINITY)
        }
    }

    /// Kind of variable `k`; row auxiliaries are continuous.
    pub fn var_kind(&self, k: usize) -> VarKind {
        let m = self.model.num_rows();
        if k < m {
            VarKind::Continuous
        } else {
            self.model
                .kinds
                .get(k - m)
                .copied()
                .unwrap_or(VarKind::Continuous)
        }
    }

    /// Tableau row holding basic variable `k`, if any.
    pub fn basis_row(&self, k: usize) -> Option<usize> {
        self.optimal_tableau().and_then(|t| t.row_of.get(k).copied().flatten())
    }

    /// Tableau row of basic variable `k` as `x_k = sum xi_j * x_j` over the
    /// nonbasic variables `j` with a nonzero `xi_j`.
    ///
    /// Returns `None` when the last solve was not optimal or `k` is nonbasic.
    pub fn tableau_row(&self, k: usize) -> Option<Vec<(usize, f64)>> {
        let tab = self.optimal_tableau()?;
        let r = tab.row_of.get(k).copied().flatten()?;
        Some(
            (0..tab.num_vars())
                .filter(|&j| tab.status[j] != VarStatus::Basic)
                .filter_map(|j| {
                    let xi = tab.rate(r, j);
                    (xi != 0.0).then_some((j, xi))
                })
                .collect(),
        )
    }
}
