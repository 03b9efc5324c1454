//! [`Relaxation`] for the dense simplex solver.

use brancut_lp::sparse::SparseRow;
use brancut_lp::{LpResult, SimplexSolver, SolveStatus, VarKind, VarStatus};

use super::{BoundSide, NonbasicStatus, Relaxation, RelaxationStatus, TableauEntry, TableauRow, TableauVar};

impl Relaxation for SimplexSolver {
    fn solve(&mut self) -> RelaxationStatus {
        match SimplexSolver::solve(self) {
            SolveStatus::Optimal => RelaxationStatus::Optimal,
            SolveStatus::Unbounded => RelaxationStatus::Unbounded,
            // A solve that did not finish is a terminal classification for
            // the node, same as infeasibility.
            SolveStatus::Infeasible | SolveStatus::IterationLimit | SolveStatus::NotSolved => {
                RelaxationStatus::Infeasible
            }
        }
    }

    fn objective_value(&self) -> f64 {
        SimplexSolver::objective_value(self)
    }

    fn variable_value(&self, j: usize) -> f64 {
        self.column_value(j)
    }

    fn variable_kind(&self, j: usize) -> VarKind {
        self.model().kinds.get(j).copied().unwrap_or(VarKind::Continuous)
    }

    fn variable_bounds(&self, j: usize) -> (f64, f64) {
        let model = self.model();
        match (model.col_lower.get(j), model.col_upper.get(j)) {
            (Some(&lo), Some(&up)) => (lo, up),
            _ => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    fn objective_coefficient(&self, j: usize) -> f64 {
        self.model().objective.get(j).copied().unwrap_or(0.0)
    }

    fn num_variables(&self) -> usize {
        self.model().num_cols()
    }

    fn num_rows(&self) -> usize {
        self.model().num_rows()
    }

    fn set_variable_bound(&mut self, j: usize, side: BoundSide, value: f64) -> LpResult<()> {
        let (lo, up) = Relaxation::variable_bounds(self, j);
        match side {
            BoundSide::Lower => self.set_col_bounds(j, value, up),
            BoundSide::Upper => self.set_col_bounds(j, lo, value),
        }
    }

    fn add_row(&mut self, coefficients: &SparseRow, lower_bound: f64) -> LpResult<usize> {
        let entries: Vec<(usize, f64)> = coefficients.iter().map(|(j, &a)| (j, a)).collect();
        SimplexSolver::add_row(self, &entries, lower_bound, f64::INFINITY)
    }

    fn row_coefficients(&self, i: usize) -> Vec<(usize, f64)> {
        self.model().row_entries(i).unwrap_or_default()
    }

    fn is_basic(&self, j: usize) -> bool {
        let m = self.model().num_rows();
        self.var_status(m + j) == Some(VarStatus::Basic)
    }

    fn tableau_row(&self, j: usize) -> Option<TableauRow> {
        let m = self.model().num_rows();
        let row = SimplexSolver::tableau_row(self, m + j)?;
        let entries = row
            .into_iter()
            .filter_map(|(k, coefficient)| {
                let status = match self.var_status(k)? {
                    VarStatus::Basic => return None,
                    VarStatus::AtLower => NonbasicStatus::AtLower,
                    VarStatus::AtUpper => NonbasicStatus::AtUpper,
                    VarStatus::Free => NonbasicStatus::Free,
                    VarStatus::Fixed => NonbasicStatus::Fixed,
                };
                let (lower, upper) = self.var_bounds(k);
                let var = if k < m {
                    TableauVar::Row(k)
                } else {
                    TableauVar::Column(k - m)
                };
                Some(TableauEntry {
                    var,
                    coefficient,
                    status,
                    lower,
                    upper,
                    kind: self.var_kind(k),
                })
            })
            .collect();

        Some(TableauRow {
            basic_value: self.column_value(j),
            entries,
        })
    }
}
