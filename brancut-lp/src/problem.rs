//! Linear model data and validation.
//!
//! The model is always a maximization:
//!
//! ```text
//! maximize    c^T x
//! subject to  row_lower <= A x <= row_upper
//!             col_lower <=  x  <= col_upper
//! ```
//!
//! Either side of a row or column range may be infinite. Minimization
//! problems are expressed by negating `c`.

use std::fmt;

use crate::error::{LpError, LpResult};
use crate::sparse::{self, SparseCsr};

/// Kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Continuous variable.
    Continuous,
    /// Integer variable.
    Integer,
    /// Binary variable (integer in `[0, 1]`).
    Binary,
}

impl VarKind {
    /// True for integer and binary columns.
    pub fn is_integral(self) -> bool {
        !matches!(self, VarKind::Continuous)
    }
}

/// Linear (possibly mixed-integer) model.
#[derive(Debug, Clone)]
pub struct LpModel {
    /// Objective coefficients (length n, maximized).
    pub objective: Vec<f64>,

    /// Constraint matrix (m × n, CSR: one outer vector per row).
    pub rows: SparseCsr,

    /// Row lower bounds (length m, may be -∞).
    pub row_lower: Vec<f64>,

    /// Row upper bounds (length m, may be +∞).
    pub row_upper: Vec<f64>,

    /// Column lower bounds (length n, may be -∞).
    pub col_lower: Vec<f64>,

    /// Column upper bounds (length n, may be +∞).
    pub col_upper: Vec<f64>,

    /// Column kinds (length n).
    pub kinds: Vec<VarKind>,
}

impl LpModel {
    /// Create a model with no rows.
    ///
    /// Columns default to `[0, +∞)`; binary columns to `[0, 1]`.
    pub fn new(objective: Vec<f64>, kinds: Vec<VarKind>) -> LpResult<Self> {
        let n = objective.len();
        if kinds.len() != n {
            return Err(LpError::DimensionMismatch(format!(
                "{} objective coefficients but {} column kinds",
                n,
                kinds.len()
            )));
        }
        if let Some(j) = objective.iter().position(|c| !c.is_finite()) {
            return Err(LpError::NonFinite(format!("objective coefficient {}", j)));
        }

        let col_upper = kinds
            .iter()
            .map(|k| match k {
                VarKind::Binary => 1.0,
                _ => f64::INFINITY,
            })
            .collect();

        Ok(Self {
            objective,
            rows: SparseCsr::zero((0, n)),
            row_lower: Vec::new(),
            row_upper: Vec::new(),
            col_lower: vec![0.0; n],
            col_upper,
            kinds,
        })
    }

    /// Create a purely continuous model.
    pub fn continuous(objective: Vec<f64>) -> LpResult<Self> {
        let n = objective.len();
        Self::new(objective, vec![VarKind::Continuous; n])
    }

    /// Number of columns.
    pub fn num_cols(&self) -> usize {
        self.objective.len()
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.row_lower.len()
    }

    /// Append a range row `lower <= sum a_j x_j <= upper`.
    ///
    /// Entries may be unordered; duplicates are summed. Returns the row index.
    pub fn add_row(&mut self, entries: &[(usize, f64)], lower: f64, upper: f64) -> LpResult<usize> {
        let n = self.num_cols();
        for &(j, a) in entries {
            if j >= n {
                return Err(LpError::ColumnOutOfRange { index: j, num_cols: n });
            }
            if !a.is_finite() {
                return Err(LpError::NonFinite(format!("row {} coefficient {}", self.num_rows(), j)));
            }
        }
        check_range(&format!("row {}", self.num_rows()), lower, upper)?;

        let row = sparse::sparse_row(n, entries);
        let rows = std::mem::replace(&mut self.rows, SparseCsr::zero((0, n)));
        self.rows = sparse::append_row(rows, &row);
        self.row_lower.push(lower);
        self.row_upper.push(upper);

        Ok(self.num_rows() - 1)
    }

    /// Append `sum a_j x_j <= rhs`.
    pub fn add_le(&mut self, entries: &[(usize, f64)], rhs: f64) -> LpResult<usize> {
        self.add_row(entries, f64::NEG_INFINITY, rhs)
    }

    /// Append `sum a_j x_j >= rhs`.
    pub fn add_ge(&mut self, entries: &[(usize, f64)], rhs: f64) -> LpResult<usize> {
        self.add_row(entries, rhs, f64::INFINITY)
    }

    /// Append `sum a_j x_j = rhs`.
    pub fn add_eq(&mut self, entries: &[(usize, f64)], rhs: f64) -> LpResult<usize> {
        self.add_row(entries, rhs, rhs)
    }

    /// Set both bounds of a column. Binary columns are clamped to `[0, 1]`.
    ///
    /// An empty range (`lower > upper`) is accepted here, since branching can
    /// produce one; it makes the model infeasible and fails [`validate`](Self::validate).
    pub fn set_col_bounds(&mut self, col: usize, lower: f64, upper: f64) -> LpResult<()> {
        let n = self.num_cols();
        if col >= n {
            return Err(LpError::ColumnOutOfRange { index: col, num_cols: n });
        }
        if lower.is_nan() || upper.is_nan() {
            return Err(LpError::NonFinite(format!("bounds of column {}", col)));
        }
        let (lower, upper) = match self.kinds[col] {
            VarKind::Binary => (lower.max(0.0), upper.min(1.0)),
            _ => (lower, upper),
        };
        self.col_lower[col] = lower;
        self.col_upper[col] = upper;
        Ok(())
    }

    /// Nonzero entries of a row as `(column, coefficient)` pairs.
    pub fn row_entries(&self, row: usize) -> LpResult<Vec<(usize, f64)>> {
        let view = self.rows.outer_view(row).ok_or(LpError::RowOutOfRange {
            index: row,
            num_rows: self.num_rows(),
        })?;
        Ok(view.iter().map(|(j, &a)| (j, a)).collect())
    }

    /// Activity `a_i x` of a row at a point.
    pub fn row_activity(&self, row: usize, x: &[f64]) -> f64 {
        self.rows
            .outer_view(row)
            .map(|view| sparse::dot(view, x))
            .unwrap_or(0.0)
    }

    /// Objective value `c^T x`.
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.objective.iter().zip(x).map(|(c, v)| c * v).sum()
    }

    /// Check whether a point satisfies all rows and column bounds within `tol`.
    ///
    /// Integrality is not checked.
    pub fn is_feasible(&self, x: &[f64], tol: f64) -> bool {
        if x.len() != self.num_cols() {
            return false;
        }
        let cols_ok = x
            .iter()
            .enumerate()
            .all(|(j, &v)| v >= self.col_lower[j] - tol && v <= self.col_upper[j] + tol);
        cols_ok
            && (0..self.num_rows()).all(|i| {
                let act = self.row_activity(i, x);
                act >= self.row_lower[i] - tol && act <= self.row_upper[i] + tol
            })
    }

    /// Validate dimensions and data.
    pub fn validate(&self) -> LpResult<()> {
        let n = self.num_cols();
        let m = self.num_rows();

        if self.kinds.len() != n || self.col_lower.len() != n || self.col_upper.len() != n {
            return Err(LpError::DimensionMismatch(format!(
                "{} columns but {} kinds, {} lower and {} upper bounds",
                n,
                self.kinds.len(),
                self.col_lower.len(),
                self.col_upper.len()
            )));
        }
        if self.row_upper.len() != m || self.rows.rows() != m || self.rows.cols() != n {
            return Err(LpError::DimensionMismatch(format!(
                "{} row lower bounds, {} row upper bounds, matrix is {}x{} (expected {}x{})",
                m,
                self.row_upper.len(),
                self.rows.rows(),
                self.rows.cols(),
                m,
                n
            )));
        }
        if !self.rows.is_csr() {
            return Err(LpError::DimensionMismatch("constraint matrix must be CSR".to_string()));
        }
        if let Some(j) = self.objective.iter().position(|c| !c.is_finite()) {
            return Err(LpError::NonFinite(format!("objective coefficient {}", j)));
        }
        if self.rows.data().iter().any(|a| !a.is_finite()) {
            return Err(LpError::NonFinite("constraint matrix".to_string()));
        }
        for i in 0..m {
            check_range(&format!("row {}", i), self.row_lower[i], self.row_upper[i])?;
        }
        for j in 0..n {
            check_range(&format!("column {}", j), self.col_lower[j], self.col_upper[j])?;
        }

        Ok(())
    }
}

impl fmt::Display for LpModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "max")?;
        for (j, c) in self.objective.iter().enumerate() {
            if *c != 0.0 {
                write!(f, " {:+}*x[{}]", c, j)?;
            }
        }
        writeln!(f)?;
        for (i, row) in self.rows.outer_iterator().enumerate() {
            write!(f, "  {} <=", self.row_lower[i])?;
            for (j, a) in row.iter() {
                write!(f, " {:+}*x[{}]", a, j)?;
            }
            writeln!(f, " <= {}", self.row_upper[i])?;
        }
        for j in 0..self.num_cols() {
            writeln!(
                f,
                "  {} <= x[{}] <= {} ({:?})",
                self.col_lower[j], j, self.col_upper[j], self.kinds[j]
            )?;
        }
        Ok(())
    }
}

fn check_range(what: &str, lower: f64, upper: f64) -> LpResult<()> {
    if lower.is_nan() || upper.is_nan() {
        return Err(LpError::NonFinite(format!("bounds of {}", what)));
    }
    if lower == f64::INFINITY || upper == f64::NEG_INFINITY || lower > upper {
        return Err(LpError::CrossedBounds {
            what: what.to_string(),
            lower,
            upper,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knapsack() -> LpModel {
        let mut model = LpModel::new(vec![5.0, 4.0], vec![VarKind::Integer; 2]).unwrap();
        model.add_le(&[(0, 6.0), (1, 4.0)], 24.0).unwrap();
        model.add_le(&[(0, 1.0), (1, 2.0)], 6.0).unwrap();
        model
    }

    #[test]
    fn test_new_defaults() {
        let model = LpModel::new(vec![1.0, 2.0], vec![VarKind::Continuous, VarKind::Binary]).unwrap();
        assert_eq!(model.num_cols(), 2);
        assert_eq!(model.num_rows(), 0);
        assert_eq!(model.col_lower, vec![0.0, 0.0]);
        assert_eq!(model.col_upper, vec![f64::INFINITY, 1.0]);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = LpModel::new(vec![1.0, 2.0], vec![VarKind::Integer]).unwrap_err();
        assert!(matches!(err, LpError::DimensionMismatch(_)));
    }

    #[test]
    fn test_add_rows() {
        let model = knapsack();
        assert_eq!(model.num_rows(), 2);
        assert_eq!(model.row_entries(0).unwrap(), vec![(0, 6.0), (1, 4.0)]);
        assert_eq!(model.row_upper, vec![24.0, 6.0]);
        assert!(model.row_lower.iter().all(|l| *l == f64::NEG_INFINITY));
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_bad_rows_rejected() {
        let mut model = knapsack();
        assert!(matches!(
            model.add_le(&[(5, 1.0)], 1.0),
            Err(LpError::ColumnOutOfRange { index: 5, num_cols: 2 })
        ));
        assert!(matches!(
            model.add_row(&[(0, 1.0)], 3.0, 2.0),
            Err(LpError::CrossedBounds { .. })
        ));
        assert!(matches!(model.add_le(&[(0, f64::NAN)], 1.0), Err(LpError::NonFinite(_))));
        assert_eq!(model.num_rows(), 2);
    }

    #[test]
    fn test_binary_bounds_clamped() {
        let mut model = LpModel::new(vec![1.0], vec![VarKind::Binary]).unwrap();
        model.set_col_bounds(0, -3.0, 7.0).unwrap();
        assert_eq!((model.col_lower[0], model.col_upper[0]), (0.0, 1.0));
    }

    #[test]
    fn test_empty_column_range_fails_validation() {
        let mut model = knapsack();
        model.set_col_bounds(0, 4.0, 3.0).unwrap();
        assert!(matches!(model.validate(), Err(LpError::CrossedBounds { .. })));
        assert!(model.set_col_bounds(0, f64::NAN, 3.0).is_err());
    }

    #[test]
    fn test_feasibility_check() {
        let model = knapsack();
        assert!(model.is_feasible(&[4.0, 0.0], 1e-9));
        assert!(model.is_feasible(&[3.0, 1.5], 1e-9));
        assert!(!model.is_feasible(&[4.0, 1.0], 1e-9));
        assert!(!model.is_feasible(&[-1.0, 0.0], 1e-9));
        assert_eq!(model.objective_value(&[3.0, 1.5]), 21.0);
        assert_eq!(model.row_activity(1, &[3.0, 1.5]), 6.0);
    }
}
