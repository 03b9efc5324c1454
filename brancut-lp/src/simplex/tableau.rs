//! Dense simplex tableau over the row auxiliaries and structural columns.
//!
//! Variable `k < m` is the auxiliary `r_k = a_k x` of row `k`; variable
//! `k >= m` is structural column `k - m`. Every tableau row `r` encodes
//!
//! ```text
//! sum_k T[r][k] * x_k = 0,   T[r][head[r]] = 1
//! ```
//!
//! so `x_head[r] = -sum_{k nonbasic} T[r][k] * x_k`. The initial basis is the
//! slack basis `T = [I | -A]`.

use nalgebra::DMatrix;

use super::VarStatus;
use crate::problem::LpModel;

/// Entries below this magnitude are flushed to zero after a pivot.
const DROP_TOL: f64 = 1e-13;

#[derive(Debug, Clone)]
pub(crate) struct Tableau {
    pub(crate) t: DMatrix<f64>,
    pub(crate) head: Vec<usize>,
    pub(crate) status: Vec<VarStatus>,
    pub(crate) lower: Vec<f64>,
    pub(crate) upper: Vec<f64>,
    pub(crate) value: Vec<f64>,
    /// Tableau row of each basic variable, `None` when nonbasic.
    pub(crate) row_of: Vec<Option<usize>>,
}

impl Tableau {
    /// Slack basis for a model.
    pub(crate) fn slack_basis(model: &LpModel) -> Self {
        let m = model.num_rows();
        let n = model.num_cols();
        let mut t = DMatrix::zeros(m, m + n);
        for (i, row) in model.rows.outer_iterator().enumerate() {
            t[(i, i)] = 1.0;
            for (j, &a) in row.iter() {
                t[(i, m + j)] = -a;
            }
        }

        let mut lower = model.row_lower.clone();
        lower.extend_from_slice(&model.col_lower);
        let mut upper = model.row_upper.clone();
        upper.extend_from_slice(&model.col_upper);

        let status = (0..m + n)
            .map(|k| {
                if k < m {
                    VarStatus::Basic
                } else {
                    nonbasic_status(lower[k], upper[k])
                }
            })
            .collect();

        let mut tableau = Self {
            t,
            head: (0..m).collect(),
            status,
            lower,
            upper,
            value: vec![0.0; m + n],
            row_of: (0..m + n).map(|k| if k < m { Some(k) } else { None }).collect(),
        };
        tableau.update_values();
        tableau
    }

    pub(crate) fn num_vars(&self) -> usize {
        self.status.len()
    }

    pub(crate) fn num_rows(&self) -> usize {
        self.head.len()
    }

    /// Recompute every variable value from the nonbasic statuses.
    pub(crate) fn update_values(&mut self) {
        for k in 0..self.num_vars() {
            self.value[k] = match self.status[k] {
                VarStatus::Basic => 0.0,
                VarStatus::AtLower | VarStatus::Fixed => self.lower[k],
                VarStatus::AtUpper => self.upper[k],
                VarStatus::Free => 0.0,
            };
        }
        for r in 0..self.num_rows() {
            let mut v = 0.0;
            for k in 0..self.num_vars() {
                if self.status[k] != VarStatus::Basic {
                    let coef = self.t[(r, k)];
                    if coef != 0.0 {
                        v -= coef * self.value[k];
                    }
                }
            }
            let b = self.head[r];
            self.value[b] = v;
        }
    }

    /// Rate at which basic row `r` moves when nonbasic `k` increases.
    #[inline]
    pub(crate) fn rate(&self, r: usize, k: usize) -> f64 {
        -self.t[(r, k)]
    }

    /// Exchange `head[p]` for nonbasic `q`; the leaving variable takes `leave_status`.
    pub(crate) fn pivot(&mut self, p: usize, q: usize, leave_status: VarStatus) {
        let ncols = self.num_vars();
        let piv = self.t[(p, q)];
        for k in 0..ncols {
            self.t[(p, k)] /= piv;
        }
        self.t[(p, q)] = 1.0;

        for r in 0..self.num_rows() {
            if r == p {
                continue;
            }
            let factor = self.t[(r, q)];
            if factor == 0.0 {
                continue;
            }
            for k in 0..ncols {
                let updated = self.t[(r, k)] - factor * self.t[(p, k)];
                self.t[(r, k)] = if updated.abs() < DROP_TOL { 0.0 } else { updated };
            }
            self.t[(r, q)] = 0.0;
        }

        let leaving = self.head[p];
        self.status[leaving] = if self.lower[leaving] == self.upper[leaving] {
            VarStatus::Fixed
        } else {
            leave_status
        };
        self.row_of[leaving] = None;
        self.status[q] = VarStatus::Basic;
        self.row_of[q] = Some(p);
        self.head[p] = q;
    }
}

/// Initial status of a nonbasic variable with the given bounds.
pub(crate) fn nonbasic_status(lower: f64, upper: f64) -> VarStatus {
    if lower == upper {
        VarStatus::Fixed
    } else if lower.is_finite() {
        VarStatus::AtLower
    } else if upper.is_finite() {
        VarStatus::AtUpper
    } else {
        VarStatus::Free
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::VarKind;

    fn model() -> LpModel {
        let mut model = LpModel::new(vec![5.0, 4.0], vec![VarKind::Integer; 2]).unwrap();
        model.add_le(&[(0, 6.0), (1, 4.0)], 24.0).unwrap();
        model.add_le(&[(0, 1.0), (1, 2.0)], 6.0).unwrap();
        model
    }

    #[test]
    fn test_slack_basis_layout() {
        let tab = Tableau::slack_basis(&model());
        assert_eq!(tab.num_rows(), 2);
        assert_eq!(tab.num_vars(), 4);
        assert_eq!(tab.head, vec![0, 1]);
        assert_eq!(tab.t[(0, 0)], 1.0);
        assert_eq!(tab.t[(0, 2)], -6.0);
        assert_eq!(tab.t[(1, 3)], -2.0);
        assert_eq!(tab.status[2], VarStatus::AtLower);
        assert_eq!(tab.value, vec![0.0; 4]);
    }

    #[test]
    fn test_pivot_keeps_identity_on_basis() {
        let mut tab = Tableau::slack_basis(&model());
        tab.pivot(1, 3, VarStatus::AtUpper);
        assert_eq!(tab.head, vec![0, 3]);
        assert_eq!(tab.status[1], VarStatus::AtUpper);
        assert_eq!(tab.row_of[3], Some(1));
        assert_eq!(tab.t[(1, 3)], 1.0);
        assert_eq!(tab.t[(0, 3)], 0.0);

        tab.update_values();
        // r_1 = 6 so y = 3, and r_0 = 4y = 12.
        assert!((tab.value[3] - 3.0).abs() < 1e-12);
        assert!((tab.value[0] - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_nonbasic_status() {
        assert_eq!(nonbasic_status(0.0, 0.0), VarStatus::Fixed);
        assert_eq!(nonbasic_status(0.0, f64::INFINITY), VarStatus::AtLower);
        assert_eq!(nonbasic_status(f64::NEG_INFINITY, 2.0), VarStatus::AtUpper);
        assert_eq!(nonbasic_status(f64::NEG_INFINITY, f64::INFINITY), VarStatus::Free);
    }
}
