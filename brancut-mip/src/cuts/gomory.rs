//! Gomory mixed-integer cut generation.
//!
//! For a basic integer column with fractional value `beta` the tableau row
//! reads `x_B = sum_j xi_j x_N[j]`. Shifting every nonbasic variable to its
//! active bound (`x' = x - l` at a lower bound, `x' = u - x` at an upper
//! bound, both `>= 0`) turns it into `x_B + sum_j alpha_j x'_j = beta`. With
//! `f0 = frac(beta)` the mixed-integer rounding inequality
//!
//! ```text
//! sum_j phi_j x'_j >= f0
//!
//! integer x'_j:     phi_j = f_j                         if f_j <= f0
//!                   phi_j = f0 / (1 - f0) * (1 - f_j)   otherwise
//! continuous x'_j:  phi_j = alpha_j                     if alpha_j >= 0
//!                   phi_j = f0 / (1 - f0) * (-alpha_j)  otherwise
//! ```
//!
//! holds for every point with integral `x_B` and integral integer `x'_j`
//! (`f_j = frac(alpha_j)`, always in `[0, 1)`). The cut is mapped back to
//! the original bounds and row auxiliaries are substituted through the
//! constraint matrix, so it ends up over the model columns only.

use brancut_lp::sparse;
use serde::{Deserialize, Serialize};

use super::{Cut, CutSource};
use crate::error::ConfigError;
use crate::oracle::{NonbasicStatus, Relaxation, TableauVar};
use crate::search::NodeId;

/// Gomory generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GomorySettings {
    /// Basic values closer than this to an integer are not cut.
    pub min_fraction: f64,

    /// Tableau entries below this magnitude are ignored.
    pub zero_tol: f64,

    /// Rows with an entry above this magnitude are rejected.
    pub max_coefficient: f64,
}

impl Default for GomorySettings {
    fn default() -> Self {
        Self {
            min_fraction: 1e-6,
            zero_tol: 1e-10,
            max_coefficient: 1e5,
        }
    }
}

impl GomorySettings {
    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..0.5).contains(&self.min_fraction) {
            return Err(ConfigError::Gomory(format!(
                "min_fraction must lie in [0, 0.5), got {}",
                self.min_fraction
            )));
        }
        if !self.zero_tol.is_finite() || self.zero_tol < 0.0 {
            return Err(ConfigError::Gomory(format!(
                "zero_tol must be finite and non-negative, got {}",
                self.zero_tol
            )));
        }
        if self.max_coefficient.is_nan() || self.max_coefficient <= self.zero_tol {
            return Err(ConfigError::Gomory(format!(
                "max_coefficient must exceed zero_tol, got {}",
                self.max_coefficient
            )));
        }
        Ok(())
    }
}

/// Gomory mixed-integer cut generator.
#[derive(Debug, Clone, Default)]
pub struct GomoryGenerator {
    /// Settings.
    settings: GomorySettings,

    /// Statistics.
    stats: GomoryStats,
}

/// Statistics for Gomory cut generation.
#[derive(Debug, Default, Clone)]
pub struct GomoryStats {
    /// Rows examined.
    pub attempts: usize,

    /// Cuts produced.
    pub cuts_generated: usize,

    /// Rows rejected for a free nonbasic or a huge entry.
    pub rows_rejected: usize,
}

impl GomoryGenerator {
    /// Create a generator.
    pub fn new(settings: GomorySettings) -> Self {
        Self {
            settings,
            stats: GomoryStats::default(),
        }
    }

    /// Statistics so far.
    pub fn stats(&self) -> &GomoryStats {
        &self.stats
    }

    /// Derive a cut from the tableau row of column `col`.
    ///
    /// Returns `None` ("no cut") when the column is continuous, nonbasic,
    /// already integral, or its row cannot be used safely.
    pub fn generate<R: Relaxation>(&mut self, oracle: &R, col: usize, node: NodeId) -> Option<Cut> {
        if !oracle.variable_kind(col).is_integral() || !oracle.is_basic(col) {
            return None;
        }
        let row = oracle.tableau_row(col)?;
        self.stats.attempts += 1;

        let beta = row.basic_value;
        let f0 = beta - beta.floor();
        if f0 < self.settings.min_fraction || f0 > 1.0 - self.settings.min_fraction {
            return None;
        }

        let m = oracle.num_rows();
        let n = oracle.num_variables();
        let mut phi_rows = vec![0.0; m];
        let mut phi_cols = vec![0.0; n];
        let mut rhs = f0;

        for entry in &row.entries {
            let xi = entry.coefficient;
            if xi.abs() < self.settings.zero_tol {
                continue;
            }
            if xi.abs() > self.settings.max_coefficient {
                self.stats.rows_rejected += 1;
                return None;
            }

            let (alpha, bound) = match entry.status {
                NonbasicStatus::Fixed => continue,
                NonbasicStatus::Free => {
                    self.stats.rows_rejected += 1;
                    return None;
                }
                NonbasicStatus::AtLower => (-xi, entry.lower),
                NonbasicStatus::AtUpper => (xi, entry.upper),
            };

            // x' is only integral when the bound it is measured from is.
            let integral = entry.kind.is_integral() && bound == bound.round();
            let phi = if integral {
                let fj = alpha - alpha.floor();
                if fj < self.settings.zero_tol || fj > 1.0 - self.settings.zero_tol {
                    continue;
                }
                if fj <= f0 {
                    fj
                } else {
                    f0 / (1.0 - f0) * (1.0 - fj)
                }
            } else if alpha >= 0.0 {
                alpha
            } else {
                f0 / (1.0 - f0) * (-alpha)
            };

            let (coef, shift) = match entry.status {
                NonbasicStatus::AtUpper => (-phi, -phi * bound),
                _ => (phi, phi * bound),
            };
            rhs += shift;
            match entry.var {
                TableauVar::Row(i) => phi_rows[i] += coef,
                TableauVar::Column(j) => phi_cols[j] += coef,
            }
        }

        // r_i = a_i x
        for (i, &p) in phi_rows.iter().enumerate() {
            if p != 0.0 {
                for (j, a) in oracle.row_coefficients(i) {
                    phi_cols[j] += p * a;
                }
            }
        }

        let entries: Vec<(usize, f64)> = phi_cols
            .into_iter()
            .enumerate()
            .filter(|&(_, v)| v.abs() > self.settings.zero_tol)
            .collect();
        if entries.is_empty() {
            return None;
        }

        self.stats.cuts_generated += 1;
        log::debug!(
            "Gomory cut from x[{}] = {:.6} at node {}: {} nonzeros, rhs {:.6}",
            col,
            beta,
            node,
            entries.len(),
            rhs
        );
        Some(Cut::new(
            sparse::sparse_row(n, &entries),
            rhs,
            CutSource::GomoryMixedInteger { column: col, node },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brancut_lp::{LpModel, SimplexSolver, VarKind};

    fn knapsack() -> SimplexSolver {
        let mut model = LpModel::new(vec![5.0, 4.0], vec![VarKind::Integer; 2]).unwrap();
        model.add_le(&[(0, 6.0), (1, 4.0)], 24.0).unwrap();
        model.add_le(&[(0, 1.0), (1, 2.0)], 6.0).unwrap();
        let mut lp = SimplexSolver::from(model);
        Relaxation::solve(&mut lp);
        lp
    }

    #[test]
    fn test_cut_from_fractional_row() {
        let lp = knapsack();
        let mut generator = GomoryGenerator::default();
        let cut = generator.generate(&lp, 1, 1).unwrap();

        // y = 1.5 - r0/8 + 3 r1/4 with both rows at their upper bound gives
        // (24 - r0)/8 + 3 (6 - r1)/4 >= 1/2, i.e. 1.5x + 2y <= 7.
        let coefs: Vec<(usize, f64)> = cut.coefficients.iter().map(|(j, &v)| (j, v)).collect();
        assert_eq!(coefs.len(), 2);
        assert!((coefs[0].1 + 1.5).abs() < 1e-9);
        assert!((coefs[1].1 + 2.0).abs() < 1e-9);
        assert!((cut.lower_bound + 7.0).abs() < 1e-9);
        assert_eq!(cut.source, CutSource::GomoryMixedInteger { column: 1, node: 1 });

        // Cuts off the LP point by f0, keeps every integer point.
        assert!((cut.violation(&[3.0, 1.5]).unwrap() - 0.5).abs() < 1e-9);
        for x in 0..=4 {
            for y in 0..=3 {
                let p = [x as f64, y as f64];
                if lp.model().is_feasible(&p, 1e-9) {
                    assert!(cut.is_satisfied(&p, 1e-9), "cut removes {:?}", p);
                }
            }
        }
        assert_eq!(generator.stats().cuts_generated, 1);
    }

    #[test]
    fn test_no_cut_for_integral_basic() {
        let lp = knapsack();
        let mut generator = GomoryGenerator::default();
        // x = 3 is basic but integral.
        assert!(generator.generate(&lp, 0, 1).is_none());
    }

    #[test]
    fn test_no_cut_for_continuous_or_nonbasic() {
        let mut model = LpModel::new(vec![1.0, 1.0], vec![VarKind::Continuous, VarKind::Integer]).unwrap();
        model.add_le(&[(0, 2.0)], 3.0).unwrap();
        model.add_le(&[(1, 1.0)], 10.0).unwrap();
        model.set_col_bounds(1, 0.0, 2.5).unwrap();
        let mut lp = SimplexSolver::from(model);
        Relaxation::solve(&mut lp);

        let mut generator = GomoryGenerator::default();
        assert!(generator.generate(&lp, 0, 1).is_none());
        // y sits at its (fractional) upper bound, nonbasic.
        assert!(!lp.is_basic(1));
        assert!(generator.generate(&lp, 1, 1).is_none());
    }

    #[test]
    fn test_no_cut_without_tableau() {
        let mut model = LpModel::new(vec![1.0], vec![VarKind::Integer]).unwrap();
        model.add_le(&[(0, 2.0)], 3.0).unwrap();
        let lp = SimplexSolver::from(model);
        let mut generator = GomoryGenerator::default();
        assert!(generator.generate(&lp, 0, 1).is_none());
    }
}
