//! Classification of a solved relaxation.

use super::{Relaxation, RelaxationStatus};
use crate::settings::IntegralityScope;

/// A variable whose relaxation value violates integrality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionalVar {
    /// Column index.
    pub index: usize,
    /// Relaxation value.
    pub value: f64,
    /// Objective coefficient.
    pub objective: f64,
}

impl FractionalVar {
    /// Fractional part in `[0, 1)`, also for negative values.
    pub fn fractional_part(&self) -> f64 {
        self.value - self.value.floor()
    }
}

/// Outcome of classifying a relaxation.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Infeasible or unbounded relaxation.
    Infeasible,
    /// Every checked integer variable is integral.
    Integral,
    /// Violated variables in ascending index order (never empty).
    Fractional(Vec<FractionalVar>),
}

/// Classification plus whether the search has to stop here.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Node classification.
    pub classification: Classification,
    /// Set for an infeasible root: the whole problem is infeasible.
    pub terminates_search: bool,
}

/// Classify a solved relaxation.
///
/// Under [`IntegralityScope::ObjectiveSupport`] only variables with a
/// non-zero value and a non-zero objective coefficient are inspected;
/// [`IntegralityScope::AllColumns`] inspects every integer variable. A
/// value counts as integral when it is within `tol` of the nearest integer.
pub fn evaluate_relaxation<R: Relaxation>(
    oracle: &R,
    status: RelaxationStatus,
    is_root: bool,
    scope: IntegralityScope,
    tol: f64,
) -> Evaluation {
    if !status.is_optimal() {
        return Evaluation {
            classification: Classification::Infeasible,
            terminates_search: is_root,
        };
    }

    let violated: Vec<FractionalVar> = (0..oracle.num_variables())
        .filter(|&j| oracle.variable_kind(j).is_integral())
        .filter_map(|j| {
            let value = oracle.variable_value(j);
            let objective = oracle.objective_coefficient(j);
            let in_scope = match scope {
                IntegralityScope::ObjectiveSupport => value != 0.0 && objective != 0.0,
                IntegralityScope::AllColumns => true,
            };
            (in_scope && (value - value.round()).abs() > tol).then_some(FractionalVar {
                index: j,
                value,
                objective,
            })
        })
        .collect();

    let classification = if violated.is_empty() {
        Classification::Integral
    } else {
        Classification::Fractional(violated)
    };
    Evaluation {
        classification,
        terminates_search: false,
    }
}
