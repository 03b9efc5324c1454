//! Branching variable selection.

use crate::oracle::FractionalVar;

/// Picks one variable out of the violated set.
pub trait BranchingStrategy {
    /// Strategy name (for logging).
    fn name(&self) -> &'static str;

    /// Position in `candidates` of the variable to branch on, or None if
    /// `candidates` is empty.
    fn select(&self, candidates: &[FractionalVar]) -> Option<usize>;
}

/// First violated variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct InOrder;

impl BranchingStrategy for InOrder {
    fn name(&self) -> &'static str {
        "in-order"
    }

    fn select(&self, candidates: &[FractionalVar]) -> Option<usize> {
        (!candidates.is_empty()).then_some(0)
    }
}

/// Fractional part closest to 0.5; first occurrence wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosestToHalf;

impl BranchingStrategy for ClosestToHalf {
    fn name(&self) -> &'static str {
        "closest-to-half"
    }

    fn select(&self, candidates: &[FractionalVar]) -> Option<usize> {
        first_max_by(candidates, |v| -(v.fractional_part() - 0.5).abs())
    }
}

/// Largest absolute objective coefficient; first occurrence wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreatestObjectiveImpact;

impl BranchingStrategy for GreatestObjectiveImpact {
    fn name(&self) -> &'static str {
        "greatest-objective-impact"
    }

    fn select(&self, candidates: &[FractionalVar]) -> Option<usize> {
        first_max_by(candidates, |v| v.objective.abs())
    }
}

/// Position of the first candidate with the largest score.
fn first_max_by(candidates: &[FractionalVar], score: impl Fn(&FractionalVar) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in candidates.iter().enumerate() {
        let s = score(v);
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(index: usize, value: f64, objective: f64) -> FractionalVar {
        FractionalVar {
            index,
            value,
            objective,
        }
    }

    fn candidates() -> Vec<FractionalVar> {
        vec![
            var(0, 1.2, 3.0),
            var(2, 4.25, -7.0),
            var(5, 0.75, 7.0),
            var(6, 2.9, 1.0),
        ]
    }

    #[test]
    fn test_in_order() {
        assert_eq!(InOrder.select(&candidates()), Some(0));
        assert_eq!(InOrder.select(&[]), None);
    }

    #[test]
    fn test_closest_to_half_keeps_first_tie() {
        // 4.25 and 0.75 are both a quarter away from one half.
        let picked = ClosestToHalf.select(&candidates()).unwrap();
        assert_eq!(candidates()[picked].index, 2);
    }

    #[test]
    fn test_closest_to_half_negative_values() {
        let c = vec![var(0, 0.9, 1.0), var(1, -1.5, 1.0)];
        assert_eq!(ClosestToHalf.select(&c), Some(1));
    }

    #[test]
    fn test_greatest_objective_impact() {
        let picked = GreatestObjectiveImpact.select(&candidates()).unwrap();
        assert_eq!(candidates()[picked].index, 2);
        assert_eq!(GreatestObjectiveImpact.select(&[]), None);
    }
}
