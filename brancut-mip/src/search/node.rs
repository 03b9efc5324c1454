//! Subproblems and node identifiers.

use brancut_lp::LpResult;

use crate::oracle::{BoundSide, Relaxation};

/// Process-unique subproblem identifier.
pub type NodeId = u64;

/// Hands out subproblem ids.
///
/// The root gets `1`; children are allocated in pairs so the floor child of
/// a branch always has an even id and the ceil child the following odd one.
#[derive(Debug, Clone)]
pub struct NodeIdGenerator {
    next: NodeId,
}

impl Default for NodeIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeIdGenerator {
    /// Start at id 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Next single id.
    pub fn next_id(&mut self) -> NodeId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Next (even, odd) pair for a branch.
    pub fn next_pair(&mut self) -> (NodeId, NodeId) {
        if self.next % 2 == 1 {
            self.next += 1;
        }
        let even = self.next_id();
        (even, self.next_id())
    }

    /// Ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

/// A bound change from branching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundChange {
    /// Variable index.
    pub var: usize,

    /// Value of the variable in the parent relaxation.
    pub value: f64,

    /// Which bound moved.
    pub side: BoundSide,

    /// New bound.
    pub bound: f64,
}

impl BoundChange {
    /// Create a "down" branch: x <= floor(value).
    pub fn down_branch(var: usize, value: f64) -> Self {
        Self {
            var,
            value,
            side: BoundSide::Upper,
            bound: value.floor(),
        }
    }

    /// Create an "up" branch: x >= ceil(value).
    pub fn up_branch(var: usize, value: f64) -> Self {
        Self {
            var,
            value,
            side: BoundSide::Lower,
            bound: value.ceil(),
        }
    }

    /// Apply the change to an oracle.
    pub fn apply<R: Relaxation>(&self, oracle: &mut R) -> LpResult<()> {
        oracle.set_variable_bound(self.var, self.side, self.bound)
    }

    /// Whether an integer value satisfies this bound.
    pub fn admits(&self, x: f64) -> bool {
        match self.side {
            BoundSide::Upper => x <= self.bound,
            BoundSide::Lower => x >= self.bound,
        }
    }
}

/// A subproblem waiting in the node pool.
///
/// Owns its own copy of the relaxation.
#[derive(Debug, Clone)]
pub struct Subproblem<R> {
    /// Unique id.
    pub id: NodeId,

    /// Parent id (None for the root).
    pub parent: Option<NodeId>,

    /// Depth in the tree (0 for the root).
    pub depth: usize,

    /// Set only on the first subproblem.
    pub is_root: bool,

    /// Owned relaxation model.
    pub model: R,

    /// LP bound of the relaxation: `+inf` until solved, `-inf` if the
    /// creation-time solve was not optimal.
    pub upper_bound: f64,

    /// Reserved.
    pub lower_bound: f64,

    /// Bound change from the parent (None for the root).
    pub bound_change: Option<BoundChange>,
}

impl<R: Relaxation> Subproblem<R> {
    /// Create the root subproblem.
    pub fn root(id: NodeId, model: R) -> Self {
        Self {
            id,
            parent: None,
            depth: 0,
            is_root: true,
            model,
            upper_bound: f64::INFINITY,
            lower_bound: f64::NEG_INFINITY,
            bound_change: None,
        }
    }

    /// Create a child from a copy of the parent's (possibly cut-augmented)
    /// model with `change` applied. The child is not solved yet.
    pub fn child(
        id: NodeId,
        parent: NodeId,
        depth: usize,
        mut model: R,
        change: BoundChange,
    ) -> LpResult<Self> {
        change.apply(&mut model)?;
        Ok(Self {
            id,
            parent: Some(parent),
            depth,
            is_root: false,
            model,
            upper_bound: f64::INFINITY,
            lower_bound: f64::NEG_INFINITY,
            bound_change: Some(change),
        })
    }

    /// Solve the owned model once and record its bound.
    pub fn presolve_bound(&mut self) -> f64 {
        let status = self.model.solve();
        self.upper_bound = if status.is_optimal() {
            self.model.objective_value()
        } else {
            f64::NEG_INFINITY
        };
        self.upper_bound
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
        SimplexSolver::from(model)
    }

    #[test]
    fn test_id_pairs() {
        let mut ids = NodeIdGenerator::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_pair(), (2, 3));
        assert_eq!(ids.next_pair(), (4, 5));
        assert_eq!(ids.issued(), 5);
    }

    #[test]
    fn test_pairs_stay_even_odd() {
        let mut ids = NodeIdGenerator::new();
        ids.next_id();
        ids.next_id();
        assert_eq!(ids.next_pair(), (4, 5));
    }

    #[test]
    fn test_branch_disjointness() {
        let down = BoundChange::down_branch(1, 1.5);
        let up = BoundChange::up_branch(1, 1.5);
        assert_eq!(down.bound, 1.0);
        assert_eq!(up.bound, 2.0);
        for x in -3..6 {
            let x = x as f64;
            assert!(down.admits(x) ^ up.admits(x));
        }
    }

    #[test]
    fn test_children_solve_independently() {
        let root = Subproblem::root(1, knapsack());
        assert!(root.is_root);
        assert_eq!(root.upper_bound, f64::INFINITY);

        let mut down =
            Subproblem::child(2, 1, 1, root.model.clone(), BoundChange::down_branch(1, 1.5)).unwrap();
        let mut up =
            Subproblem::child(3, 1, 1, root.model.clone(), BoundChange::up_branch(1, 1.5)).unwrap();

        assert!((down.presolve_bound() - 62.0 / 3.0).abs() < 1e-9);
        assert!((up.presolve_bound() - 18.0).abs() < 1e-9);
        assert_eq!(Relaxation::variable_bounds(&root.model, 1), (0.0, f64::INFINITY));
        assert_eq!(down.parent, Some(1));
        assert!(!up.is_root);
    }

    #[test]
    fn test_infeasible_child_bound() {
        let root = Subproblem::root(1, knapsack());
        let mut child =
            Subproblem::child(2, 1, 1, root.model.clone(), BoundChange::up_branch(0, 4.5)).unwrap();
        assert_eq!(child.presolve_bound(), f64::NEG_INFINITY);
    }
}
