//! Search outcome types.

use std::fmt;

use crate::oracle::Relaxation;
use crate::search::{NodeFate, NodeId, SearchTree};

/// Status of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilpStatus {
    /// Node pool exhausted with an incumbent: it is optimal.
    Optimal,

    /// No integer feasible point (infeasible root, or pool exhausted
    /// without an incumbent).
    Infeasible,

    /// Stopped through the cancellation token; incumbent is the best so far.
    Interrupted,
}

impl MilpStatus {
    /// Returns true if optimality was proven.
    pub fn is_optimal(&self) -> bool {
        matches!(self, MilpStatus::Optimal)
    }
}

/// Counters collected during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    /// Loop iterations (nodes taken from the pool).
    pub iterations: u64,

    /// Subproblems created, root included.
    pub nodes_created: u64,

    /// Nodes pruned as integer feasible.
    pub pruned_integral: u64,

    /// Nodes pruned as infeasible.
    pub pruned_infeasible: u64,

    /// Nodes fathomed by bound.
    pub pruned_by_bound: u64,

    /// Nodes replaced by children.
    pub branched: u64,

    /// Cuts produced by the generator.
    pub cuts_generated: u64,

    /// Cuts added as rows.
    pub cuts_injected: u64,

    /// Incumbent improvements.
    pub incumbent_updates: u64,

    /// Wall time in milliseconds.
    pub solve_time_ms: u64,
}

impl SearchStats {
    /// Count one processed node.
    pub fn record(&mut self, fate: NodeFate) {
        match fate {
            NodeFate::PrunedIntegral => self.pruned_integral += 1,
            NodeFate::PrunedInfeasible => self.pruned_infeasible += 1,
            NodeFate::PrunedByBound => self.pruned_by_bound += 1,
            NodeFate::Branched => self.branched += 1,
        }
    }
}

/// Complete result of a run.
#[derive(Debug, Clone)]
pub struct MilpSolution {
    /// Run status.
    pub status: MilpStatus,

    /// Best lower bound (incumbent objective, `-inf` without one).
    pub objective: f64,

    /// Column values of the incumbent (empty without one).
    pub values: Vec<f64>,

    /// Human-readable incumbent, e.g. `[5] 5*(x[0] = 4) = 20`.
    pub description: Option<String>,

    /// Node that produced the incumbent.
    pub incumbent_node: Option<NodeId>,

    /// Every subproblem created, with prune annotations.
    pub tree: SearchTree,

    /// Counters.
    pub stats: SearchStats,

    /// `(node, fate)` for each processed node, in processing order.
    pub trace: Vec<(NodeId, NodeFate)>,

    /// Incumbent objective after each improvement.
    pub bound_history: Vec<f64>,
}

impl MilpSolution {
    /// Returns true if an integer feasible solution is attached.
    pub fn has_solution(&self) -> bool {
        !self.values.is_empty()
    }
}

impl fmt::Display for MilpSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.status, &self.description) {
            (MilpStatus::Infeasible, _) | (_, None) => writeln!(f, "No feasible solution found")?,
            (_, Some(desc)) => writeln!(f, "{}", desc)?,
        }
        write!(
            f,
            "{:?}: {} iterations, {} nodes, {} cuts",
            self.status, self.stats.iterations, self.stats.nodes_created, self.stats.cuts_injected
        )
    }
}

/// Tracks the best known integer feasible solution (incumbent).
#[derive(Debug, Clone)]
pub struct IncumbentTracker {
    /// Current best solution (if any).
    pub solution: Option<Vec<f64>>,

    /// Objective value of the incumbent.
    /// Initialized to -∞ (maximization).
    pub best_lower_bound: f64,

    /// Description of the incumbent.
    pub description: Option<String>,

    /// Node that produced it.
    pub node: Option<NodeId>,

    /// Objective after each update, in order.
    pub history: Vec<f64>,
}

impl Default for IncumbentTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl IncumbentTracker {
    /// Create a new incumbent tracker.
    pub fn new() -> Self {
        Self {
            solution: None,
            best_lower_bound: f64::NEG_INFINITY,
            description: None,
            node: None,
            history: Vec::new(),
        }
    }

    /// Check if we have an incumbent.
    pub fn has_incumbent(&self) -> bool {
        self.solution.is_some()
    }

    /// Number of times the incumbent was updated.
    pub fn update_count(&self) -> usize {
        self.history.len()
    }

    /// Take the solution of a node if its objective is strictly better.
    ///
    /// Returns true if the incumbent was improved.
    pub fn update(&mut self, node: NodeId, x: &[f64], obj: f64, description: String) -> bool {
        if obj > self.best_lower_bound {
            self.solution = Some(x.to_vec());
            self.best_lower_bound = obj;
            self.description = Some(description);
            self.node = Some(node);
            self.history.push(obj);
            true
        } else {
            false
        }
    }

    /// Whether a relaxation bound cannot beat the incumbent.
    ///
    /// `prune_ties` fathoms bounds equal to the incumbent as well.
    pub fn dominates(&self, bound: f64, prune_ties: bool) -> bool {
        if prune_ties {
            bound <= self.best_lower_bound
        } else {
            bound < self.best_lower_bound
        }
    }
}

/// Describe the current solution of `oracle` as found at `node`.
///
/// Lists variables with a non-zero value and a non-zero objective
/// coefficient: `[node] c1*(x[i] = v1) + c2*(x[j] = v2) = z`.
pub fn describe_solution<R: Relaxation>(node: NodeId, oracle: &R) -> String {
    let terms: Vec<String> = (0..oracle.num_variables())
        .filter_map(|j| {
            let c = oracle.objective_coefficient(j);
            let v = oracle.variable_value(j);
            (c != 0.0 && v != 0.0).then(|| format!("{}*(x[{}] = {})", c, j, v))
        })
        .collect();
    let body = if terms.is_empty() {
        "0".to_string()
    } else {
        terms.join(" + ")
    };
    format!("[{}] {} = {}", node, body, oracle.objective_value())
}
