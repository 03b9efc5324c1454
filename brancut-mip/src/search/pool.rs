//! Node pool: the live work list of unexplored subproblems.
//!
//! Entries are kept in insertion order. A [`NodeSelector`] picks the
//! position of the next node; the pool removes that entry immediately and
//! hands the subproblem over by value.

use super::node::Subproblem;

/// Read-only view of the pool handed to selectors.
pub trait PoolView {
    /// Number of waiting nodes.
    fn len(&self) -> usize;

    /// Whether no node is waiting.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// LP bound of the node at position `i`.
    fn upper_bound(&self, i: usize) -> f64;
}

/// Node removal strategy.
pub trait NodeSelector {
    /// Strategy name (for logging).
    fn name(&self) -> &'static str;

    /// Position of the next node, or None if the pool is empty.
    fn pick(&self, pool: &dyn PoolView) -> Option<usize>;
}

/// Oldest inserted node first.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthFirst;

impl NodeSelector for DepthFirst {
    fn name(&self) -> &'static str {
        "depth-first"
    }

    fn pick(&self, pool: &dyn PoolView) -> Option<usize> {
        (!pool.is_empty()).then_some(0)
    }
}

/// Greatest LP bound first; earliest inserted wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestBound;

impl NodeSelector for BestBound {
    fn name(&self) -> &'static str {
        "best-bound"
    }

    fn pick(&self, pool: &dyn PoolView) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for i in 0..pool.len() {
            let bound = pool.upper_bound(i);
            match best {
                Some((_, b)) if bound <= b => {}
                _ => best = Some((i, bound)),
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Pool of subproblems in insertion order.
#[derive(Debug, Clone)]
pub struct NodePool<R> {
    entries: Vec<Subproblem<R>>,

    /// Count of nodes added.
    nodes_added: u64,

    /// Count of nodes taken.
    nodes_taken: u64,
}

impl<R> Default for NodePool<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> NodePool<R> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            nodes_added: 0,
            nodes_taken: 0,
        }
    }

    /// Add a node at the back.
    pub fn push(&mut self, node: Subproblem<R>) {
        self.entries.push(node);
        self.nodes_added += 1;
    }

    /// Remove and return the node chosen by `selector`, with the position
    /// it occupied.
    pub fn take(&mut self, selector: &dyn NodeSelector) -> Option<(Subproblem<R>, usize)> {
        let i = selector.pick(&*self)?;
        if i >= self.entries.len() {
            return None;
        }
        self.nodes_taken += 1;
        Some((self.entries.remove(i), i))
    }

    /// Total number of nodes added.
    pub fn total_added(&self) -> u64 {
        self.nodes_added
    }

    /// Total number of nodes taken.
    pub fn total_taken(&self) -> u64 {
        self.nodes_taken
    }

    /// Greatest LP bound among waiting nodes (`-inf` if empty).
    pub fn best_bound(&self) -> f64 {
        self.entries
            .iter()
            .map(|n| n.upper_bound)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

impl<R> PoolView for NodePool<R> {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn upper_bound(&self, i: usize) -> f64 {
        self.entries[i].upper_bound
    }
}
