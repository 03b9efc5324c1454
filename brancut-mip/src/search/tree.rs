//! Insert-only record of every subproblem ever created.
//!
//! The tree is an arena indexed by [`NodeId`]. It is used for reporting
//! only; the node pool decides what gets explored.

use std::collections::HashMap;
use std::fmt;

use super::node::NodeId;
use crate::error::{MilpError, MilpResult};

/// Why a node left the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PruneReason {
    /// Still open, or branched.
    #[default]
    None,

    /// Relaxation solution was integer feasible.
    PrunedIntegral,

    /// Relaxation was infeasible or unbounded.
    PrunedInfeasible,

    /// Relaxation bound could not beat the incumbent.
    PrunedByBound,
}

impl PruneReason {
    /// Suffix used by the tree rendering.
    fn marker(self) -> &'static str {
        match self {
            PruneReason::None => "",
            PruneReason::PrunedIntegral => " I",
            PruneReason::PrunedInfeasible => " F",
            PruneReason::PrunedByBound => " B",
        }
    }
}

/// What happened to a node popped from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFate {
    /// Pruned as integer feasible.
    PrunedIntegral,
    /// Pruned as infeasible.
    PrunedInfeasible,
    /// Fathomed by bound.
    PrunedByBound,
    /// Replaced by two children.
    Branched,
}

impl NodeFate {
    /// Prune reason recorded in the tree for this fate.
    pub fn prune_reason(self) -> PruneReason {
        match self {
            NodeFate::PrunedIntegral => PruneReason::PrunedIntegral,
            NodeFate::PrunedInfeasible => PruneReason::PrunedInfeasible,
            NodeFate::PrunedByBound => PruneReason::PrunedByBound,
            NodeFate::Branched => PruneReason::None,
        }
    }
}

/// One permanent tree record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Subproblem id.
    pub id: NodeId,
    /// Parent id (None for the root).
    pub parent: Option<NodeId>,
    /// Children in creation order.
    pub children: Vec<NodeId>,
    /// Depth (0 for the root).
    pub depth: usize,
    /// Terminal annotation.
    pub prune: PruneReason,
}

/// Arena of tree nodes.
#[derive(Debug, Clone, Default)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
    index: HashMap<NodeId, usize>,
}

impl SearchTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the root. Fails if the tree is not empty.
    pub fn insert_root(&mut self, id: NodeId) -> MilpResult<()> {
        if !self.nodes.is_empty() {
            return Err(MilpError::Internal(format!(
                "root {} inserted into a non-empty tree",
                id
            )));
        }
        self.push(TreeNode {
            id,
            parent: None,
            children: Vec::new(),
            depth: 0,
            prune: PruneReason::None,
        });
        Ok(())
    }

    /// Append a child. Fails if the parent is missing or the id is taken.
    pub fn insert_child(&mut self, parent: NodeId, id: NodeId) -> MilpResult<()> {
        if self.index.contains_key(&id) {
            return Err(MilpError::Internal(format!("node {} inserted twice", id)));
        }
        let slot = *self.index.get(&parent).ok_or_else(|| {
            MilpError::Internal(format!("parent {} of node {} not in tree", parent, id))
        })?;
        let depth = self.nodes[slot].depth + 1;
        self.nodes[slot].children.push(id);
        self.push(TreeNode {
            id,
            parent: Some(parent),
            children: Vec::new(),
            depth,
            prune: PruneReason::None,
        });
        Ok(())
    }

    fn push(&mut self, node: TreeNode) {
        self.index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
    }

    /// Record why a node was pruned.
    pub fn mark(&mut self, id: NodeId, reason: PruneReason) -> MilpResult<()> {
        let slot = *self
            .index
            .get(&id)
            .ok_or_else(|| MilpError::Internal(format!("node {} not in tree", id)))?;
        self.nodes[slot].prune = reason;
        Ok(())
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// Parent of a node (None for the root or unknown ids).
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// The root, if inserted.
    pub fn root(&self) -> Option<&TreeNode> {
        self.nodes.first()
    }

    /// Whether the id is recorded.
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// Pre-order listing with the legend line on top.
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn render_from(&self, f: &mut fmt::Formatter<'_>, root: usize) -> fmt::Result {
        let mut stack = vec![root];
        while let Some(slot) = stack.pop() {
            let node = &self.nodes[slot];
            writeln!(
                f,
                "{:indent$}-{}{}",
                "",
                node.id,
                node.prune.marker(),
                indent = node.depth
            )?;
            stack.extend(node.children.iter().rev().filter_map(|c| self.index.get(c).copied()));
        }
        Ok(())
    }
}

impl fmt::Display for SearchTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[I = Integral node, F = Infeasible node, B = Worse bound node]")?;
        if self.nodes.is_empty() {
            return Ok(());
        }
        self.render_from(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> SearchTree {
        let mut tree = SearchTree::new();
        tree.insert_root(1).unwrap();
        tree.insert_child(1, 2).unwrap();
        tree.insert_child(1, 3).unwrap();
        tree.insert_child(2, 4).unwrap();
        tree.insert_child(2, 5).unwrap();
        tree.mark(3, PruneReason::PrunedIntegral).unwrap();
        tree.mark(4, PruneReason::PrunedInfeasible).unwrap();
        tree.mark(5, PruneReason::PrunedByBound).unwrap();
        tree
    }

    #[test]
    fn test_links() {
        let tree = small_tree();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.parent(1), None);
        assert_eq!(tree.parent(5), Some(2));
        assert_eq!(tree.get(2).unwrap().children, vec![4, 5]);
        assert_eq!(tree.get(4).unwrap().depth, 2);
        assert_eq!(tree.root().map(|n| n.id), Some(1));
    }

    #[test]
    fn test_missing_parent_rejected() {
        let mut tree = small_tree();
        assert!(matches!(tree.insert_child(9, 10), Err(MilpError::Internal(_))));
        assert!(matches!(tree.insert_child(1, 3), Err(MilpError::Internal(_))));
        assert!(matches!(tree.insert_root(7), Err(MilpError::Internal(_))));
        assert!(tree.mark(42, PruneReason::PrunedByBound).is_err());
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_render() {
        let expected = "[I = Integral node, F = Infeasible node, B = Worse bound node]\n\
                        -1\n \
                        -2\n  \
                        -4 F\n  \
                        -5 B\n \
                        -3 I\n";
        assert_eq!(small_tree().render(), expected);
    }

    #[test]
    fn test_fate_to_reason() {
        assert_eq!(NodeFate::Branched.prune_reason(), PruneReason::None);
        assert_eq!(NodeFate::PrunedByBound.prune_reason(), PruneReason::PrunedByBound);
    }
}
