//! Branch-and-cut search.

pub mod branching;
mod cancel;
mod engine;
mod node;
pub mod pool;
mod tree;

pub use branching::{BranchingStrategy, ClosestToHalf, GreatestObjectiveImpact, InOrder};
pub use cancel::CancellationToken;
pub use engine::BranchAndCut;
pub use node::{BoundChange, NodeId, NodeIdGenerator, Subproblem};
pub use pool::{BestBound, DepthFirst, NodePool, NodeSelector, PoolView};
pub use tree::{NodeFate, PruneReason, SearchTree, TreeNode};
