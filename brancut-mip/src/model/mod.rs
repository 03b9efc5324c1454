//! Incumbent and solution types for the branch-and-cut engine.

mod solution;

pub use solution::{describe_solution, IncumbentTracker, MilpSolution, MilpStatus, SearchStats};
