//! Linear models and a reference LP relaxation solver.
//!
//! This crate holds the numerical side of the branch-and-cut engine:
//!
//! - [`LpModel`]: a maximization LP with sparse range rows, column bounds and
//!   column kinds (continuous, integer, binary).
//! - [`SimplexSolver`]: a dense bounded-variable primal simplex that keeps its
//!   final tableau around so that cutting planes can be read off of it.
//!
//! # Example
//!
//! ```
//! use brancut_lp::{LpModel, SimplexSolver, SolveStatus, VarKind};
//!
//! // maximize 5x + 4y  s.t.  6x + 4y <= 24,  x + 2y <= 6
//! let mut model = LpModel::new(vec![5.0, 4.0], vec![VarKind::Integer; 2]).unwrap();
//! model.add_le(&[(0, 6.0), (1, 4.0)], 24.0).unwrap();
//! model.add_le(&[(0, 1.0), (1, 2.0)], 6.0).unwrap();
//!
//! let mut lp = SimplexSolver::from(model);
//! assert_eq!(lp.solve(), SolveStatus::Optimal);
//! assert!((lp.objective_value() - 21.0).abs() < 1e-9);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod problem;
pub mod simplex;
pub mod sparse;

pub use error::{LpError, LpResult};
pub use problem::{LpModel, VarKind};
pub use simplex::{SimplexSettings, SimplexSolver, SolveStatus, VarStatus};
