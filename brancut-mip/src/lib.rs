//! Branch-and-cut for mixed-integer linear programs.
//!
//! The engine explores a tree of LP relaxations: each node is solved,
//! classified as infeasible, integral or fractional, and then either pruned
//! or split into two children on a fractional integer variable. Gomory
//! mixed-integer cuts can tighten a node before it is split.
//!
//! # Example
//!
//! ```
//! use brancut_lp::{LpModel, VarKind};
//! use brancut_mip::{solve_milp, MilpSettings, MilpStatus};
//!
//! // maximize 5x + 4y  s.t.  6x + 4y <= 24,  x + 2y <= 6,  x, y integer
//! let mut model = LpModel::new(vec![5.0, 4.0], vec![VarKind::Integer; 2]).unwrap();
//! model.add_le(&[(0, 6.0), (1, 4.0)], 24.0).unwrap();
//! model.add_le(&[(0, 1.0), (1, 2.0)], 6.0).unwrap();
//!
//! let solution = solve_milp(model, &MilpSettings::default()).unwrap();
//! assert_eq!(solution.status, MilpStatus::Optimal);
//! assert!((solution.objective - 20.0).abs() < 1e-9);
//! ```

#![warn(missing_docs)]

pub mod cuts;
pub mod error;
pub mod model;
pub mod oracle;
pub mod search;
pub mod settings;
pub mod telemetry;

pub use error::{ConfigError, MilpError, MilpResult, TelemetryError};
pub use model::{IncumbentTracker, MilpSolution, MilpStatus, SearchStats};
pub use oracle::{Relaxation, RelaxationStatus};
pub use search::{BranchAndCut, CancellationToken, NodeFate, PruneReason, SearchTree};
pub use settings::{BranchingRule, CutStrategy, IntegralityScope, MilpSettings, NodeSelection};
pub use telemetry::Telemetry;

use brancut_lp::{LpModel, SimplexSolver};

/// Solve `model` (maximization) with the reference simplex oracle.
///
/// Settings and model are validated before the search starts. If a
/// telemetry port is configured, this blocks until an observer connects.
pub fn solve_milp(model: LpModel, settings: &MilpSettings) -> MilpResult<MilpSolution> {
    settings.validate()?;
    model.validate()?;

    let telemetry = match settings.telemetry_port {
        Some(port) => Telemetry::listen(port)?,
        None => Telemetry::disabled(),
    };

    log::info!(
        "Solving MILP: {} columns, {} rows",
        model.num_cols(),
        model.num_rows()
    );
    BranchAndCut::new(SimplexSolver::from(model), settings.clone())?
        .with_telemetry(telemetry)
        .run()
}
