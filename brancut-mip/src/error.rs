//! Error types for the branch-and-cut engine.
//!
//! Infeasible, integral and fractional nodes are search outcomes, not
//! errors, and so is a cut generator declining to produce a cut. Only bad
//! configuration, bad model data, the iteration cap and broken engine
//! invariants end up here.

use thiserror::Error;

use brancut_lp::LpError;

/// Errors in the engine configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Unrecognized node selection name or code.
    #[error("Unknown node selection strategy: {0:?}")]
    UnknownNodeSelection(String),

    /// Unrecognized branching rule name or code.
    #[error("Unknown branching rule: {0:?}")]
    UnknownBranchingRule(String),

    /// Unrecognized cut strategy name or code.
    #[error("Unknown cut strategy: {0:?}")]
    UnknownCutStrategy(String),

    /// Unrecognized integrality scope name.
    #[error("Unknown integrality scope: {0:?}")]
    UnknownIntegralityScope(String),

    /// Cut acceptance fraction outside `[0, 1]`.
    #[error("Cut fraction must lie in [0, 1], got {0}")]
    CutFraction(f64),

    /// Negative or NaN integrality tolerance.
    #[error("Integrality tolerance must be finite and non-negative, got {0}")]
    IntegralityTolerance(f64),

    /// Gomory generator setting out of range.
    #[error("Invalid Gomory settings: {0}")]
    Gomory(String),

    /// An iteration cap of zero would never process the root.
    #[error("Iteration cap must be positive")]
    ZeroIterationCap,

    /// Settings document could not be parsed.
    #[error("Failed to parse settings: {0}")]
    Parse(String),
}

/// Errors on the telemetry channel.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Transport failure.
    #[error("Telemetry I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Event could not be encoded.
    #[error("Telemetry encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Observer went away.
    #[error("Telemetry channel closed by observer")]
    Closed,
}

/// Errors that can occur during a branch-and-cut run.
#[derive(Error, Debug)]
pub enum MilpError {
    /// Configuration rejected before the search started.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Model data rejected before the search started.
    #[error("Invalid model: {0}")]
    InvalidModel(#[from] LpError),

    /// Telemetry could not be set up.
    #[error("Telemetry setup failed: {0}")]
    Telemetry(#[from] TelemetryError),

    /// The search hit the iteration cap without exhausting the node pool.
    #[error("Iteration limit of {limit} reached (best lower bound so far: {best_lower_bound})")]
    IterationLimit {
        /// The configured cap.
        limit: u64,
        /// Incumbent objective when the cap was hit (`-inf` if none).
        best_lower_bound: f64,
    },

    /// Broken engine invariant.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for engine operations.
pub type MilpResult<T> = Result<T, MilpError>;
