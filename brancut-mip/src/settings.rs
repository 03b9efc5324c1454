//! Configuration settings for the branch-and-cut engine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cuts::GomorySettings;
use crate::error::ConfigError;
use crate::search::branching::{BranchingStrategy, ClosestToHalf, GreatestObjectiveImpact, InOrder};
use crate::search::pool::{BestBound, DepthFirst, NodeSelector};

/// Node selection strategy for the node pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeSelection {
    /// Oldest inserted node first (queue order).
    #[default]
    DepthFirst,

    /// Node with the greatest LP bound first, earliest inserted on ties.
    BestBound,
}

impl NodeSelection {
    /// Build the selector for this strategy.
    pub fn selector(self) -> Box<dyn NodeSelector> {
        match self {
            NodeSelection::DepthFirst => Box::new(DepthFirst),
            NodeSelection::BestBound => Box::new(BestBound),
        }
    }
}

impl FromStr for NodeSelection {
    type Err = ConfigError;

    /// Accepts `depth-first` / `dfs` / `0` and `best-bound` / `best` / `1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "depth-first" | "dfs" | "0" => Ok(NodeSelection::DepthFirst),
            "best-bound" | "best" | "1" => Ok(NodeSelection::BestBound),
            _ => Err(ConfigError::UnknownNodeSelection(s.to_string())),
        }
    }
}

/// Branching variable selection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchingRule {
    /// First violated variable.
    #[default]
    InOrder,

    /// Violated variable with fractional part closest to 0.5.
    ClosestToHalf,

    /// Violated variable with the largest absolute objective coefficient.
    GreatestObjectiveImpact,
}

impl BranchingRule {
    /// Build the branching strategy for this rule.
    pub fn strategy(self) -> Box<dyn BranchingStrategy> {
        match self {
            BranchingRule::InOrder => Box::new(InOrder),
            BranchingRule::ClosestToHalf => Box::new(ClosestToHalf),
            BranchingRule::GreatestObjectiveImpact => Box::new(GreatestObjectiveImpact),
        }
    }
}

impl FromStr for BranchingRule {
    type Err = ConfigError;

    /// Accepts the kebab-case names and the codes `0` (in order),
    /// `1` (closest to half) and `2` (greatest objective impact).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-order" | "0" => Ok(BranchingRule::InOrder),
            "closest-to-half" | "1" => Ok(BranchingRule::ClosestToHalf),
            "greatest-objective-impact" | "2" => Ok(BranchingRule::GreatestObjectiveImpact),
            _ => Err(ConfigError::UnknownBranchingRule(s.to_string())),
        }
    }
}

/// Cutting plane strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CutStrategy {
    /// Plain branch-and-bound.
    #[default]
    None,

    /// Gomory mixed-integer cuts at every branched node.
    #[serde(alias = "gomory")]
    GomoryMixedInteger,
}

impl FromStr for CutStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(CutStrategy::None),
            "gomory" | "gomory-mixed-integer" | "gmi" => Ok(CutStrategy::GomoryMixedInteger),
            _ => Err(ConfigError::UnknownCutStrategy(s.to_string())),
        }
    }
}

/// Which integer variables the classifier checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegralityScope {
    /// Only variables with a non-zero value and a non-zero objective coefficient.
    #[default]
    ObjectiveSupport,

    /// Every non-continuous variable.
    AllColumns,
}

impl FromStr for IntegralityScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "objective-support" => Ok(IntegralityScope::ObjectiveSupport),
            "all-columns" | "all" => Ok(IntegralityScope::AllColumns),
            _ => Err(ConfigError::UnknownIntegralityScope(s.to_string())),
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilpSettings {
    // === Search strategy ===
    /// Node selection strategy.
    pub node_selection: NodeSelection,

    /// Branching variable selection rule.
    pub branching_rule: BranchingRule,

    // === Cut settings ===
    /// Cutting plane strategy.
    pub cut_strategy: CutStrategy,

    /// Share of the cuts generated at a node that enter the pool, in `[0, 1]`.
    pub cut_fraction: f64,

    /// Gomory generator tolerances.
    pub gomory: GomorySettings,

    // === Termination ===
    /// Iteration cap; reaching it aborts the run with an error.
    pub max_iterations: u64,

    // === Classification ===
    /// A value is integral if it lies within this distance of the nearest integer.
    /// `0.0` demands exact integrality.
    pub int_feas_tol: f64,

    /// Which variables must be integral for a node to count as integral.
    pub integrality_scope: IntegralityScope,

    /// Fathom fractional nodes whose bound ties the incumbent.
    pub prune_ties: bool,

    // === Output ===
    /// TCP port of the telemetry observer (None = telemetry off).
    pub telemetry_port: Option<u16>,

    /// Log frequency (progress line every N iterations, 0 = never).
    pub log_freq: u64,
}

impl Default for MilpSettings {
    fn default() -> Self {
        Self {
            // Search
            node_selection: NodeSelection::default(),
            branching_rule: BranchingRule::default(),

            // Cuts
            cut_strategy: CutStrategy::default(),
            cut_fraction: 1.0,
            gomory: GomorySettings::default(),

            // Termination
            max_iterations: 200_000,

            // Classification
            int_feas_tol: 1e-9,
            integrality_scope: IntegralityScope::default(),
            prune_ties: true,

            // Output
            telemetry_port: None,
            log_freq: 100,
        }
    }
}

impl MilpSettings {
    /// Parse settings from a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.cut_fraction) {
            return Err(ConfigError::CutFraction(self.cut_fraction));
        }
        if !self.int_feas_tol.is_finite() || self.int_feas_tol < 0.0 {
            return Err(ConfigError::IntegralityTolerance(self.int_feas_tol));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterationCap);
        }
        self.gomory.validate()
    }

    /// Whether Gomory cuts are generated.
    pub fn cuts_enabled(&self) -> bool {
        self.cut_strategy != CutStrategy::None
    }

    /// Set the node selection strategy.
    pub fn with_node_selection(mut self, node_selection: NodeSelection) -> Self {
        self.node_selection = node_selection;
        self
    }

    /// Set the branching rule.
    pub fn with_branching_rule(mut self, branching_rule: BranchingRule) -> Self {
        self.branching_rule = branching_rule;
        self
    }

    /// Enable Gomory cuts with the given acceptance fraction.
    pub fn with_gomory_cuts(mut self, fraction: f64) -> Self {
        self.cut_strategy = CutStrategy::GomoryMixedInteger;
        self.cut_fraction = fraction;
        self
    }

    /// Set the Gomory generator tolerances.
    pub fn with_gomory_settings(mut self, gomory: GomorySettings) -> Self {
        self.gomory = gomory;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the integrality tolerance.
    pub fn with_int_feas_tol(mut self, tol: f64) -> Self {
        self.int_feas_tol = tol;
        self
    }

    /// Set the integrality scope.
    pub fn with_integrality_scope(mut self, scope: IntegralityScope) -> Self {
        self.integrality_scope = scope;
        self
    }

    /// Keep (`false`) or fathom (`true`) nodes tying the incumbent.
    pub fn with_prune_ties(mut self, prune_ties: bool) -> Self {
        self.prune_ties = prune_ties;
        self
    }

    /// Stream telemetry to an observer on this port.
    pub fn with_telemetry_port(mut self, port: u16) -> Self {
        self.telemetry_port = Some(port);
        self
    }
}
