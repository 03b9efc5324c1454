//! Branch-and-cut controller.

use std::time::Instant;

use super::{
    BoundChange, BranchingStrategy, CancellationToken, NodeFate, NodeId, NodeIdGenerator, NodePool,
    NodeSelector, PoolView, SearchTree, Subproblem,
};
use crate::cuts::{CutPool, CutSelector, GomoryGenerator, MostRecent};
use crate::error::{MilpError, MilpResult};
use crate::model::{describe_solution, IncumbentTracker, MilpSolution, MilpStatus, SearchStats};
use crate::oracle::{evaluate_relaxation, Classification, FractionalVar, Relaxation};
use crate::settings::MilpSettings;
use crate::telemetry::{Event, EventKind, Telemetry};

/// Branch-and-cut controller.
///
/// Owns the node pool, the search tree, the incumbent and the cut pool for
/// one run. Nodes are moved out of the pool, solved, classified and then
/// either dropped (pruned) or replaced by two children.
pub struct BranchAndCut<R: Relaxation> {
    /// Settings.
    settings: MilpSettings,

    /// Node removal strategy.
    selector: Box<dyn NodeSelector>,

    /// Branching variable selector.
    branching: Box<dyn BranchingStrategy>,

    /// Waiting subproblems.
    pool: NodePool<R>,

    /// Every subproblem ever created.
    tree: SearchTree,

    /// Subproblem id source.
    ids: NodeIdGenerator,

    /// Incumbent solution tracker.
    incumbent: IncumbentTracker,

    /// Admitted cuts.
    cuts: CutPool,

    /// Gomory cut generator.
    generator: GomoryGenerator,

    /// Picks the cut injected at a branched node.
    cut_selector: Box<dyn CutSelector>,

    /// Event sink.
    telemetry: Telemetry,

    /// Optional stop flag.
    cancellation: Option<CancellationToken>,

    /// Counters.
    stats: SearchStats,

    /// Fate of every processed node.
    trace: Vec<(NodeId, NodeFate)>,

    /// Start time.
    start_time: Option<Instant>,
}

impl<R: Relaxation> BranchAndCut<R> {
    /// Create a controller whose root subproblem is `model`.
    pub fn new(model: R, settings: MilpSettings) -> MilpResult<Self> {
        settings.validate()?;

        let mut ids = NodeIdGenerator::new();
        let root_id = ids.next_id();
        let mut tree = SearchTree::new();
        tree.insert_root(root_id)?;
        let mut pool = NodePool::new();
        pool.push(Subproblem::root(root_id, model));

        Ok(Self {
            selector: settings.node_selection.selector(),
            branching: settings.branching_rule.strategy(),
            pool,
            tree,
            ids,
            incumbent: IncumbentTracker::new(),
            cuts: CutPool::new(),
            generator: GomoryGenerator::new(settings.gomory.clone()),
            cut_selector: Box::new(MostRecent),
            telemetry: Telemetry::disabled(),
            cancellation: None,
            stats: SearchStats {
                nodes_created: 1,
                ..SearchStats::default()
            },
            trace: Vec::new(),
            start_time: None,
            settings,
        })
    }

    /// Send events to `telemetry`.
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Stop early once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Replace the policy choosing which admitted cut is injected.
    pub fn with_cut_selector(mut self, selector: Box<dyn CutSelector>) -> Self {
        self.cut_selector = selector;
        self
    }

    /// Current incumbent.
    pub fn incumbent(&self) -> &IncumbentTracker {
        &self.incumbent
    }

    /// Counters so far.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Run until the pool is empty, the root is infeasible, or the run is
    /// cancelled.
    ///
    /// Hitting `max_iterations` is an error: the tree was not exhausted and
    /// the incumbent is not proven optimal.
    pub fn run(mut self) -> MilpResult<MilpSolution> {
        self.start_time = Some(Instant::now());
        log::info!(
            "Branch-and-cut: node selection {}, branching {}, cuts {:?}",
            self.selector.name(),
            self.branching.name(),
            self.settings.cut_strategy
        );

        let mut status = None;
        while !self.pool.is_empty() {
            if self.is_cancelled() {
                log::info!("Search cancelled after {} iterations", self.stats.iterations);
                status = Some(MilpStatus::Interrupted);
                break;
            }
            if self.stats.iterations >= self.settings.max_iterations {
                log::error!(
                    "Iteration limit {} reached with {} open nodes, best lower bound {}",
                    self.settings.max_iterations,
                    self.pool.len(),
                    self.incumbent.best_lower_bound
                );
                return Err(MilpError::IterationLimit {
                    limit: self.settings.max_iterations,
                    best_lower_bound: self.incumbent.best_lower_bound,
                });
            }

            let Some((node, _)) = self.pool.take(self.selector.as_ref()) else {
                break;
            };
            self.stats.iterations += 1;

            let id = node.id;
            let (fate, stop) = self.process(node)?;
            self.tree.mark(id, fate.prune_reason())?;
            self.stats.record(fate);
            self.trace.push((id, fate));

            if self.settings.log_freq > 0 && self.stats.iterations % self.settings.log_freq == 0 {
                self.log_progress();
            }
            if stop {
                break;
            }
        }

        let status = status.unwrap_or(if self.incumbent.has_incumbent() {
            MilpStatus::Optimal
        } else {
            MilpStatus::Infeasible
        });
        Ok(self.finish(status))
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Solve, classify and dispose of one node. The flag is set when the
    /// whole search has to stop.
    fn process(&mut self, node: Subproblem<R>) -> MilpResult<(NodeFate, bool)> {
        let Subproblem {
            id,
            parent,
            depth,
            is_root,
            model,
            ..
        } = node;
        let mut scratch = model;

        let status = scratch.solve();
        let lp_bound = scratch.objective_value();
        let reported = status.is_optimal().then_some(lp_bound);
        self.telemetry
            .emit(|| Event::new(id, parent, EventKind::Pregnant { lp_bound: reported }));

        let evaluation = evaluate_relaxation(
            &scratch,
            status,
            is_root,
            self.settings.integrality_scope,
            self.settings.int_feas_tol,
        );

        match evaluation.classification {
            Classification::Infeasible => {
                log::debug!("Node {} pruned: relaxation {:?}", id, status);
                self.telemetry
                    .emit(|| Event::new(id, parent, EventKind::Infeasible));
                if evaluation.terminates_search {
                    log::info!("Root relaxation is {:?}; no feasible solution", status);
                }
                Ok((NodeFate::PrunedInfeasible, evaluation.terminates_search))
            }

            Classification::Integral => {
                self.telemetry
                    .emit(|| Event::new(id, parent, EventKind::Integral { lp_bound }));
                let values: Vec<f64> = (0..scratch.num_variables())
                    .map(|j| scratch.variable_value(j))
                    .collect();
                let description = describe_solution(id, &scratch);
                if self.incumbent.update(id, &values, lp_bound, description) {
                    self.stats.incumbent_updates += 1;
                    log::info!("New incumbent at node {}: obj={}", id, lp_bound);
                } else {
                    log::debug!("Node {} integral at {} (no improvement)", id, lp_bound);
                }
                Ok((NodeFate::PrunedIntegral, is_root))
            }

            Classification::Fractional(violated) => {
                if self.incumbent.dominates(lp_bound, self.settings.prune_ties) {
                    log::debug!(
                        "Node {} fathomed: bound {} vs incumbent {}",
                        id,
                        lp_bound,
                        self.incumbent.best_lower_bound
                    );
                    self.telemetry
                        .emit(|| Event::new(id, parent, EventKind::Fathomed));
                    return Ok((NodeFate::PrunedByBound, false));
                }

                self.branch(id, parent, depth, scratch, lp_bound, &violated)?;
                Ok((NodeFate::Branched, false))
            }
        }
    }

    /// Replace a fractional node by its floor and ceil children.
    fn branch(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        depth: usize,
        mut scratch: R,
        lp_bound: f64,
        violated: &[FractionalVar],
    ) -> MilpResult<()> {
        let sum_of_fractional_parts: f64 = violated.iter().map(FractionalVar::fractional_part).sum();
        let violated_count = violated.len();
        self.telemetry.emit(|| {
            Event::new(
                id,
                parent,
                EventKind::Branched {
                    lp_bound,
                    sum_of_fractional_parts,
                    violated_count,
                },
            )
        });

        let pick = self
            .branching
            .select(violated)
            .and_then(|i| violated.get(i))
            .copied()
            .ok_or_else(|| {
                MilpError::Internal(format!("no branching variable chosen at node {}", id))
            })?;

        if self.settings.cuts_enabled() {
            self.add_cuts(id, &mut scratch)?;
        }

        let (down_id, up_id) = self.ids.next_pair();
        let down = BoundChange::down_branch(pick.index, pick.value);
        let up = BoundChange::up_branch(pick.index, pick.value);
        log::debug!(
            "Node {} branches on x[{}] = {}: node {} x <= {}, node {} x >= {}",
            id,
            pick.index,
            pick.value,
            down_id,
            down.bound,
            up_id,
            up.bound
        );

        for (child_id, change) in [(down_id, down), (up_id, up)] {
            let mut child = Subproblem::child(child_id, id, depth + 1, scratch.clone(), change)?;
            let bound = child.presolve_bound();
            self.tree.insert_child(id, child_id)?;
            let reported = bound.is_finite().then_some(bound);
            self.telemetry.emit(|| {
                Event::new(child_id, Some(id), EventKind::Candidate { lp_bound: reported })
            });
            self.pool.push(child);
            self.stats.nodes_created += 1;
        }
        Ok(())
    }

    /// Generate Gomory cuts on the solved `scratch`, admit a share of them
    /// and inject the selected one.
    fn add_cuts(&mut self, id: NodeId, scratch: &mut R) -> MilpResult<()> {
        let generated: Vec<_> = (0..scratch.num_variables())
            .filter(|&j| scratch.variable_kind(j).is_integral())
            .filter_map(|j| self.generator.generate(&*scratch, j, id))
            .collect();
        self.stats.cuts_generated += generated.len() as u64;

        let admit = ((self.settings.cut_fraction * generated.len() as f64).ceil() as usize)
            .min(generated.len());
        let start = self.cuts.len();
        for cut in generated.into_iter().take(admit) {
            self.cuts.add(cut);
        }
        let admitted = start..self.cuts.len();

        if let Some(chosen) = self.cut_selector.select(&self.cuts, admitted) {
            if let Some(row) = self.cuts.inject(scratch, Some(chosen))? {
                self.stats.cuts_injected += 1;
                log::debug!("Node {}: cut {} added as row {}", id, chosen, row);
            }
        }
        Ok(())
    }

    fn log_progress(&self) {
        log::info!(
            "Iteration {}: {} open nodes, {} created, incumbent {}, best open bound {}",
            self.stats.iterations,
            self.pool.len(),
            self.stats.nodes_created,
            self.incumbent.best_lower_bound,
            self.pool.best_bound()
        );
    }

    fn finish(mut self, status: MilpStatus) -> MilpSolution {
        self.stats.solve_time_ms = self
            .start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);
        log::info!(
            "Search finished ({:?}): {} iterations, {} nodes, objective {}",
            status,
            self.stats.iterations,
            self.stats.nodes_created,
            self.incumbent.best_lower_bound
        );

        MilpSolution {
            status,
            objective: self.incumbent.best_lower_bound,
            values: self.incumbent.solution.unwrap_or_default(),
            description: self.incumbent.description,
            incumbent_node: self.incumbent.node,
            tree: self.tree,
            stats: self.stats,
            trace: self.trace,
            bound_history: self.incumbent.history,
        }
    }
}
