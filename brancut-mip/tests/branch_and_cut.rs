//! End-to-end runs of the branch-and-cut engine on small models with known
//! search trees.

use std::collections::HashSet;

use brancut_lp::{LpModel, SimplexSolver, VarKind};
use brancut_mip::cuts::GomorySettings;
use brancut_mip::{
    solve_milp, BranchAndCut, BranchingRule, CancellationToken, ConfigError, MilpError,
    MilpSettings, MilpStatus, NodeSelection, PruneReason,
};
use brancut_mip::NodeFate::{
    Branched as B, PrunedByBound as P, PrunedInfeasible as F, PrunedIntegral as I,
};

const TOL: f64 = 1e-9;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// maximize 5x + 4y  s.t.  6x + 4y <= 24,  x + 2y <= 6,  x, y >= 0 integer
fn knapsack() -> LpModel {
    let mut model = LpModel::new(vec![5.0, 4.0], vec![VarKind::Integer; 2]).unwrap();
    model.add_le(&[(0, 6.0), (1, 4.0)], 24.0).unwrap();
    model.add_le(&[(0, 1.0), (1, 2.0)], 6.0).unwrap();
    model
}

/// maximize 3x + 2y  s.t.  x + y <= 4,  0 <= x <= 3: LP optimum (3, 1) is integral.
fn integral_root() -> LpModel {
    let mut model = LpModel::new(vec![3.0, 2.0], vec![VarKind::Integer; 2]).unwrap();
    model.add_le(&[(0, 1.0), (1, 1.0)], 4.0).unwrap();
    model.set_col_bounds(0, 0.0, 3.0).unwrap();
    model
}

/// maximize 4x + y  s.t.  4x + 4y <= 7,  0 <= x <= 1
///
/// Root (1, 0.75) -> 4.75 branches on y. The floor child (1, 0) -> 4 is the
/// incumbent; the ceil child (0.75, 1) -> 4 ties it exactly.
fn tied_bound() -> LpModel {
    let mut model = LpModel::new(vec![4.0, 1.0], vec![VarKind::Integer; 2]).unwrap();
    model.add_le(&[(0, 4.0), (1, 4.0)], 7.0).unwrap();
    model.set_col_bounds(0, 0.0, 1.0).unwrap();
    model
}

/// 2y - 2x = 1 has no integer solution, but every relaxation stays feasible.
fn endless() -> LpModel {
    let mut model = LpModel::new(vec![1.0, 1.0], vec![VarKind::Integer; 2]).unwrap();
    model.add_eq(&[(0, -2.0), (1, 2.0)], 1.0).unwrap();
    model.set_col_bounds(0, 0.0, 1e6).unwrap();
    model.set_col_bounds(1, 0.0, 1e6).unwrap();
    model
}

#[test]
fn test_depth_first_exact_tree() {
    init_logging();

    let solution = solve_milp(knapsack(), &MilpSettings::default()).unwrap();

    assert_eq!(solution.status, MilpStatus::Optimal);
    assert!((solution.objective - 20.0).abs() < TOL);
    assert_eq!(solution.values, vec![4.0, 0.0]);
    assert_eq!(solution.description.as_deref(), Some("[5] 5*(x[0] = 4) = 20"));
    assert_eq!(solution.incumbent_node, Some(5));
    assert_eq!(solution.trace, vec![(1, B), (2, B), (3, I), (4, I), (5, I)]);
    assert_eq!(solution.bound_history, vec![18.0, 19.0, 20.0]);

    assert_eq!(solution.stats.iterations, 5);
    assert_eq!(solution.stats.nodes_created, 5);
    assert_eq!(solution.stats.branched, 2);
    assert_eq!(solution.stats.pruned_integral, 3);
    assert_eq!(solution.stats.incumbent_updates, 3);
}

#[test]
fn test_best_bound_exact_tree() {
    init_logging();

    let settings = MilpSettings::default().with_node_selection(NodeSelection::BestBound);
    let solution = solve_milp(knapsack(), &settings).unwrap();

    assert_eq!(solution.status, MilpStatus::Optimal);
    assert!((solution.objective - 20.0).abs() < TOL);
    assert_eq!(solution.trace, vec![(1, B), (2, B), (5, I), (4, I), (3, I)]);
    assert_eq!(solution.bound_history, vec![20.0]);
    assert_eq!(solution.incumbent_node, Some(5));
}

#[test]
fn test_tree_rendering() {
    let solution = solve_milp(knapsack(), &MilpSettings::default()).unwrap();
    let expected = "[I = Integral node, F = Infeasible node, B = Worse bound node]\n\
                    -1\n \
                    -2\n  \
                    -4 I\n  \
                    -5 I\n \
                    -3 I\n";
    assert_eq!(solution.tree.render(), expected);
}

#[test]
fn test_integral_root_stops_after_one_node() {
    init_logging();

    let solution = solve_milp(integral_root(), &MilpSettings::default()).unwrap();

    assert_eq!(solution.status, MilpStatus::Optimal);
    assert!((solution.objective - 11.0).abs() < TOL);
    assert_eq!(solution.values, vec![3.0, 1.0]);
    assert_eq!(
        solution.description.as_deref(),
        Some("[1] 3*(x[0] = 3) + 2*(x[1] = 1) = 11")
    );
    assert_eq!(solution.trace, vec![(1, I)]);
    assert_eq!(solution.tree.len(), 1);
}

#[test]
fn test_infeasible_root() {
    init_logging();

    let mut model = LpModel::new(vec![1.0, 1.0], vec![VarKind::Integer; 2]).unwrap();
    model.add_ge(&[(0, 1.0), (1, 1.0)], 5.0).unwrap();
    model.add_le(&[(0, 1.0), (1, 1.0)], 3.0).unwrap();

    let solution = solve_milp(model, &MilpSettings::default()).unwrap();

    assert_eq!(solution.status, MilpStatus::Infeasible);
    assert!(!solution.has_solution());
    assert_eq!(solution.objective, f64::NEG_INFINITY);
    assert_eq!(solution.description, None);
    assert_eq!(solution.trace, vec![(1, F)]);
    assert_eq!(solution.tree.root().map(|n| n.prune), Some(PruneReason::PrunedInfeasible));
}

#[test]
fn test_iteration_cap_is_fatal() {
    init_logging();

    let settings = MilpSettings::default().with_max_iterations(25);
    match solve_milp(endless(), &settings) {
        Err(MilpError::IterationLimit { limit, best_lower_bound }) => {
            assert_eq!(limit, 25);
            assert_eq!(best_lower_bound, f64::NEG_INFINITY);
        }
        other => panic!("expected the iteration cap, got {:?}", other.map(|s| s.status)),
    }
}

#[test]
fn test_strategy_determinism() {
    for rule in [
        BranchingRule::InOrder,
        BranchingRule::ClosestToHalf,
        BranchingRule::GreatestObjectiveImpact,
    ] {
        for selection in [NodeSelection::DepthFirst, NodeSelection::BestBound] {
            let settings = MilpSettings::default()
                .with_branching_rule(rule)
                .with_node_selection(selection);
            let first = solve_milp(knapsack(), &settings).unwrap();
            let second = solve_milp(knapsack(), &settings).unwrap();

            assert_eq!(first.trace, second.trace, "{:?} / {:?}", rule, selection);
            assert!((first.objective - 20.0).abs() < 1e-6);
        }
    }
}

#[test]
fn test_tree_completeness_and_pruning_finality() {
    let settings = MilpSettings::default().with_node_selection(NodeSelection::BestBound);
    let solution = solve_milp(knapsack(), &settings).unwrap();
    let tree = &solution.tree;

    assert_eq!(tree.len() as u64, solution.stats.nodes_created);
    for node in tree.iter() {
        match node.parent {
            None => assert_eq!(node.id, 1),
            Some(parent) => assert!(tree.get(parent).unwrap().children.contains(&node.id)),
        }
    }

    // Every node is processed at most once, and its recorded reason matches.
    let mut seen = HashSet::new();
    for &(id, fate) in &solution.trace {
        assert!(seen.insert(id), "node {} processed twice", id);
        let node = tree.get(id).unwrap();
        assert_eq!(node.prune, fate.prune_reason());
        if fate == B {
            assert_eq!(node.children.len(), 2);
        } else {
            assert!(node.children.is_empty());
        }
    }
}

#[test]
fn test_bound_history_is_monotone() {
    let solution = solve_milp(knapsack(), &MilpSettings::default()).unwrap();
    assert!(solution.bound_history.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(solution.bound_history.last().copied(), Some(solution.objective));
}

#[test]
fn test_gomory_cuts_reach_same_optimum() {
    init_logging();

    for selection in [NodeSelection::DepthFirst, NodeSelection::BestBound] {
        let settings = MilpSettings::default()
            .with_node_selection(selection)
            .with_gomory_cuts(1.0);
        let solution = solve_milp(knapsack(), &settings).unwrap();

        assert_eq!(solution.status, MilpStatus::Optimal);
        assert!((solution.objective - 20.0).abs() < 1e-6);
        assert!(solution.stats.cuts_generated >= 1);
        assert!(solution.stats.cuts_injected >= 1);
        assert!(solution.stats.cuts_injected <= solution.stats.branched);
    }
}

#[test]
fn test_zero_cut_fraction_admits_nothing() {
    let settings = MilpSettings::default().with_gomory_cuts(0.0);
    let solution = solve_milp(knapsack(), &settings).unwrap();

    assert!(solution.stats.cuts_generated >= 1);
    assert_eq!(solution.stats.cuts_injected, 0);
    assert_eq!(solution.trace, vec![(1, B), (2, B), (3, I), (4, I), (5, I)]);
}

#[test]
fn test_gomory_settings_reach_the_generator() {
    // Every tableau row of the knapsack has an entry far above this cap.
    let settings = MilpSettings::default()
        .with_gomory_cuts(1.0)
        .with_gomory_settings(GomorySettings {
            max_coefficient: 1e-9,
            ..GomorySettings::default()
        });
    let solution = solve_milp(knapsack(), &settings).unwrap();

    assert_eq!(solution.stats.cuts_generated, 0);
    assert_eq!(solution.stats.cuts_injected, 0);
    assert_eq!(solution.trace, vec![(1, B), (2, B), (3, I), (4, I), (5, I)]);
}

#[test]
fn test_binary_knapsack_with_cuts() {
    // maximize 10a + 6b + 4c  s.t.  5a + 4b + 3c <= 8, binary
    let mut model = LpModel::new(vec![10.0, 6.0, 4.0], vec![VarKind::Binary; 3]).unwrap();
    model
        .add_le(&[(0, 5.0), (1, 4.0), (2, 3.0)], 8.0)
        .unwrap();

    let settings = MilpSettings::default()
        .with_node_selection(NodeSelection::BestBound)
        .with_gomory_cuts(0.5);
    let solution = solve_milp(model, &settings).unwrap();

    assert_eq!(solution.status, MilpStatus::Optimal);
    assert!((solution.objective - 14.0).abs() < 1e-6);
    assert!((solution.values[0] - 1.0).abs() < 1e-6);
    assert!(solution.values[1].abs() < 1e-6);
    assert!((solution.values[2] - 1.0).abs() < 1e-6);
}

#[test]
fn test_tied_bound_is_fathomed() {
    init_logging();

    for selection in [NodeSelection::DepthFirst, NodeSelection::BestBound] {
        let settings = MilpSettings::default().with_node_selection(selection);
        let solution = solve_milp(tied_bound(), &settings).unwrap();

        assert_eq!(solution.status, MilpStatus::Optimal);
        assert_eq!(solution.objective, 4.0);
        assert_eq!(solution.values, vec![1.0, 0.0]);
        assert_eq!(solution.description.as_deref(), Some("[2] 4*(x[0] = 1) = 4"));
        assert_eq!(solution.trace, vec![(1, B), (2, I), (3, P)]);
        assert_eq!(solution.stats.pruned_by_bound, 1);
        assert_eq!(solution.stats.nodes_created, 3);
    }
}

#[test]
fn test_keeping_ties_explores_the_tied_node() {
    init_logging();

    let settings = MilpSettings::default().with_prune_ties(false);
    let solution = solve_milp(tied_bound(), &settings).unwrap();

    assert_eq!(solution.status, MilpStatus::Optimal);
    assert_eq!(solution.objective, 4.0);
    assert_eq!(solution.incumbent_node, Some(2));
    assert_eq!(solution.bound_history, vec![4.0]);

    // Node 3 branches on x = 0.75: x <= 0 drops to 1.75 and is fathomed,
    // x >= 1 forces 4y <= 3 against y >= 1.
    assert_eq!(solution.trace, vec![(1, B), (2, I), (3, B), (4, P), (5, F)]);

    let stats = &solution.stats;
    assert_eq!(stats.iterations, 5);
    assert_eq!(stats.nodes_created, 5);
    assert_eq!(stats.branched, 2);
    assert_eq!(stats.pruned_integral, 1);
    assert_eq!(stats.pruned_by_bound, 1);
    assert_eq!(stats.pruned_infeasible, 1);

    assert_eq!(solution.tree.get(4).map(|n| n.prune), Some(PruneReason::PrunedByBound));
    assert_eq!(solution.tree.get(5).map(|n| n.prune), Some(PruneReason::PrunedInfeasible));
    let expected = "[I = Integral node, F = Infeasible node, B = Worse bound node]\n\
                    -1\n \
                    -2 I\n \
                    -3\n  \
                    -4 B\n  \
                    -5 F\n";
    assert_eq!(solution.tree.render(), expected);
}

#[test]
fn test_cancelled_run_is_interrupted() {
    let token = CancellationToken::new();
    token.cancel();

    let engine = BranchAndCut::new(SimplexSolver::from(knapsack()), MilpSettings::default())
        .unwrap()
        .with_cancellation(token);
    let solution = engine.run().unwrap();

    assert_eq!(solution.status, MilpStatus::Interrupted);
    assert!(solution.trace.is_empty());
    assert!(!solution.has_solution());
    assert_eq!(solution.tree.len(), 1);
}

#[test]
fn test_configuration_errors_before_search() {
    let settings = MilpSettings::default().with_gomory_cuts(1.5);
    assert!(matches!(
        solve_milp(knapsack(), &settings),
        Err(MilpError::Config(ConfigError::CutFraction(f))) if f == 1.5
    ));

    let settings = MilpSettings::default().with_max_iterations(0);
    assert!(matches!(
        BranchAndCut::new(SimplexSolver::from(knapsack()), settings),
        Err(MilpError::Config(ConfigError::ZeroIterationCap))
    ));

    assert!(matches!(
        "sideways".parse::<NodeSelection>(),
        Err(ConfigError::UnknownNodeSelection(_))
    ));
    assert!(matches!(
        "7".parse::<BranchingRule>(),
        Err(ConfigError::UnknownBranchingRule(_))
    ));
}

#[test]
fn test_invalid_model_rejected() {
    let mut model = knapsack();
    model.objective[1] = f64::NAN;
    assert!(matches!(
        solve_milp(model, &MilpSettings::default()),
        Err(MilpError::InvalidModel(_))
    ));
}
