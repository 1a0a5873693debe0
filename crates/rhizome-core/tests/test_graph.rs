//! Import graph and pruning integration tests.

mod common;

use std::collections::HashSet;

use common::*;
use rhizome_core::config::GraphConfig;
use rhizome_core::phases::pruning::run_prune_phase;

fn route_set(
    forest: &rhizome_core::tree::ModuleForest,
    ids: Vec<rhizome_core::tree::ModuleId>,
) -> HashSet<String> {
    ids.into_iter()
        .map(|id| forest.get(id).route().to_string())
        .collect()
}

#[test]
fn demo_project_graph_edges() {
    let (result, graph) = run_to_graph(fixture_config("demo_project"));
    // Leaf project modules: a, b, pkg.c
    assert_eq!(graph.node_count(), 3);
    // a -> b and pkg.c -> a; the numpy import is external and excluded
    assert_eq!(graph.edge_count(), 2);
    let pkg = result.forest.lookup_project("pkg").unwrap();
    assert!(!graph.contains(pkg), "package nodes stay out of the graph");
}

#[test]
fn demo_project_degree_sets() {
    let (result, graph) = run_to_graph(fixture_config("demo_project"));
    assert_eq!(
        route_set(&result.forest, graph.never_imported()),
        ["pkg.c".to_string()].into()
    );
    assert_eq!(
        route_set(&result.forest, graph.no_imports()),
        ["b".to_string()].into()
    );
}

#[test]
fn demo_project_dead_ends() {
    let (result, graph) = run_to_graph(fixture_config("demo_project"));
    // b terminates, a only reaches b, pkg.c only reaches a
    assert_eq!(
        route_set(&result.forest, graph.dead_ends()),
        ["a", "b", "pkg.c"].map(String::from).into()
    );
}

#[test]
fn prune_report_on_demo_project() {
    let config = GraphConfig {
        prune: true,
        ..fixture_config("demo_project")
    };
    let (result, graph) = run_to_graph(config.clone());
    let outcome = run_prune_phase(&config, &result.forest, &graph).unwrap();

    assert_eq!(outcome.report.never_imported, vec!["pkg.c"]);
    assert_eq!(outcome.report.no_imports, vec!["b"]);
    assert_eq!(outcome.report.dead_ends, vec!["a", "b", "pkg.c"]);
    // Without hide_dead_ends, only the degree sets are hidden
    assert_eq!(
        outcome.hidden,
        ["b", "pkg.c"].map(String::from).into()
    );
}

#[test]
fn pruning_monotonicity() {
    // The hide-set never contains a route outside the degree sets
    for fixture in ["demo_project", "layered"] {
        let config = GraphConfig {
            prune: true,
            ..fixture_config(fixture)
        };
        let (result, graph) = run_to_graph(config.clone());
        let outcome = run_prune_phase(&config, &result.forest, &graph).unwrap();
        let bound: HashSet<String> = outcome
            .report
            .never_imported
            .iter()
            .chain(&outcome.report.no_imports)
            .cloned()
            .collect();
        assert!(outcome.hidden.is_subset(&bound));
    }
}

#[test]
fn layered_graph_shape() {
    let (result, graph) = run_to_graph(fixture_config("layered"));
    let forest = &result.forest;

    // main -> api.server, main -> core.engine,
    // api.server -> core.__init__, api.server -> api.routes,
    // core.engine -> core.state, core.engine -> core.util.strings
    assert_eq!(graph.edge_count(), 6);
    assert_eq!(
        route_set(forest, graph.never_imported()),
        ["main".to_string()].into()
    );
}
