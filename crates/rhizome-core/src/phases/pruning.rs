//! Phase 4: degree-based pruning and the dead-end fixed point.

use std::collections::HashSet;

use crate::config::{GraphConfig, PruneReport};
use crate::graph::ImportGraph;
use crate::tree::{ModuleForest, ModuleId};

/// Routes removed from the graph plus the diagnostic report.
pub struct PruneOutcome {
    pub hidden: HashSet<String>,
    pub report: PruneReport,
}

/// Run the pruning phase. Returns None when pruning is disabled. Only leaf
/// project modules ever enter the hide-set here; external visibility is
/// governed solely by summarization and the show_* toggles.
pub fn run_prune_phase(
    config: &GraphConfig,
    forest: &ModuleForest,
    graph: &ImportGraph,
) -> Option<PruneOutcome> {
    if !config.prune {
        return None;
    }

    let never_imported = sorted_routes(forest, graph.never_imported());
    let no_imports = sorted_routes(forest, graph.no_imports());
    let dead_ends = sorted_routes(forest, graph.dead_ends());

    log::info!(
        "prune: {} never imported, {} without imports, {} dead ends",
        never_imported.len(),
        no_imports.len(),
        dead_ends.len()
    );

    let mut hidden: HashSet<String> = never_imported.iter().cloned().collect();
    hidden.extend(no_imports.iter().cloned());
    if config.hide_dead_ends {
        hidden.extend(dead_ends.iter().cloned());
    }

    Some(PruneOutcome {
        hidden,
        report: PruneReport {
            never_imported,
            no_imports,
            dead_ends,
        },
    })
}

fn sorted_routes(forest: &ModuleForest, ids: Vec<ModuleId>) -> Vec<String> {
    let mut routes: Vec<String> = ids
        .into_iter()
        .map(|id| forest.get(id).route().to_string())
        .collect();
    routes.sort();
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Module, Origin};
    use std::path::Path;

    fn forest_with_edges(files: &[&str], edges: &[(&str, &str)]) -> (ModuleForest, ImportGraph) {
        let mut forest = ModuleForest::new();
        for f in files {
            forest.insert(Module::from_file(Path::new(&format!("{f}.py"))));
        }
        forest.complete(Origin::Project);
        for (from, to) in edges {
            let id = forest.lookup_project(from).unwrap();
            let mut routes = forest.get(id).import_routes().to_vec();
            routes.push((*to).to_string());
            forest.set_import_routes(id, routes);
        }
        forest.link_imports().unwrap();
        let graph = ImportGraph::build(&forest);
        (forest, graph)
    }

    #[test]
    fn disabled_prune_returns_none() {
        let (forest, graph) = forest_with_edges(&["a", "b"], &[("a", "b")]);
        let config = GraphConfig::default();
        assert!(run_prune_phase(&config, &forest, &graph).is_none());
    }

    #[test]
    fn hide_set_is_union_of_degree_sets() {
        let (forest, graph) = forest_with_edges(&["a", "b", "c"], &[("a", "b"), ("c", "a")]);
        let config = GraphConfig {
            prune: true,
            ..Default::default()
        };
        let outcome = run_prune_phase(&config, &forest, &graph).unwrap();
        // b has no imports, c is never imported
        assert_eq!(outcome.report.no_imports, vec!["b"]);
        assert_eq!(outcome.report.never_imported, vec!["c"]);
        assert!(outcome.hidden.contains("b"));
        assert!(outcome.hidden.contains("c"));
        assert!(!outcome.hidden.contains("a"));
    }

    #[test]
    fn dead_ends_are_diagnostic_by_default() {
        let (forest, graph) = forest_with_edges(&["a", "b"], &[("a", "b")]);
        let config = GraphConfig {
            prune: true,
            ..Default::default()
        };
        let outcome = run_prune_phase(&config, &forest, &graph).unwrap();
        // a is a dead end (its only successor is one), but stays visible
        assert_eq!(outcome.report.dead_ends, vec!["a", "b"]);
        assert!(!outcome.hidden.contains("a"));
    }

    #[test]
    fn hide_dead_ends_feeds_hide_set() {
        let (forest, graph) = forest_with_edges(&["a", "b", "c"], &[("a", "b"), ("c", "a")]);
        let config = GraphConfig {
            prune: true,
            hide_dead_ends: true,
            ..Default::default()
        };
        let outcome = run_prune_phase(&config, &forest, &graph).unwrap();
        assert!(outcome.hidden.contains("a"));
    }

    #[test]
    fn hide_set_is_bounded_by_degree_and_dead_end_sets() {
        let (forest, graph) = forest_with_edges(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("d", "a")],
        );
        let config = GraphConfig {
            prune: true,
            hide_dead_ends: true,
            ..Default::default()
        };
        let outcome = run_prune_phase(&config, &forest, &graph).unwrap();
        let bound: HashSet<String> = outcome
            .report
            .never_imported
            .iter()
            .chain(&outcome.report.no_imports)
            .chain(&outcome.report.dead_ends)
            .cloned()
            .collect();
        assert!(outcome.hidden.is_subset(&bound));
    }
}
