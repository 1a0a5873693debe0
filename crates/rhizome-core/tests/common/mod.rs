//! Shared test helpers for integration tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rhizome_core::config::{Diagnostic, GraphConfig, GraphDescription};
use rhizome_core::graph::ImportGraph;
use rhizome_core::languages::builtins::BuiltinRegistry;
use rhizome_core::phases;
use rhizome_core::tree::ModuleForest;

// ---------------------------------------------------------------------------
// Fixture path resolution
// ---------------------------------------------------------------------------

/// Resolve `tests/fixtures/{name}` relative to the workspace root.
pub fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .join("../../tests/fixtures")
        .join(name)
        .canonicalize()
        .unwrap_or_else(|_| {
            Path::new(manifest_dir)
                .join("../../tests/fixtures")
                .join(name)
        })
}

/// Config pointing at a fixture directory.
pub fn fixture_config(name: &str) -> GraphConfig {
    GraphConfig {
        project_root: fixture_path(name).to_string_lossy().to_string(),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Phase runners
// ---------------------------------------------------------------------------

pub struct ForestResult {
    pub forest: ModuleForest,
    pub diagnostics: Vec<Diagnostic>,
    pub config: GraphConfig,
}

/// Run discovery + extraction + resolution on a fixture directory.
pub fn run_to_forest(config: GraphConfig) -> ForestResult {
    let files = phases::discovery::run_discovery_phase(&config).expect("discovery failed");
    let (extracted, mut diagnostics) = phases::extraction::run_extraction_phase(&config, &files);
    let (forest, resolution_diags) =
        phases::resolution::run_resolution_phase(&extracted, &BuiltinRegistry::new())
            .expect("resolution failed");
    diagnostics.extend(resolution_diags);
    ForestResult {
        forest,
        diagnostics,
        config,
    }
}

/// Run the forest phases and build the leaf import graph.
pub fn run_to_graph(config: GraphConfig) -> (ForestResult, ImportGraph) {
    let result = run_to_forest(config);
    let graph = ImportGraph::build(&result.forest);
    (result, graph)
}

/// Run the whole pipeline on a fixture with the given config.
pub fn run_full(config: GraphConfig) -> GraphDescription {
    rhizome_core::pipeline::run_pipeline(&config, None).expect("pipeline failed")
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

/// All routes in the forest, both waves.
pub fn all_routes(forest: &ModuleForest) -> HashSet<String> {
    forest
        .ids()
        .map(|id| forest.get(id).route().to_string())
        .collect()
}

/// Visible node routes of a description.
pub fn node_routes(desc: &GraphDescription) -> HashSet<String> {
    desc.nodes.iter().map(|n| n.route.clone()).collect()
}

/// Import edges as (from, to) pairs.
pub fn edge_pairs(desc: &GraphDescription) -> HashSet<(String, String)> {
    desc.import_edges
        .iter()
        .map(|e| (e.from.clone(), e.to.clone()))
        .collect()
}
