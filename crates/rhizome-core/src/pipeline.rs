//! Sequential phase orchestrator with timing.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;

use crate::config::{GraphConfig, GraphDescription};
use crate::error::Result;
use crate::graph::ImportGraph;
use crate::languages::builtins::BuiltinRegistry;
use crate::phases;

/// Phase labels for progress reporting.
const PHASE_LABELS: &[(&str, &str)] = &[
    ("discovery", "Scanning project files"),
    ("extraction", "Extracting imports"),
    ("resolution", "Building module trees"),
    ("graph", "Building import graph"),
    ("clusters", "Assigning clusters"),
    ("filter", "Filtering visible nodes"),
];

/// Progress callback type: (phase_name, label).
pub type ProgressCallback = Box<dyn FnMut(&str, &str)>;

/// Execute the six-phase pipeline and return the finished graph description.
pub fn run_pipeline(
    config: &GraphConfig,
    mut progress_callback: Option<ProgressCallback>,
) -> Result<GraphDescription> {
    let builtins = BuiltinRegistry::new();
    let mut timings: HashMap<String, f64> = HashMap::new();
    let total_start = Instant::now();

    let mut report = |name: &str| {
        if let Some(ref mut cb) = progress_callback {
            let label = PHASE_LABELS
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, l)| *l)
                .unwrap_or(name);
            cb(name, label);
        }
    };

    report("discovery");
    let start = Instant::now();
    let files = phases::discovery::run_discovery_phase(config)?;
    timings.insert("discovery".to_string(), start.elapsed().as_secs_f64());

    report("extraction");
    let start = Instant::now();
    let (extracted, mut diagnostics) = phases::extraction::run_extraction_phase(config, &files);
    timings.insert("extraction".to_string(), start.elapsed().as_secs_f64());

    report("resolution");
    let start = Instant::now();
    let (forest, resolution_diags) =
        phases::resolution::run_resolution_phase(&extracted, &builtins)?;
    diagnostics.extend(resolution_diags);
    timings.insert("resolution".to_string(), start.elapsed().as_secs_f64());

    report("graph");
    let start = Instant::now();
    let graph = ImportGraph::build(&forest);
    let prune_outcome = phases::pruning::run_prune_phase(config, &forest, &graph);
    timings.insert("graph".to_string(), start.elapsed().as_secs_f64());

    // The hide-set is fixed here, before cluster eligibility and before the
    // visibility pass: explicit hide routes plus prune-derived routes.
    let mut hidden: std::collections::HashSet<String> = config.hide.iter().cloned().collect();
    let prune_report = prune_outcome.map(|outcome| {
        hidden.extend(outcome.hidden);
        outcome.report
    });

    report("clusters");
    let start = Instant::now();
    let clusters = phases::clustering::run_cluster_phase(config, &forest, &hidden);
    timings.insert("clusters".to_string(), start.elapsed().as_secs_f64());

    report("filter");
    let start = Instant::now();
    let mut description = phases::filtering::run_filter_phase(
        config,
        &forest,
        &clusters,
        &hidden,
        prune_report,
        diagnostics,
    );
    timings.insert("filter".to_string(), start.elapsed().as_secs_f64());

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    description.metadata.insert(
        "project_root".to_string(),
        serde_json::Value::String(config.project_root.clone()),
    );
    description.metadata.insert(
        "analysed_at".to_string(),
        serde_json::Value::String(Utc::now().to_rfc3339()),
    );
    description.metadata.insert(
        "rhizome_version".to_string(),
        serde_json::Value::String(env!("CARGO_PKG_VERSION").to_string()),
    );
    description.metadata.insert(
        "analysis_duration_ms".to_string(),
        serde_json::json!((total_ms * 10.0).round() / 10.0),
    );
    description.metadata.insert(
        "phase_timings".to_string(),
        serde_json::to_value(&timings).unwrap_or_default(),
    );

    Ok(description)
}
