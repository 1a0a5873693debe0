//! Phase 6: visibility filter and graph-description assembly.

use std::collections::{HashMap, HashSet};

use crate::config::{
    ClusterRecord, Diagnostic, EdgeRecord, GraphConfig, GraphDescription, ModuleKind, NodeRecord,
    PruneReport,
};
use crate::phases::clustering::ClusterAssignment;
use crate::tree::{ModuleForest, ModuleId};

/// Run the filter phase: decide which modules are emitted, redirect
/// summarized edges and assemble the final description.
pub fn run_filter_phase(
    config: &GraphConfig,
    forest: &ModuleForest,
    clusters: &ClusterAssignment,
    hidden: &HashSet<String>,
    prune: Option<PruneReport>,
    diagnostics: Vec<Diagnostic>,
) -> GraphDescription {
    let visible_order: Vec<ModuleId> = forest
        .ids()
        .filter(|&id| is_visible(config, forest, clusters, hidden, id))
        .collect();
    let visible: HashSet<ModuleId> = visible_order.iter().copied().collect();

    let nodes: Vec<NodeRecord> = visible_order
        .iter()
        .map(|&id| {
            let module = forest.get(id);
            NodeRecord {
                route: module.route().to_string(),
                name: module.name().to_string(),
                kind: module.kind(),
            }
        })
        .collect();

    // Import edges between visible endpoints, with summarized external
    // targets redirected to their root before the visibility check.
    let mut import_edges: Vec<EdgeRecord> = Vec::new();
    let mut seen: HashSet<EdgeRecord> = HashSet::new();
    if config.render_imports {
        for &id in &visible_order {
            let module = forest.get(id);
            if !module.is_project() {
                continue;
            }
            for &target in module.resolved_imports() {
                let target = if !forest.get(target).is_project() && config.summarize_external {
                    forest.root_of(target)
                } else {
                    target
                };
                if !visible.contains(&target) {
                    continue;
                }
                let edge = EdgeRecord {
                    from: module.route().to_string(),
                    to: forest.get(target).route().to_string(),
                };
                if seen.insert(edge.clone()) {
                    import_edges.push(edge);
                }
            }
        }
    }

    // Without visual nesting the tree structure is drawn as explicit
    // parent-containment edges between visible modules.
    let mut containment_edges: Vec<EdgeRecord> = Vec::new();
    if !config.effective_nested_clusters() {
        for &id in &visible_order {
            let module = forest.get(id);
            let Some(parent) = module.parent() else { continue };
            if !visible.contains(&parent) {
                continue;
            }
            containment_edges.push(EdgeRecord {
                from: forest.get(parent).route().to_string(),
                to: module.route().to_string(),
            });
        }
    }

    let cluster_records: Vec<ClusterRecord> = clusters
        .containers
        .iter()
        .map(|route| {
            let container = forest.lookup(route);
            let members: Vec<String> = visible_order
                .iter()
                .filter(|&&id| clusters.container_of(id) == container)
                .map(|&id| forest.get(id).route().to_string())
                .collect();
            let parent = container
                .and_then(|id| forest.get(id).parent())
                .and_then(|p| clusters.container_of(p))
                .map(|p| forest.get(p).route().to_string());
            ClusterRecord {
                route: route.clone(),
                label: route.clone(),
                members,
                parent,
            }
        })
        .collect();

    let mut stats: HashMap<String, serde_json::Value> = HashMap::new();
    for kind in [ModuleKind::Project, ModuleKind::Builtin, ModuleKind::ThirdParty] {
        let count = forest.ids().filter(|&id| forest.get(id).kind() == kind).count();
        stats.insert(format!("{kind}_modules"), serde_json::json!(count));
    }
    stats.insert("visible_nodes".to_string(), serde_json::json!(nodes.len()));
    stats.insert(
        "clusters".to_string(),
        serde_json::json!(cluster_records.len()),
    );
    stats.insert(
        "import_edges".to_string(),
        serde_json::json!(import_edges.len()),
    );
    stats.insert(
        "containment_edges".to_string(),
        serde_json::json!(containment_edges.len()),
    );
    stats.insert(
        "diagnostics".to_string(),
        serde_json::json!(diagnostics.len()),
    );

    GraphDescription {
        name: config.name.clone(),
        metadata: HashMap::new(),
        stats,
        nodes,
        clusters: cluster_records,
        import_edges,
        containment_edges,
        prune,
        diagnostics,
    }
}

fn is_visible(
    config: &GraphConfig,
    forest: &ModuleForest,
    clusters: &ClusterAssignment,
    hidden: &HashSet<String>,
    id: ModuleId,
) -> bool {
    let module = forest.get(id);
    match module.kind() {
        ModuleKind::Builtin if !config.show_builtin => return false,
        ModuleKind::ThirdParty if !config.show_3rdparty => return false,
        _ => {}
    }
    if hidden.contains(module.route()) {
        return false;
    }
    // External subtrees collapse to their root when summarizing
    if !module.is_project() && config.summarize_external && !module.is_root() {
        return false;
    }
    // Containers render as grouping boxes, not nodes
    if clusters.is_container(module.route()) {
        return false;
    }
    true
}
