//! Graphviz DOT emission and output-file writers.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::path::Path;

use crate::config::{ClusterRecord, GraphDescription, ModuleKind, NodeRecord};

fn node_attrs(kind: ModuleKind) -> &'static str {
    match kind {
        ModuleKind::Project => "shape=rect, style=filled, fillcolor=\"#e0e0e0\"",
        ModuleKind::Builtin => "shape=rect, style=filled, fillcolor=\"lightblue\"",
        ModuleKind::ThirdParty => {
            "shape=rect, style=filled, fillcolor=\"black\", fontcolor=\"white\""
        }
    }
}

const IMPORT_EDGE_ATTRS: &str = "color=\"#404040\", penwidth=1";
const CONTAINMENT_EDGE_ATTRS: &str = "color=\"black\", penwidth=1, dir=back, arrowtail=ediamond";

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\\""))
}

fn indent(buf: &mut String, depth: usize) {
    for _ in 0..depth {
        buf.push_str("    ");
    }
}

fn write_node(buf: &mut String, node: &NodeRecord, depth: usize) {
    indent(buf, depth);
    let _ = writeln!(
        buf,
        "{} [label={}, {}];",
        quote(&node.route),
        quote(&node.name),
        node_attrs(node.kind)
    );
}

fn write_cluster(
    buf: &mut String,
    cluster: &ClusterRecord,
    node_by_route: &HashMap<&str, &NodeRecord>,
    children: &HashMap<Option<&str>, Vec<&ClusterRecord>>,
    depth: usize,
) {
    indent(buf, depth);
    let _ = writeln!(buf, "subgraph {} {{", quote(&format!("cluster_{}", cluster.route)));
    indent(buf, depth + 1);
    let _ = writeln!(buf, "label={};", quote(&cluster.label));
    indent(buf, depth + 1);
    buf.push_str("style=filled;\n");
    indent(buf, depth + 1);
    buf.push_str("fillcolor=\"#f0f0f0\";\n");

    for route in &cluster.members {
        if let Some(node) = node_by_route.get(route.as_str()) {
            write_node(buf, node, depth + 1);
        }
    }
    if let Some(nested) = children.get(&Some(cluster.route.as_str())) {
        for inner in nested {
            write_cluster(buf, inner, node_by_route, children, depth + 1);
        }
    }

    indent(buf, depth);
    buf.push_str("}\n");
}

/// Render a graph description as Graphviz DOT. Output is deterministic for
/// a given description.
pub fn build_dot(desc: &GraphDescription) -> String {
    let mut buf = String::new();
    let _ = writeln!(
        buf,
        "// {} (generated by rhizome {})",
        desc.name,
        env!("CARGO_PKG_VERSION")
    );
    let _ = writeln!(buf, "digraph {} {{", quote(&desc.name));

    let node_by_route: HashMap<&str, &NodeRecord> =
        desc.nodes.iter().map(|n| (n.route.as_str(), n)).collect();

    // Which cluster each visible node belongs to
    let cluster_of: HashMap<&str, &str> = desc
        .clusters
        .iter()
        .flat_map(|c| c.members.iter().map(move |m| (m.as_str(), c.route.as_str())))
        .collect();

    // Cluster nesting
    let mut children: HashMap<Option<&str>, Vec<&ClusterRecord>> = HashMap::new();
    for cluster in &desc.clusters {
        children
            .entry(cluster.parent.as_deref())
            .or_default()
            .push(cluster);
    }

    // Top-level nodes, then top-level clusters (each recursing into nested
    // clusters and their member nodes)
    for node in &desc.nodes {
        if !cluster_of.contains_key(node.route.as_str()) {
            write_node(&mut buf, node, 1);
        }
    }
    if let Some(top) = children.get(&None) {
        for cluster in top {
            write_cluster(&mut buf, cluster, &node_by_route, &children, 1);
        }
    }

    for edge in &desc.containment_edges {
        indent(&mut buf, 1);
        let _ = writeln!(
            buf,
            "{} -> {} [{}];",
            quote(&edge.from),
            quote(&edge.to),
            CONTAINMENT_EDGE_ATTRS
        );
    }
    for edge in &desc.import_edges {
        indent(&mut buf, 1);
        let _ = writeln!(
            buf,
            "{} -> {} [{}];",
            quote(&edge.from),
            quote(&edge.to),
            IMPORT_EDGE_ATTRS
        );
    }

    buf.push_str("}\n");
    buf
}

/// Write the DOT rendering to a file, creating parent directories.
pub fn write_dot(desc: &GraphDescription, output_path: &str) -> std::io::Result<()> {
    if let Some(parent) = Path::new(output_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, build_dot(desc))
}

/// Write the serialized graph description to a JSON file.
pub fn write_json(desc: &GraphDescription, output_path: &str) -> std::io::Result<()> {
    if let Some(parent) = Path::new(output_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(desc).map_err(std::io::Error::other)?;
    std::fs::write(output_path, json)
}
