//! Core data types and configuration for Rhizome analysis.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classification of a module.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    #[serde(rename = "project")]
    Project,
    #[serde(rename = "builtin")]
    Builtin,
    #[serde(rename = "3rdparty")]
    ThirdParty,
}

impl ModuleKind {
    /// Returns the string form used in output and node styling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Builtin => "builtin",
            Self::ThirdParty => "3rdparty",
        }
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw import statement extracted from source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportStatement {
    pub file: String,
    pub statement: String,
    pub target_name: String,
    pub line: usize,
}

/// Non-fatal findings accumulated during a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A single file could not be read or parsed; its module is kept with an
    /// empty import list.
    ExtractionFailure { file: String, message: String },
    /// An import's first segment matches both a local sibling and a builtin
    /// name; resolved in favor of the local interpretation.
    AmbiguousImport { importer: String, name: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExtractionFailure { file, message } => {
                write!(f, "failed to extract imports from {file}: {message}")
            }
            Self::AmbiguousImport { importer, name } => {
                write!(f, "module '{name}' (imported in {importer}) is both local and builtin")
            }
        }
    }
}

/// Configuration for a graph-construction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub project_root: String,
    /// Name given to the output graph.
    #[serde(default = "default_name")]
    pub name: String,
    /// Hide leaf modules that are never imported or have no imports.
    #[serde(default)]
    pub prune: bool,
    /// Also feed the dead-end fixed point into the hide-set. Without this
    /// the dead-end set is purely diagnostic.
    #[serde(default)]
    pub hide_dead_ends: bool,
    /// Render imports as edges at all.
    #[serde(default = "default_true")]
    pub render_imports: bool,
    #[serde(default = "default_true")]
    pub show_3rdparty: bool,
    #[serde(default)]
    pub show_builtin: bool,
    /// Collapse external subtrees to their root module.
    #[serde(default = "default_true")]
    pub summarize_external: bool,
    /// Group submodules of the same package into bordered clusters.
    #[serde(default = "default_true")]
    pub use_clusters: bool,
    /// Allow clusters inside clusters; without this only root packages
    /// become containers.
    #[serde(default = "default_true")]
    pub use_nested_clusters: bool,
    /// Minimum number of direct children for a package to become a cluster.
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,
    /// Gitignore-style patterns for files to skip during discovery.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Routes to exclude from the rendered graph.
    #[serde(default)]
    pub hide: Vec<String>,
}

fn default_name() -> String {
    "rhizome_graph".to_string()
}
fn default_true() -> bool {
    true
}
fn default_min_cluster_size() -> usize {
    2
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            project_root: String::new(),
            name: default_name(),
            prune: false,
            hide_dead_ends: false,
            render_imports: true,
            show_3rdparty: true,
            show_builtin: false,
            summarize_external: true,
            use_clusters: true,
            use_nested_clusters: true,
            min_cluster_size: default_min_cluster_size(),
            ignore: Vec::new(),
            hide: Vec::new(),
        }
    }
}

impl GraphConfig {
    /// Nesting is only meaningful while clustering is enabled.
    pub fn effective_nested_clusters(&self) -> bool {
        self.use_clusters && self.use_nested_clusters
    }
}

/// A visible module in the output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub route: String,
    pub name: String,
    pub kind: ModuleKind,
}

/// A cluster container in the output. `members` holds the routes of all
/// visible modules whose containment walk lands on this container; `parent`
/// links to the enclosing container for nested rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub route: String,
    pub label: String,
    pub members: Vec<String>,
    pub parent: Option<String>,
}

/// A directed edge between two visible routes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,
}

/// Routes removed or flagged by the pruning pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PruneReport {
    pub never_imported: Vec<String>,
    pub no_imports: Vec<String>,
    pub dead_ends: Vec<String>,
}

/// The finished graph description handed to rendering collaborators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub stats: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub clusters: Vec<ClusterRecord>,
    #[serde(default)]
    pub import_edges: Vec<EdgeRecord>,
    #[serde(default)]
    pub containment_edges: Vec<EdgeRecord>,
    #[serde(default)]
    pub prune: Option<PruneReport>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}
