//! Phase 5: cluster-container selection and containment resolution.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::GraphConfig;
use crate::tree::{ModuleForest, ModuleId};

/// Which packages become grouping containers and which container, if any,
/// holds each module.
#[derive(Debug, Default)]
pub struct ClusterAssignment {
    /// Routes of the chosen containers, ordered.
    pub containers: BTreeSet<String>,
    /// Module -> containing cluster (the first container on its path to
    /// root, inclusive of itself). Absent or None means top level.
    pub containment: HashMap<ModuleId, Option<ModuleId>>,
}

impl ClusterAssignment {
    pub fn is_container(&self, route: &str) -> bool {
        self.containers.contains(route)
    }

    pub fn container_of(&self, id: ModuleId) -> Option<ModuleId> {
        self.containment.get(&id).copied().flatten()
    }
}

/// Run the cluster phase. A package is eligible iff clustering is enabled,
/// it is not hidden, it has at least `min_cluster_size` direct children and
/// (without nested clustering) it is a root. Under external summarization
/// only project packages are considered and external modules skip the
/// containment walk entirely.
pub fn run_cluster_phase(
    config: &GraphConfig,
    forest: &ModuleForest,
    hidden: &HashSet<String>,
) -> ClusterAssignment {
    let mut assignment = ClusterAssignment::default();
    if !config.use_clusters {
        return assignment;
    }
    let nested = config.effective_nested_clusters();

    for id in forest.ids() {
        let module = forest.get(id);
        if config.summarize_external && !module.is_project() {
            continue;
        }
        if module.is_leaf() {
            continue;
        }
        if !nested && !module.is_root() {
            continue;
        }
        if module.children().len() < config.min_cluster_size {
            continue;
        }
        if hidden.contains(module.route()) {
            continue;
        }
        assignment.containers.insert(module.route().to_string());
    }

    for id in forest.ids() {
        let module = forest.get(id);
        if config.summarize_external && !module.is_project() {
            continue;
        }
        let container = forest
            .path_to_root(id)
            .find(|&m| assignment.is_container(forest.get(m).route()));
        assignment.containment.insert(id, container);
    }

    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Module, Origin};
    use std::path::Path;

    fn project_forest(files: &[&str]) -> ModuleForest {
        let mut forest = ModuleForest::new();
        for f in files {
            forest.insert(Module::from_file(Path::new(f)));
        }
        forest.complete(Origin::Project);
        forest
    }

    #[test]
    fn package_meets_min_cluster_size() {
        let forest = project_forest(&["pkg/a.py", "pkg/b.py", "solo/x.py"]);
        let config = GraphConfig {
            min_cluster_size: 2,
            ..Default::default()
        };
        let assignment = run_cluster_phase(&config, &forest, &HashSet::new());
        assert!(assignment.is_container("pkg"));
        assert!(!assignment.is_container("solo"));
    }

    #[test]
    fn leaves_never_become_containers() {
        let forest = project_forest(&["pkg/a.py", "pkg/b.py"]);
        let config = GraphConfig {
            min_cluster_size: 1,
            ..Default::default()
        };
        let assignment = run_cluster_phase(&config, &forest, &HashSet::new());
        assert!(!assignment.is_container("pkg.a"));
        assert!(!assignment.is_container("pkg.b"));
    }

    #[test]
    fn flat_mode_keeps_only_root_containers() {
        let forest = project_forest(&["pkg/sub/a.py", "pkg/sub/b.py", "pkg/c.py"]);
        let config = GraphConfig {
            use_nested_clusters: false,
            min_cluster_size: 2,
            ..Default::default()
        };
        let assignment = run_cluster_phase(&config, &forest, &HashSet::new());
        assert!(assignment.is_container("pkg"));
        assert!(!assignment.is_container("pkg.sub"));
    }

    #[test]
    fn nested_mode_allows_inner_containers() {
        let forest = project_forest(&["pkg/sub/a.py", "pkg/sub/b.py", "pkg/c.py"]);
        let config = GraphConfig {
            min_cluster_size: 2,
            ..Default::default()
        };
        let assignment = run_cluster_phase(&config, &forest, &HashSet::new());
        assert!(assignment.is_container("pkg"));
        assert!(assignment.is_container("pkg.sub"));
    }

    #[test]
    fn hidden_packages_are_not_eligible() {
        let forest = project_forest(&["pkg/a.py", "pkg/b.py"]);
        let config = GraphConfig {
            min_cluster_size: 2,
            ..Default::default()
        };
        let hidden: HashSet<String> = ["pkg".to_string()].into();
        let assignment = run_cluster_phase(&config, &forest, &hidden);
        assert!(!assignment.is_container("pkg"));
    }

    #[test]
    fn containment_picks_nearest_container_ancestor() {
        let forest = project_forest(&["pkg/sub/a.py", "pkg/sub/b.py", "pkg/c.py"]);
        let config = GraphConfig {
            min_cluster_size: 2,
            ..Default::default()
        };
        let assignment = run_cluster_phase(&config, &forest, &HashSet::new());
        let a = forest.lookup_project("pkg.sub.a").unwrap();
        let sub = forest.lookup_project("pkg.sub").unwrap();
        let c = forest.lookup_project("pkg.c").unwrap();
        let pkg = forest.lookup_project("pkg").unwrap();
        assert_eq!(assignment.container_of(a), Some(sub));
        assert_eq!(assignment.container_of(c), Some(pkg));
    }

    #[test]
    fn containment_is_ancestor_or_self() {
        let forest = project_forest(&["pkg/sub/a.py", "pkg/sub/b.py", "pkg/c.py", "top.py"]);
        let config = GraphConfig {
            min_cluster_size: 1,
            ..Default::default()
        };
        let assignment = run_cluster_phase(&config, &forest, &HashSet::new());
        for id in forest.ids() {
            if let Some(container) = assignment.container_of(id) {
                assert!(
                    forest.path_to_root(id).any(|m| m == container),
                    "container of {} must lie on its path to root",
                    forest.get(id).route()
                );
            }
        }
    }

    #[test]
    fn summarized_externals_skip_containment() {
        let mut forest = project_forest(&["pkg/a.py", "pkg/b.py"]);
        forest.insert(Module::from_route("numpy.linalg", Origin::External));
        forest.insert(Module::from_route("numpy.fft", Origin::External));
        forest.complete(Origin::External);
        let config = GraphConfig {
            min_cluster_size: 2,
            ..Default::default()
        };
        let assignment = run_cluster_phase(&config, &forest, &HashSet::new());
        assert!(!assignment.is_container("numpy"));
        let numpy = forest.lookup_external("numpy").unwrap();
        assert_eq!(assignment.container_of(numpy), None);
    }
}
