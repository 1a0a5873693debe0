//! Arena-backed module forest with per-wave route indexes.
//!
//! Modules are created in two waves — project (discovered files) and
//! external (unclaimed import routes) — then tree-completed, classified and
//! cross-linked. The project and external route indexes are disjoint key
//! spaces; lookups across both prefer the project side.

use std::collections::HashMap;

use crate::config::ModuleKind;
use crate::error::{GraphError, Result};
use crate::languages::builtins::BuiltinRegistry;
use crate::tree::module::{Module, ModuleId, Origin};

pub struct ModuleForest {
    modules: Vec<Module>,
    project_routes: HashMap<String, ModuleId>,
    external_routes: HashMap<String, ModuleId>,
}

impl ModuleForest {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            project_routes: HashMap::new(),
            external_routes: HashMap::new(),
        }
    }

    /// Insert a module and register its route in the wave's index. Returns
    /// the existing id if the route is already registered for that wave.
    pub fn insert(&mut self, module: Module) -> ModuleId {
        let index = match module.origin() {
            Origin::Project => &self.project_routes,
            Origin::External => &self.external_routes,
        };
        if let Some(&id) = index.get(module.route()) {
            return id;
        }
        let id = ModuleId(self.modules.len());
        let route = module.route().to_string();
        match module.origin() {
            Origin::Project => self.project_routes.insert(route, id),
            Origin::External => self.external_routes.insert(route, id),
        };
        self.modules.push(module);
        id
    }

    pub fn get(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    fn get_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.0]
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// All module ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ModuleId> {
        (0..self.modules.len()).map(ModuleId)
    }

    pub fn lookup_project(&self, route: &str) -> Option<ModuleId> {
        self.project_routes.get(route).copied()
    }

    pub fn lookup_external(&self, route: &str) -> Option<ModuleId> {
        self.external_routes.get(route).copied()
    }

    /// Merged lookup across both waves, preferring the project tree.
    pub fn lookup(&self, route: &str) -> Option<ModuleId> {
        self.lookup_project(route).or_else(|| self.lookup_external(route))
    }

    // -----------------------------------------------------------------------
    // Tree completion
    // -----------------------------------------------------------------------

    /// Synthesize every missing ancestor for the given wave, linking children
    /// under parents. For each leaf the prefix walk stops at the first
    /// already-registered route, so shared prefixes are never re-walked and
    /// running completion twice performs no work.
    pub fn complete(&mut self, wave: Origin) {
        let leaves: Vec<ModuleId> = self
            .ids()
            .filter(|&id| self.get(id).origin() == wave)
            .collect();

        for leaf in leaves {
            if self.get(leaf).parent.is_some() {
                continue;
            }
            let path = self.get(leaf).path().to_vec();
            let mut child = leaf;
            for len in (1..path.len()).rev() {
                let subroute = path[..len].join(".");
                let existing = match wave {
                    Origin::Project => self.project_routes.get(&subroute).copied(),
                    Origin::External => self.external_routes.get(&subroute).copied(),
                };
                if let Some(parent) = existing {
                    self.link(parent, child);
                    break;
                }
                let parent = self.insert(Module::from_segments(path[..len].to_vec(), wave));
                self.link(parent, child);
                child = parent;
            }
        }
    }

    fn link(&mut self, parent: ModuleId, child: ModuleId) {
        if self.get(child).parent.is_some() {
            return;
        }
        self.get_mut(child).parent = Some(parent);
        self.get_mut(parent).children.push(child);
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    /// Assign every module its kind. Stable for the module's lifetime since
    /// it derives only from immutable data.
    pub fn classify(&mut self, builtins: &BuiltinRegistry) {
        for i in 0..self.modules.len() {
            let kind = match self.modules[i].origin() {
                Origin::Project => ModuleKind::Project,
                Origin::External => {
                    if builtins.is_builtin(self.modules[i].root_segment()) {
                        ModuleKind::Builtin
                    } else {
                        ModuleKind::ThirdParty
                    }
                }
            };
            self.modules[i].set_kind(kind);
        }
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    /// Lazy walk along parent links from `id` to its root, inclusive of `id`.
    pub fn path_to_root(&self, id: ModuleId) -> PathToRoot<'_> {
        PathToRoot {
            forest: self,
            next: Some(id),
        }
    }

    /// Topmost ancestor of `id` (or `id` itself when it is a root).
    pub fn root_of(&self, id: ModuleId) -> ModuleId {
        self.path_to_root(id).last().unwrap_or(id)
    }

    /// Summarize a package to one of its leaves: the `__init__` child when
    /// present, otherwise the first leaf descendant in child order.
    pub fn representative_leaf(&self, id: ModuleId) -> ModuleId {
        let module = self.get(id);
        if module.is_leaf() {
            return id;
        }
        if let Some(&init) = module
            .children()
            .iter()
            .find(|&&c| self.get(c).name() == "__init__")
        {
            return self.representative_leaf(init);
        }
        self.representative_leaf(module.children()[0])
    }

    // -----------------------------------------------------------------------
    // Import plumbing
    // -----------------------------------------------------------------------

    pub fn set_import_routes(&mut self, id: ModuleId, routes: Vec<String>) {
        self.get_mut(id).import_routes = routes;
    }

    /// Map every candidate route to its module entity. Both waves exist by
    /// now, so a missing route is an internal invariant violation.
    pub fn link_imports(&mut self) -> Result<()> {
        for i in 0..self.modules.len() {
            if self.modules[i].import_routes.is_empty() {
                continue;
            }
            let importer = self.modules[i].route().to_string();
            let routes = self.modules[i].import_routes.clone();
            let mut resolved = Vec::with_capacity(routes.len());
            for route in &routes {
                let target = self.lookup(route).ok_or_else(|| GraphError::UnresolvedRoute {
                    route: route.clone(),
                    importer: importer.clone(),
                })?;
                let target = if self.get(target).is_project() {
                    self.representative_leaf(target)
                } else {
                    target
                };
                resolved.push(target);
            }
            self.modules[i].resolved_imports = resolved;
        }
        Ok(())
    }
}

impl Default for ModuleForest {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`ModuleForest::path_to_root`]. Finite and
/// restartable: constructing it again restarts the walk.
pub struct PathToRoot<'a> {
    forest: &'a ModuleForest,
    next: Option<ModuleId>,
}

impl Iterator for PathToRoot<'_> {
    type Item = ModuleId;

    fn next(&mut self) -> Option<ModuleId> {
        let current = self.next?;
        self.next = self.forest.get(current).parent();
        Some(current)
    }
}
