//! The module entity: one node in the project or external tree.

use std::path::{Path, PathBuf};

use crate::config::ModuleKind;

/// Index of a module inside its [`crate::tree::ModuleForest`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) usize);

/// Which construction wave created a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Discovered source file or a package synthesized above one.
    Project,
    /// Imported identifier not claimed by the project wave.
    External,
}

/// A node in the module forest. Children are exclusively owned through the
/// arena; `parent` is a non-owning back-reference used only for upward
/// traversal.
#[derive(Debug, Clone)]
pub struct Module {
    path: Vec<String>,
    route: String,
    origin: Origin,
    kind: ModuleKind,
    pub(crate) parent: Option<ModuleId>,
    pub(crate) children: Vec<ModuleId>,
    /// Relative path of the originating file; None for synthesized package
    /// nodes and all external modules.
    source_file: Option<PathBuf>,
    /// Candidate routes produced by the import resolver, in source order.
    pub(crate) import_routes: Vec<String>,
    /// Resolved import targets; filled by the linking pass.
    pub(crate) resolved_imports: Vec<ModuleId>,
}

impl Module {
    /// Build a module from an ordered, non-empty segment sequence.
    pub fn from_segments(path: Vec<String>, origin: Origin) -> Self {
        debug_assert!(!path.is_empty(), "module path must be non-empty");
        let route = path.join(".");
        Self {
            path,
            route,
            origin,
            // External modules are reclassified once the builtin registry is
            // consulted; see ModuleForest::classify.
            kind: match origin {
                Origin::Project => ModuleKind::Project,
                Origin::External => ModuleKind::ThirdParty,
            },
            parent: None,
            children: Vec::new(),
            source_file: None,
            import_routes: Vec::new(),
            resolved_imports: Vec::new(),
        }
    }

    /// Build a module from a dotted route string.
    pub fn from_route(route: &str, origin: Origin) -> Self {
        Self::from_segments(route.split('.').map(String::from).collect(), origin)
    }

    /// Build a project leaf from a discovered file path relative to the
    /// project root. `pkg/c.py` becomes the path `["pkg", "c"]`.
    pub fn from_file(rel_path: &Path) -> Self {
        let mut segments: Vec<String> = rel_path
            .parent()
            .into_iter()
            .flat_map(|p| p.components())
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .filter(|s| !s.is_empty() && s != ".")
            .collect();
        let stem = rel_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        segments.push(stem);

        let mut module = Self::from_segments(segments, Origin::Project);
        module.source_file = Some(rel_path.to_path_buf());
        module
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Canonical dot-joined route; unique key within the module's tree.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// First path segment.
    pub fn root_segment(&self) -> &str {
        self.path.first().map(String::as_str).unwrap_or_default()
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: ModuleKind) {
        self.kind = kind;
    }

    pub fn is_project(&self) -> bool {
        self.origin == Origin::Project
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn parent(&self) -> Option<ModuleId> {
        self.parent
    }

    pub fn children(&self) -> &[ModuleId] {
        &self.children
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }

    pub fn import_routes(&self) -> &[String] {
        &self.import_routes
    }

    pub fn resolved_imports(&self) -> &[ModuleId] {
        &self.resolved_imports
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_project() {
            f.write_str(&self.route)
        } else {
            write!(f, "{} ({})", self.route, self.kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_route_splits_segments() {
        let m = Module::from_route("pkg.sub.mod", Origin::External);
        assert_eq!(m.path(), &["pkg", "sub", "mod"]);
        assert_eq!(m.route(), "pkg.sub.mod");
        assert_eq!(m.name(), "mod");
        assert_eq!(m.root_segment(), "pkg");
    }

    #[test]
    fn from_file_strips_extension() {
        let m = Module::from_file(Path::new("pkg/c.py"));
        assert_eq!(m.route(), "pkg.c");
        assert!(m.is_project());
        assert_eq!(m.source_file(), Some(Path::new("pkg/c.py")));
    }

    #[test]
    fn from_file_at_root() {
        let m = Module::from_file(Path::new("a.py"));
        assert_eq!(m.route(), "a");
        assert_eq!(m.path().len(), 1);
    }

    #[test]
    fn fresh_module_is_root_and_leaf() {
        let m = Module::from_route("numpy", Origin::External);
        assert!(m.is_root());
        assert!(m.is_leaf());
        assert!(!m.is_project());
    }
}
