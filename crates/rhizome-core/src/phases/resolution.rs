//! Phase 3: Two-wave module construction, import resolution, classification
//! and cross-linking.
//!
//! Wave 1 creates a module per discovered file and completes the project
//! tree. Each leaf's raw import identifiers are then resolved to candidate
//! routes: identifiers whose first segment names a sibling file or package
//! are rewritten into the importer's own package (local), everything else is
//! used verbatim (global). Wave 2 creates external modules for every route
//! the project tree does not claim and completes that tree. After
//! classification, a single linking pass maps every route to its module
//! entity.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::config::{Diagnostic, ModuleKind};
use crate::error::Result;
use crate::languages::builtins::BuiltinRegistry;
use crate::phases::extraction::ExtractedFile;
use crate::tree::{Module, ModuleForest, ModuleId, Origin};

/// Run the resolution phase over the extraction results.
pub fn run_resolution_phase(
    extracted: &[ExtractedFile],
    builtins: &BuiltinRegistry,
) -> Result<(ModuleForest, Vec<Diagnostic>)> {
    let mut forest = ModuleForest::new();
    let mut diagnostics = Vec::new();

    // O(1) sibling lookups: discovered files and every directory that holds
    // at least one of them (ancestors included).
    let file_set: HashSet<String> = extracted
        .iter()
        .map(|f| f.path.to_string_lossy().replace('\\', "/"))
        .collect();
    let dir_set: HashSet<String> = file_set
        .iter()
        .flat_map(|f| {
            let mut dirs = Vec::new();
            let mut parent = Path::new(f).parent();
            while let Some(p) = parent {
                let s = p.to_string_lossy().to_string();
                if s.is_empty() {
                    break;
                }
                dirs.push(s);
                parent = p.parent();
            }
            dirs
        })
        .collect();

    // Wave 1: project leaves, then tree completion
    let leaf_ids: Vec<ModuleId> = extracted
        .iter()
        .map(|f| forest.insert(Module::from_file(&f.path)))
        .collect();
    forest.complete(Origin::Project);

    // Resolve raw identifiers to candidate routes
    for (file, &id) in extracted.iter().zip(&leaf_ids) {
        let routes = resolve_routes(&forest, id, file, &file_set, &dir_set, builtins, &mut diagnostics);
        forest.set_import_routes(id, routes);
    }

    // Wave 2: external modules for every unclaimed route, sorted for
    // deterministic ids, then tree completion
    let external: BTreeSet<String> = leaf_ids
        .iter()
        .flat_map(|&id| forest.get(id).import_routes().iter().cloned())
        .filter(|route| forest.lookup_project(route).is_none())
        .collect();
    for route in &external {
        forest.insert(Module::from_route(route, Origin::External));
    }
    forest.complete(Origin::External);

    forest.classify(builtins);

    for kind in [ModuleKind::Project, ModuleKind::Builtin, ModuleKind::ThirdParty] {
        let count = forest.ids().filter(|&id| forest.get(id).kind() == kind).count();
        log::info!("found {count} {kind} modules");
    }

    forest.link_imports()?;

    Ok((forest, diagnostics))
}

/// Resolve one file's raw identifiers into candidate routes, in source order.
fn resolve_routes(
    forest: &ModuleForest,
    id: ModuleId,
    file: &ExtractedFile,
    file_set: &HashSet<String>,
    dir_set: &HashSet<String>,
    builtins: &BuiltinRegistry,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<String> {
    let module = forest.get(id);
    let parent_dir = file
        .path
        .parent()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();

    let mut routes = Vec::with_capacity(file.imports.len());
    for import in &file.imports {
        let target = &import.target_name;
        let first = target.split('.').next().unwrap_or(target);

        let sibling_file = join_rel(&parent_dir, &format!("{first}.py"));
        let sibling_pkg = join_rel(&parent_dir, first);
        let is_local = file_set.contains(&sibling_file) || dir_set.contains(&sibling_pkg);

        if is_local {
            if builtins.is_builtin(first) {
                log::warn!(
                    "module '{first}' (imported in {}) is both local and builtin",
                    module.route()
                );
                diagnostics.push(Diagnostic::AmbiguousImport {
                    importer: module.route().to_string(),
                    name: first.to_string(),
                });
            }
            // Substitute the importer's package prefix in front of the
            // identifier, producing a route inside the project tree.
            let mut segments: Vec<&str> = module
                .path()
                .iter()
                .take(module.path().len() - 1)
                .map(String::as_str)
                .collect();
            segments.extend(target.split('.'));
            routes.push(segments.join("."));
        } else {
            routes.push(target.clone());
        }
    }
    routes
}

fn join_rel(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
