//! Phase 1: Walk the project tree and collect Python source files.

use std::path::{Path, PathBuf};

use ignore::gitignore::GitignoreBuilder;
use walkdir::WalkDir;

use crate::config::GraphConfig;
use crate::error::{GraphError, Result};

/// Directory names never descended into.
const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    "__pycache__",
    ".venv",
    "venv",
    ".env",
    "node_modules",
    ".mypy_cache",
    ".pytest_cache",
    ".tox",
    ".eggs",
    "build",
    "dist",
    ".idea",
    ".vscode",
];

/// Run the discovery phase: return the relative paths of all Python files
/// under the project root, filtered by the configured ignore patterns,
/// sorted for determinism.
pub fn run_discovery_phase(config: &GraphConfig) -> Result<Vec<PathBuf>> {
    let root = Path::new(&config.project_root);

    let mut builder = GitignoreBuilder::new(root);
    for pattern in &config.ignore {
        builder
            .add_line(None, pattern)
            .map_err(|source| GraphError::IgnorePattern {
                pattern: pattern.clone(),
                source,
            })?;
    }
    let ignore_set = builder.build().map_err(|source| GraphError::IgnorePattern {
        pattern: config.ignore.join(", "),
        source,
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            if DEFAULT_EXCLUDES.iter().any(|p| name == *p) {
                return false;
            }
            // Skip hidden directories, but not the root itself
            if e.depth() > 0 && e.file_type().is_dir() && name.starts_with('.') {
                return false;
            }
            true
        })
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().map(|e| e != "py").unwrap_or(true) {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        if rel.is_empty() {
            continue;
        }
        if ignore_set.matched(&rel, false).is_ignore() {
            continue;
        }
        paths.push(PathBuf::from(rel));
    }

    paths.sort();

    if paths.is_empty() {
        return Err(GraphError::NoSourceFiles(config.project_root.clone()));
    }

    log::info!("discovered {} Python files", paths.len());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    fn config_for(root: &Path, ignore: &[&str]) -> GraphConfig {
        GraphConfig {
            project_root: root.to_string_lossy().to_string(),
            ignore: ignore.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn discovers_nested_python_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.py");
        touch(dir.path(), "pkg/c.py");
        touch(dir.path(), "README.md");

        let paths = run_discovery_phase(&config_for(dir.path(), &[])).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.py"), PathBuf::from("pkg/c.py")]);
    }

    #[test]
    fn skips_default_excludes_and_hidden_dirs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.py");
        touch(dir.path(), "__pycache__/a.cpython-312.py");
        touch(dir.path(), ".venv/lib/site.py");
        touch(dir.path(), ".hidden/x.py");

        let paths = run_discovery_phase(&config_for(dir.path(), &[])).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.py")]);
    }

    #[test]
    fn honours_ignore_patterns() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "main.py");
        touch(dir.path(), "drafts/sketch.py");
        touch(dir.path(), "scratch_v2.py");

        let paths =
            run_discovery_phase(&config_for(dir.path(), &["drafts/*", "scratch_*"])).unwrap();
        assert_eq!(paths, vec![PathBuf::from("main.py")]);
    }

    #[test]
    fn empty_tree_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.txt");
        let err = run_discovery_phase(&config_for(dir.path(), &[])).unwrap_err();
        assert!(matches!(err, GraphError::NoSourceFiles(_)));
    }
}
