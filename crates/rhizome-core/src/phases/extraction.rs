//! Phase 2: Per-file import extraction via tree-sitter.
//!
//! Each file is an independent unit of work; a failure to read or parse one
//! file yields a diagnostic and an empty import list for that file, never an
//! aborted run.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::{Diagnostic, GraphConfig, ImportStatement};
use crate::languages::{AnalyserRegistry, LanguageAnalyser};

/// One discovered file with its extracted imports, in source order.
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    pub path: PathBuf,
    pub imports: Vec<ImportStatement>,
}

/// Run the extraction phase over all discovered files in parallel. Files
/// keep their discovery order in the returned list.
pub fn run_extraction_phase(
    config: &GraphConfig,
    files: &[PathBuf],
) -> (Vec<ExtractedFile>, Vec<Diagnostic>) {
    let root = Path::new(&config.project_root);
    let registry = AnalyserRegistry::new();

    let results: Vec<(ExtractedFile, Option<Diagnostic>)> = files
        .par_iter()
        .map(|rel| {
            match extract_one(root, rel, &registry) {
                Ok(imports) => (
                    ExtractedFile {
                        path: rel.clone(),
                        imports,
                    },
                    None,
                ),
                Err(message) => {
                    log::warn!("failed to extract imports from {}: {message}", rel.display());
                    (
                        ExtractedFile {
                            path: rel.clone(),
                            imports: Vec::new(),
                        },
                        Some(Diagnostic::ExtractionFailure {
                            file: rel.to_string_lossy().to_string(),
                            message,
                        }),
                    )
                }
            }
        })
        .collect();

    let mut extracted = Vec::with_capacity(results.len());
    let mut diagnostics = Vec::new();
    for (file, diag) in results {
        extracted.push(file);
        diagnostics.extend(diag);
    }
    (extracted, diagnostics)
}

fn extract_one(
    root: &Path,
    rel: &Path,
    registry: &AnalyserRegistry,
) -> std::result::Result<Vec<ImportStatement>, String> {
    let ext = rel
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    let analyser = registry
        .get_by_extension(&ext)
        .ok_or_else(|| format!("no analyser for extension {ext:?}"))?;

    let source = std::fs::read(root.join(rel)).map_err(|e| e.to_string())?;

    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&analyser.get_language())
        .map_err(|e| e.to_string())?;
    let tree = parser
        .parse(&source, None)
        .ok_or_else(|| "parser produced no tree".to_string())?;

    Ok(analyser.extract_imports(&tree, &source, &rel.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn extracts_in_discovery_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "import b\nimport numpy\n").unwrap();
        fs::write(dir.path().join("b.py"), "").unwrap();

        let config = GraphConfig {
            project_root: dir.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        let files = vec![PathBuf::from("a.py"), PathBuf::from("b.py")];
        let (extracted, diagnostics) = run_extraction_phase(&config, &files);

        assert!(diagnostics.is_empty());
        assert_eq!(extracted.len(), 2);
        assert_eq!(extracted[0].path, PathBuf::from("a.py"));
        let targets: Vec<&str> = extracted[0]
            .imports
            .iter()
            .map(|i| i.target_name.as_str())
            .collect();
        assert_eq!(targets, vec!["b", "numpy"]);
        assert!(extracted[1].imports.is_empty());
    }

    #[test]
    fn missing_file_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.py"), "import os\n").unwrap();

        let config = GraphConfig {
            project_root: dir.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        let files = vec![PathBuf::from("ok.py"), PathBuf::from("missing.py")];
        let (extracted, diagnostics) = run_extraction_phase(&config, &files);

        // The failed file keeps its module, with no imports
        assert_eq!(extracted.len(), 2);
        assert!(extracted[1].imports.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            &diagnostics[0],
            Diagnostic::ExtractionFailure { file, .. } if file == "missing.py"
        ));
    }
}
