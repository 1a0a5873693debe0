//! Python language analyser.

use tree_sitter::{Language, Node, Tree};

use super::LanguageAnalyser;
use crate::config::ImportStatement;

pub struct PythonAnalyser;

impl Default for PythonAnalyser {
    fn default() -> Self {
        Self
    }
}

impl PythonAnalyser {
    pub fn new() -> Self {
        Self
    }

    /// Normalize an import target: relative imports lose their leading dots,
    /// a bare-dot import yields None.
    fn target_from_text(text: &str) -> Option<String> {
        let trimmed = text.trim_start_matches('.');
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn push_import(
        imports: &mut Vec<ImportStatement>,
        statement_node: &Node,
        target: &str,
        source: &[u8],
        file_path: &str,
    ) {
        if let Some(target) = Self::target_from_text(target) {
            imports.push(ImportStatement {
                file: file_path.to_string(),
                statement: statement_node.utf8_text(source).unwrap_or("").to_string(),
                target_name: target,
                line: statement_node.start_position().row + 1,
            });
        }
    }
}

impl LanguageAnalyser for PythonAnalyser {
    fn extensions(&self) -> &[&str] {
        &["py"]
    }

    fn language_name(&self) -> &str {
        "Python"
    }

    fn get_language(&self) -> Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn extract_imports(&self, tree: &Tree, source: &[u8], file_path: &str) -> Vec<ImportStatement> {
        let mut imports = Vec::new();
        let root = tree.root_node();
        for i in 0..root.child_count() {
            let Some(child) = root.child(i) else { continue };
            if child.kind() == "import_statement" {
                // import foo, import foo.bar, import foo as f
                for j in 0..child.child_count() {
                    let Some(c) = child.child(j) else { continue };
                    if c.kind() == "dotted_name" {
                        if let Ok(target) = c.utf8_text(source) {
                            Self::push_import(&mut imports, &child, target, source, file_path);
                        }
                    } else if c.kind() == "aliased_import" {
                        for k in 0..c.child_count() {
                            let Some(inner) = c.child(k) else { continue };
                            if inner.kind() == "dotted_name" {
                                if let Ok(target) = inner.utf8_text(source) {
                                    Self::push_import(
                                        &mut imports,
                                        &child,
                                        target,
                                        source,
                                        file_path,
                                    );
                                }
                                break;
                            }
                        }
                    }
                }
            } else if child.kind() == "import_from_statement" {
                // from foo import bar, from .sib import f
                for j in 0..child.child_count() {
                    let Some(c) = child.child(j) else { continue };
                    if c.kind() == "dotted_name" || c.kind() == "relative_import" {
                        if let Ok(target) = c.utf8_text(source) {
                            Self::push_import(&mut imports, &child, target, source, file_path);
                        }
                        break;
                    }
                }
            }
        }
        imports
    }
}
