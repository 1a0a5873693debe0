//! Language analyser trait and registry.

use std::collections::HashMap;

use tree_sitter::{Language, Tree};

use crate::config::ImportStatement;

pub mod builtins;
pub mod python;

/// Trait for language front ends that extract raw import identifiers from a
/// parsed source file.
pub trait LanguageAnalyser: Send + Sync {
    /// File extensions this analyser handles (e.g. &["py"]).
    fn extensions(&self) -> &[&str];

    /// Human-readable language name.
    fn language_name(&self) -> &str;

    /// Get the tree-sitter Language for parsing.
    fn get_language(&self) -> Language;

    /// Extract top-level import statements from a parsed AST, in source order.
    fn extract_imports(&self, tree: &Tree, source: &[u8], file_path: &str) -> Vec<ImportStatement>;
}

/// Registry mapping file extensions to analysers.
pub struct AnalyserRegistry {
    analysers: Vec<Box<dyn LanguageAnalyser>>,
    extension_map: HashMap<String, usize>,
}

impl AnalyserRegistry {
    pub fn new() -> Self {
        let analysers: Vec<Box<dyn LanguageAnalyser>> =
            vec![Box::new(python::PythonAnalyser::new())];

        let mut extension_map = HashMap::new();
        for (i, analyser) in analysers.iter().enumerate() {
            for ext in analyser.extensions() {
                extension_map.insert(ext.to_string(), i);
            }
        }

        Self {
            analysers,
            extension_map,
        }
    }

    /// Get the analyser for a given file extension, if one exists.
    pub fn get_by_extension(&self, ext: &str) -> Option<&dyn LanguageAnalyser> {
        self.extension_map
            .get(ext)
            .map(|&i| self.analysers[i].as_ref())
    }

    /// Get the language name for a file extension.
    pub fn language_for_extension(&self, ext: &str) -> Option<&str> {
        self.get_by_extension(ext).map(|a| a.language_name())
    }

    /// All registered extensions.
    pub fn extensions(&self) -> Vec<&str> {
        self.extension_map.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for AnalyserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
