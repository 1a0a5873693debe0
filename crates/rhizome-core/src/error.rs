//! Fatal error taxonomy for a graph-construction run.
//!
//! Per-file extraction failures and ambiguous-import warnings are not errors;
//! they accumulate as [`crate::config::Diagnostic`] values alongside the
//! successful result.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    /// The project root does not exist or contains no Python source files.
    #[error("no Python source files found under {0:?}")]
    NoSourceFiles(String),

    /// A user-supplied ignore pattern failed to compile.
    #[error("invalid ignore pattern {pattern:?}: {source}")]
    IgnorePattern {
        pattern: String,
        #[source]
        source: ignore::Error,
    },

    /// A resolved import route has no module entity after both construction
    /// waves. This indicates a bug in tree completion or resolution, never
    /// bad input.
    #[error("resolved route {route:?} (imported from {importer}) has no module entity")]
    UnresolvedRoute { route: String, importer: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
