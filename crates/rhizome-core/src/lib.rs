//! Rhizome Core — Import-graph engine for Python source trees.
//!
//! This crate contains all analysis logic: file discovery, tree-sitter import
//! extraction, two-wave module-tree construction, import resolution and
//! classification, dead-end pruning, cluster assignment and the visibility
//! filter that produces the final graph description.

pub mod config;
pub mod error;
pub mod graph;
pub mod languages;
pub mod output;
pub mod phases;
pub mod pipeline;
pub mod tree;
