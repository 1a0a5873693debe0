//! Directed import graph over leaf project modules.

pub mod import_graph;

pub use import_graph::ImportGraph;
