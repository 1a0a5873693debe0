//! Hierarchical module forest: entity model, two-wave construction and
//! tree completion.

pub mod forest;
pub mod module;

pub use forest::ModuleForest;
pub use module::{Module, ModuleId, Origin};
