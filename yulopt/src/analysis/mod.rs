//! Whole-program analyses consumed by the optimizer

mod callgraph;
mod effects;
mod msize;
mod scope;
mod ssa;

pub use callgraph::{CallGraph, call_graph};
pub use effects::function_side_effects;
pub use msize::contains_msize;
pub use scope::ScopeTracker;
pub use ssa::{has_unique_names, ssa_variables};
