//! Class-Hierarchy-Analysis call graph construction (C4).

pub mod callgraph;
pub mod cha;
pub mod error;

pub use callgraph::{CallGraph, CgEdge};
pub use cha::{build, dispatch, resolve};
pub use error::CallGraphError;
