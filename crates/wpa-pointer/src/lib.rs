//! Whole-program points-to analysis: context-insensitive (C6) and
//! context-sensitive (C7) variants sharing a pointer-flow-graph substrate
//! and worklist driver, built on top of the class hierarchy and the
//! on-the-fly call graph construction rules from `wpa_callgraph`.

pub mod ci_solver;
pub mod context;
pub mod cs_manager;
pub mod cs_solver;
pub mod error;
pub mod pfg;
pub mod pointer;
pub mod worklist;

pub use ci_solver::{CIPointerAnalysis, CIResult};
pub use context::{CallSiteSensitiveSelector, Context, ContextInsensitiveSelector, ContextSelector};
pub use cs_manager::{CSManager, CSObj, CSVar};
pub use cs_solver::{CSPointerAnalysis, CSResult, CsPointer};
pub use error::PointerError;
pub use pfg::PointerFlowGraph;
pub use pointer::Pointer;
pub use worklist::{Entry, Worklist};
