//! Intraprocedural analyses: constant propagation, live-variable analysis,
//! and the dead-code detection that fuses both with CFG reachability.

pub mod constprop;
pub mod deadcode;
pub mod error;
pub mod fact;
pub mod lattice;
pub mod liveness;

pub use constprop::{evaluate, ConstantPropagation};
pub use deadcode::{analyze, DeadCodeResult};
pub use error::AnalysisError;
pub use fact::CPFact;
pub use lattice::Value;
pub use liveness::LiveVariables;
