//! Fatal errors raised while running the intraprocedural analyses.

use thiserror::Error;
use wpa_core::{MethodId, StmtIndex};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// The CFG presented something other than exactly two successors at an
    /// `If`. Building our own CFGs, this never happens in practice; it
    /// guards against a malformed CFG supplied by some other builder.
    #[error("if at statement {0} in method {1} does not have exactly two CFG successors")]
    MalformedBranch(StmtIndex, MethodId),
}
