//! Fatal error types shared by the analytical core.

use thiserror::Error;

use crate::id::{ClassId, FieldId, MethodId, StmtIndex, VarId};

/// Errors arising from building or querying the class hierarchy, IR, or CFG.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("class {0} not found")]
    ClassNotFound(ClassId),

    #[error("method {0} not found")]
    MethodNotFound(MethodId),

    #[error("field {0} not found")]
    FieldNotFound(FieldId),

    #[error("variable {0} not found")]
    VarNotFound(VarId),

    #[error("statement index {0} out of bounds for method {1}")]
    StmtOutOfBounds(StmtIndex, MethodId),

    #[error("method {0} has no body (abstract or native)")]
    NoMethodBody(MethodId),

    #[error("malformed control flow at statement {0} in method {1}: {2}")]
    MalformedControlFlow(StmtIndex, MethodId, &'static str),

    #[error("class {0} redeclares method already declared in the same class")]
    DuplicateMethod(ClassId),
}
