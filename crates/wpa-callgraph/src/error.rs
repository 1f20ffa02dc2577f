//! Fatal errors raised while building a call graph.

use thiserror::Error;
use wpa_core::{ClassId, MethodId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallGraphError {
    #[error("call site in method {0} names a method-ref that resolves to no declared method on class {1}")]
    UnresolvedMethodRef(MethodId, ClassId),

    #[error("method {0} has no body to scan for call sites")]
    NoMethodBody(MethodId),
}
