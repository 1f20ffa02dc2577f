//! Fatal errors raised while running a whole-program points-to analysis.

use thiserror::Error;
use wpa_core::MethodId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointerError {
    #[error("call site in method {0} invokes a method with no body and no declared abstract signature")]
    UnresolvedCallTarget(MethodId),

    #[error("instance method {0} declares no receiver parameter to bind `this` to")]
    MissingReceiverParam(MethodId),
}
