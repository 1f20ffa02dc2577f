//! Small value types shared across the IR: operators and integer-holder
//! static types.

use serde::{Deserialize, Serialize};

/// Binary arithmetic operators over integer-holder values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// Relational operators producing a boolean-typed integer holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

/// Shift operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftOp {
    Shl,
    Shr,
    UShr,
}

/// Bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
}

/// The small set of static types whose values constant propagation tracks.
/// Anything else (references, floating point, arrays) is represented as a
/// variable of `VarType::Other` and always carries the `NAC` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntHolderType {
    Byte,
    Short,
    Int,
    Char,
    Boolean,
}

/// Static type of a local variable, coarsened to what constant propagation
/// needs to know: is this an integer holder, or something else entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarType {
    IntHolder(IntHolderType),
    Other,
}

impl VarType {
    pub fn is_int_holder(self) -> bool {
        matches!(self, VarType::IntHolder(_))
    }
}

/// How a call site dispatches to its target method(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallKind {
    Static,
    Special,
    Virtual,
    Interface,
    /// Catch-all for a method-ref that a call-graph builder could not
    /// classify under the four kinds above. Never produced by this crate's
    /// own IR builder; exists so downstream matches stay exhaustive.
    Other,
}
