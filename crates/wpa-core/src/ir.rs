//! The per-method three-address IR: statements, expressions, and the
//! structures a call site or field access is built from.

use serde::{Deserialize, Serialize};

use crate::id::{ClassId, FieldId, StmtIndex, VarId};
use crate::types::{ArithOp, BitwiseOp, CallKind, CmpOp, ShiftOp};

/// A reference to a field, distinguishing static fields (no receiver) from
/// instance fields (receiver variable known at the access site).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldRef {
    Static(FieldId),
    Instance(VarId, FieldId),
}

/// The subsignature a call site's method-ref names: enough to identify one
/// declared method within a class (name plus descriptor), opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subsignature(pub String);

impl Subsignature {
    pub fn new(s: impl Into<String>) -> Self {
        Subsignature(s.into())
    }
}

/// An unresolved reference to a method: the class named at the call site
/// plus the subsignature, resolved against the hierarchy at call-graph
/// construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRef {
    pub declaring_class: ClassId,
    pub subsignature: Subsignature,
}

/// The full shape of an `Invoke` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub kind: CallKind,
    pub method_ref: MethodRef,
    /// Receiver variable; `None` for `Static` calls.
    pub receiver: Option<VarId>,
    pub args: Vec<VarId>,
}

/// Right-hand-side expressions. Anything not covered by a specific variant
/// (casts, field/array reads standing in rhs position, allocation as an
/// expression rather than the dedicated `Stmt::New`) is modeled but never
/// treated as constant-foldable: `evaluate` maps all of them to `NAC`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exp {
    IntLiteral(i32),
    Var(VarId),
    Arithmetic { op: ArithOp, a: VarId, b: VarId },
    Condition { op: CmpOp, a: VarId, b: VarId },
    Shift { op: ShiftOp, a: VarId, b: VarId },
    Bitwise { op: BitwiseOp, a: VarId, b: VarId },
    /// Allocation used as a plain rhs value. Our own IR builder always
    /// emits `Stmt::New` instead; this variant exists for exhaustive
    /// matching and to model IR built by tools other than this crate.
    New(ClassId),
    Cast { value: VarId, target: ClassId },
    FieldAccess(FieldRef),
    ArrayAccess { base: VarId, index: VarId },
}

impl Exp {
    /// Variables read by this expression (never includes a write target).
    pub fn operands(&self) -> Vec<VarId> {
        match self {
            Exp::IntLiteral(_) | Exp::New(_) => vec![],
            Exp::Var(v) => vec![*v],
            Exp::Arithmetic { a, b, .. }
            | Exp::Condition { a, b, .. }
            | Exp::Shift { a, b, .. }
            | Exp::Bitwise { a, b, .. } => vec![*a, *b],
            Exp::Cast { value, .. } => vec![*value],
            Exp::FieldAccess(FieldRef::Static(_)) => vec![],
            Exp::FieldAccess(FieldRef::Instance(base, _)) => vec![*base],
            Exp::ArrayAccess { base, index } => vec![*base, *index],
        }
    }
}

/// A single IR statement. Control-flow statements (`If`, `Switch`, `Goto`)
/// carry their own explicit successor targets; the linear statements fall
/// through to the next index in sequence (or to the CFG's exit if last).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    New {
        lhs: VarId,
        class: ClassId,
    },
    /// Covers copy, arithmetic, field/array loads, casts: any assignment
    /// whose rhs is an `Exp`.
    Assign {
        lhs: VarId,
        rhs: Exp,
    },
    StoreField {
        field: FieldRef,
        rhs: VarId,
    },
    StoreArray {
        base: VarId,
        index: VarId,
        rhs: VarId,
    },
    Invoke {
        lhs: Option<VarId>,
        call: CallSite,
    },
    If {
        cond: Exp,
        /// Target taken when `cond` evaluates true. Fall-through is the
        /// next statement in sequence.
        target: StmtIndex,
    },
    Switch {
        selector: VarId,
        cases: Vec<(i32, StmtIndex)>,
        default: StmtIndex,
    },
    Goto(StmtIndex),
    Return(Option<VarId>),
}

impl Stmt {
    /// Variable defined by this statement, if any.
    pub fn def(&self) -> Option<VarId> {
        match self {
            Stmt::New { lhs, .. } => Some(*lhs),
            Stmt::Assign { lhs, .. } => Some(*lhs),
            Stmt::Invoke { lhs, .. } => *lhs,
            _ => None,
        }
    }

    /// Variables used (read) by this statement.
    pub fn uses(&self) -> Vec<VarId> {
        match self {
            Stmt::New { .. } => vec![],
            Stmt::Assign { rhs, .. } => rhs.operands(),
            Stmt::StoreField { field, rhs } => {
                let mut v = match field {
                    FieldRef::Static(_) => vec![],
                    FieldRef::Instance(base, _) => vec![*base],
                };
                v.push(*rhs);
                v
            }
            Stmt::StoreArray { base, index, rhs } => vec![*base, *index, *rhs],
            Stmt::Invoke { call, .. } => {
                let mut v = call.receiver.into_iter().collect::<Vec<_>>();
                v.extend(call.args.iter().copied());
                v
            }
            Stmt::If { cond, .. } => cond.operands(),
            Stmt::Switch { selector, .. } => vec![*selector],
            Stmt::Goto(_) => vec![],
            Stmt::Return(v) => v.into_iter().copied().collect(),
        }
    }

    /// Whether executing this statement can itself be observed externally
    /// (calls, stores) independent of whatever becomes of its def'd
    /// variable. Used by dead-code detection's useless-assignment check,
    /// which never flags these even when their lhs is unused.
    pub fn is_side_effecting(&self) -> bool {
        matches!(
            self,
            Stmt::Invoke { .. } | Stmt::StoreField { .. } | Stmt::StoreArray { .. } | Stmt::New { .. }
        )
    }
}
