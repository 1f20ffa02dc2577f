//! The pointer abstraction points-to analysis propagates objects between:
//! a local variable scoped to a method, a static field, an instance field
//! scoped to a concrete abstract object, or an array element scoped to a
//! concrete abstract object (arrays are modeled as a single unindexed
//! element per object, matching the heap model's site-based coarsening).

use wpa_core::{FieldId, MethodId, Obj, VarId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pointer {
    Var(MethodId, VarId),
    StaticField(FieldId),
    InstanceField(Obj, FieldId),
    ArrayElement(Obj),
}
