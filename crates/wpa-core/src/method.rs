//! Method declarations and bodies, plus the per-variable back-reference
//! tables pointer analysis consults while resolving loads and stores.

use std::collections::HashMap;

use crate::cfg::Cfg;
use crate::id::{ClassId, MethodId, StmtIndex, VarId};
use crate::ir::{FieldRef, Stmt, Subsignature};
use crate::types::VarType;

/// A formal parameter: its variable slot and static type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub var: VarId,
    pub ty: VarType,
}

/// A method's declaration: identity within the hierarchy, signature shape,
/// and its body if it has one (abstract and native methods do not).
#[derive(Debug, Clone)]
pub struct Method {
    pub id: MethodId,
    pub declaring_class: ClassId,
    pub subsignature: Subsignature,
    pub is_abstract: bool,
    pub is_static: bool,
    pub param_count: usize,
    pub body: Option<MethodBody>,
}

/// Per-variable back-reference tables: for a given `VarId`, the statements
/// where it is used as the base of a field/array store or load, or as the
/// receiver of an invoke. Pointer analysis uses these to avoid rescanning
/// every statement each time a variable's points-to set grows.
#[derive(Debug, Clone, Default)]
pub struct VarIndex {
    store_fields: HashMap<VarId, Vec<StmtIndex>>,
    load_fields: HashMap<VarId, Vec<StmtIndex>>,
    store_arrays: HashMap<VarId, Vec<StmtIndex>>,
    load_arrays: HashMap<VarId, Vec<StmtIndex>>,
    invokes: HashMap<VarId, Vec<StmtIndex>>,
}

impl VarIndex {
    pub fn build(stmts: &[Stmt]) -> Self {
        let mut idx = VarIndex::default();
        for (i, stmt) in stmts.iter().enumerate() {
            let si = StmtIndex(i as u32);
            match stmt {
                Stmt::StoreField {
                    field: FieldRef::Instance(base, _),
                    ..
                } => idx.store_fields.entry(*base).or_default().push(si),
                Stmt::Assign {
                    rhs: crate::ir::Exp::FieldAccess(FieldRef::Instance(base, _)),
                    ..
                } => idx.load_fields.entry(*base).or_default().push(si),
                Stmt::StoreArray { base, .. } => idx.store_arrays.entry(*base).or_default().push(si),
                Stmt::Assign {
                    rhs: crate::ir::Exp::ArrayAccess { base, .. },
                    ..
                } => idx.load_arrays.entry(*base).or_default().push(si),
                Stmt::Invoke {
                    call: crate::ir::CallSite { receiver: Some(r), .. },
                    ..
                } => idx.invokes.entry(*r).or_default().push(si),
                _ => {}
            }
        }
        idx
    }

    pub fn store_fields_of(&self, v: VarId) -> &[StmtIndex] {
        self.store_fields.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn load_fields_of(&self, v: VarId) -> &[StmtIndex] {
        self.load_fields.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn store_arrays_of(&self, v: VarId) -> &[StmtIndex] {
        self.store_arrays.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn load_arrays_of(&self, v: VarId) -> &[StmtIndex] {
        self.load_arrays.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn invokes_of(&self, v: VarId) -> &[StmtIndex] {
        self.invokes.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A method's body: its statement list, formal parameters, precomputed
/// CFG, variable back-reference index, and the static type of every local
/// (not just the formals) constant propagation needs to know whether a
/// variable is trackable at all.
#[derive(Debug, Clone)]
pub struct MethodBody {
    pub stmts: Vec<Stmt>,
    pub params: Vec<Param>,
    pub cfg: Cfg,
    pub var_index: VarIndex,
    var_types: HashMap<VarId, VarType>,
}

impl MethodBody {
    pub fn new(stmts: Vec<Stmt>, params: Vec<Param>, var_types: HashMap<VarId, VarType>) -> Self {
        let cfg = crate::cfg::build_cfg(&stmts);
        let var_index = VarIndex::build(&stmts);
        MethodBody {
            stmts,
            params,
            cfg,
            var_index,
            var_types,
        }
    }

    pub fn stmt(&self, i: StmtIndex) -> Option<&Stmt> {
        self.stmts.get(i.as_usize())
    }

    /// Static type of `v`; variables with no recorded type (e.g. never
    /// declared, which shouldn't happen for well-formed IR) are treated as
    /// `VarType::Other` so they're never mistaken for trackable.
    pub fn var_type(&self, v: VarId) -> VarType {
        self.var_types.get(&v).copied().unwrap_or(VarType::Other)
    }
}
