//! Interns context-qualified variables and objects into dense `u32`
//! indices, the same arena pattern `wpa_core::arena::Interner` provides
//! for any other hashable key — here specialized to the two keys the
//! context-sensitive solver needs as pointer-flow-graph nodes.

use wpa_core::arena::Interner;
use wpa_core::{MethodId, Obj, VarId};

use crate::context::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CSVar(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CSObj(pub u32);

#[derive(Debug, Default)]
pub struct CSManager {
    vars: Interner<(Context, MethodId, VarId)>,
    objs: Interner<(Context, Obj)>,
}

impl CSManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cs_var(&mut self, ctx: Context, method: MethodId, var: VarId) -> CSVar {
        CSVar(self.vars.intern((ctx, method, var)))
    }

    pub fn cs_obj(&mut self, ctx: Context, obj: Obj) -> CSObj {
        CSObj(self.objs.intern((ctx, obj)))
    }

    pub fn var_key(&self, v: CSVar) -> &(Context, MethodId, VarId) {
        self.vars.get(v.0)
    }

    pub fn obj_key(&self, o: CSObj) -> &(Context, Obj) {
        self.objs.get(o.0)
    }

    pub fn underlying_obj(&self, o: CSObj) -> Obj {
        self.objs.get(o.0).1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_context_and_var_intern_to_same_index() {
        let mut mgr = CSManager::new();
        let a = mgr.cs_var(Context::empty(), MethodId(0), VarId(1));
        let b = mgr.cs_var(Context::empty(), MethodId(0), VarId(1));
        assert_eq!(a, b);
    }

    #[test]
    fn different_context_is_a_different_cs_var() {
        use crate::context::{CallSiteSensitiveSelector, ContextSelector};

        let mut mgr = CSManager::new();
        let a = mgr.cs_var(Context::empty(), MethodId(0), VarId(1));
        let site = wpa_core::CallSiteRef { method: MethodId(0), stmt: wpa_core::StmtIndex(0) };
        let ctx2 = CallSiteSensitiveSelector.select(&Context::empty(), site, None, MethodId(1));
        let b = mgr.cs_var(ctx2, MethodId(0), VarId(1));
        assert_ne!(a, b);
    }
}
