//! Context-sensitive whole-program points-to analysis (C7): identical
//! propagation rules to the context-insensitive solver, but every
//! variable and (optionally) allocation site is additionally qualified by
//! a `Context`, selected by a pluggable `ContextSelector`. Static fields
//! stay context-insensitive, a common simplification: they're genuinely
//! global storage, not per-invocation state.

use std::collections::{HashMap, HashSet};

use wpa_callgraph::{cha, CallGraph};
use wpa_core::{CallKind, CallSite, CallSiteRef, ClassHierarchy, Exp, FieldId, FieldRef, HeapModel, MethodId, Obj, Stmt, StmtIndex, VarId};

use crate::context::{Context, ContextSelector};
use crate::cs_manager::{CSManager, CSObj, CSVar};
use crate::error::PointerError;
use crate::pfg::PointerFlowGraph;
use crate::worklist::Worklist;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsPointer {
    Var(CSVar),
    StaticField(FieldId),
    InstanceField(CSObj, FieldId),
    ArrayElement(CSObj),
}

pub struct CSResult {
    pub call_graph: CallGraph,
    pub pt: HashMap<CsPointer, HashSet<CSObj>>,
    pub heap: HeapModel,
    pub manager: CSManager,
}

pub struct CSPointerAnalysis<'a, S> {
    hierarchy: &'a ClassHierarchy,
    entry: MethodId,
    selector: S,
    heap: HeapModel,
    mgr: CSManager,
    pfg: PointerFlowGraph<CsPointer>,
    pt: HashMap<CsPointer, HashSet<CSObj>>,
    reachable: HashSet<(Context, MethodId)>,
    call_graph: CallGraph,
    worklist: Worklist<CsPointer, CSObj>,
}

impl<'a, S: ContextSelector> CSPointerAnalysis<'a, S> {
    pub fn new(hierarchy: &'a ClassHierarchy, entry: MethodId, selector: S) -> Self {
        CSPointerAnalysis {
            hierarchy,
            entry,
            selector,
            heap: HeapModel::new(),
            mgr: CSManager::new(),
            pfg: PointerFlowGraph::new(),
            pt: HashMap::new(),
            reachable: HashSet::new(),
            call_graph: CallGraph::new(),
            worklist: Worklist::new(),
        }
    }

    pub fn solve(mut self) -> Result<CSResult, PointerError> {
        self.add_reachable(Context::empty(), self.entry)?;
        while let Some(e) = self.worklist.pop() {
            self.propagate(e.pointer, e.obj)?;
        }
        Ok(CSResult {
            call_graph: self.call_graph,
            pt: self.pt,
            heap: self.heap,
            manager: self.mgr,
        })
    }

    fn add_pt(&mut self, p: CsPointer, obj: CSObj) {
        if self.pt.entry(p).or_default().insert(obj) {
            self.worklist.push(p, obj);
        }
    }

    fn pts_of(&self, p: CsPointer) -> Vec<CSObj> {
        self.pt.get(&p).map(|s| s.iter().copied().collect()).unwrap_or_default()
    }

    fn add_reachable(&mut self, ctx: Context, m: MethodId) -> Result<(), PointerError> {
        if !self.reachable.insert((ctx.clone(), m)) {
            return Ok(());
        }
        self.call_graph.add_method(m);
        let Some(method) = self.hierarchy.method(m) else {
            return Ok(());
        };
        let Some(body) = &method.body else {
            return Ok(());
        };

        for (i, stmt) in body.stmts.iter().enumerate() {
            let stmt_idx = StmtIndex(i as u32);
            match stmt {
                Stmt::New { lhs, class } => {
                    let obj = self.heap.obj(m, stmt_idx, *class);
                    let cs_obj = self.mgr.cs_obj(ctx.clone(), obj);
                    let cs_lhs = self.mgr.cs_var(ctx.clone(), m, *lhs);
                    self.add_pt(CsPointer::Var(cs_lhs), cs_obj);
                }
                Stmt::Assign { lhs, rhs: Exp::Var(rhs) } => {
                    let cs_lhs = self.mgr.cs_var(ctx.clone(), m, *lhs);
                    let cs_rhs = self.mgr.cs_var(ctx.clone(), m, *rhs);
                    if self.pfg.add_edge(CsPointer::Var(cs_rhs), CsPointer::Var(cs_lhs)) {
                        for o in self.pts_of(CsPointer::Var(cs_rhs)) {
                            self.add_pt(CsPointer::Var(cs_lhs), o);
                        }
                    }
                }
                Stmt::Assign {
                    lhs,
                    rhs: Exp::FieldAccess(FieldRef::Static(field)),
                } => {
                    let cs_lhs = self.mgr.cs_var(ctx.clone(), m, *lhs);
                    if self.pfg.add_edge(CsPointer::StaticField(*field), CsPointer::Var(cs_lhs)) {
                        for o in self.pts_of(CsPointer::StaticField(*field)) {
                            self.add_pt(CsPointer::Var(cs_lhs), o);
                        }
                    }
                }
                Stmt::StoreField {
                    field: FieldRef::Static(field),
                    rhs,
                } => {
                    let cs_rhs = self.mgr.cs_var(ctx.clone(), m, *rhs);
                    if self.pfg.add_edge(CsPointer::Var(cs_rhs), CsPointer::StaticField(*field)) {
                        for o in self.pts_of(CsPointer::Var(cs_rhs)) {
                            self.add_pt(CsPointer::StaticField(*field), o);
                        }
                    }
                }
                Stmt::Invoke { lhs, call } if call.kind == CallKind::Static => {
                    if let Some(target) = self
                        .hierarchy
                        .resolve_method(call.method_ref.declaring_class, &call.method_ref.subsignature)
                    {
                        let site = CallSiteRef { method: m, stmt: stmt_idx };
                        self.call_graph.add_edge(m, target, site, call.kind);
                        let target_ctx = self.selector.select(&ctx, site, None, target);
                        self.add_reachable(target_ctx.clone(), target)?;
                        self.connect_call(ctx.clone(), m, call, *lhs, target_ctx, target, None);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn propagate(&mut self, p: CsPointer, obj: CSObj) -> Result<(), PointerError> {
        for succ in self.pfg.succs_of(&p).copied().collect::<Vec<_>>() {
            self.add_pt(succ, obj);
        }
        if let CsPointer::Var(cs_var) = p {
            let (ctx, m, v) = self.mgr.var_key(cs_var).clone();
            self.handle_var_obj(ctx, m, v, obj)?;
        }
        Ok(())
    }

    fn handle_var_obj(&mut self, ctx: Context, m: MethodId, v: VarId, cs_obj: CSObj) -> Result<(), PointerError> {
        let Some(method) = self.hierarchy.method(m) else {
            return Ok(());
        };
        let Some(body) = &method.body else {
            return Ok(());
        };

        for &si in body.var_index.store_fields_of(v) {
            if let Stmt::StoreField {
                field: FieldRef::Instance(_, field),
                rhs,
            } = &body.stmts[si.as_usize()]
            {
                let cs_rhs = self.mgr.cs_var(ctx.clone(), m, *rhs);
                if self.pfg.add_edge(CsPointer::Var(cs_rhs), CsPointer::InstanceField(cs_obj, *field)) {
                    for o in self.pts_of(CsPointer::Var(cs_rhs)) {
                        self.add_pt(CsPointer::InstanceField(cs_obj, *field), o);
                    }
                }
            }
        }
        for &si in body.var_index.load_fields_of(v) {
            if let Stmt::Assign {
                lhs,
                rhs: Exp::FieldAccess(FieldRef::Instance(_, field)),
            } = &body.stmts[si.as_usize()]
            {
                let cs_lhs = self.mgr.cs_var(ctx.clone(), m, *lhs);
                if self.pfg.add_edge(CsPointer::InstanceField(cs_obj, *field), CsPointer::Var(cs_lhs)) {
                    for o in self.pts_of(CsPointer::InstanceField(cs_obj, *field)) {
                        self.add_pt(CsPointer::Var(cs_lhs), o);
                    }
                }
            }
        }
        for &si in body.var_index.store_arrays_of(v) {
            if let Stmt::StoreArray { rhs, .. } = &body.stmts[si.as_usize()] {
                let cs_rhs = self.mgr.cs_var(ctx.clone(), m, *rhs);
                if self.pfg.add_edge(CsPointer::Var(cs_rhs), CsPointer::ArrayElement(cs_obj)) {
                    for o in self.pts_of(CsPointer::Var(cs_rhs)) {
                        self.add_pt(CsPointer::ArrayElement(cs_obj), o);
                    }
                }
            }
        }
        for &si in body.var_index.load_arrays_of(v) {
            if let Stmt::Assign {
                lhs,
                rhs: Exp::ArrayAccess { .. },
            } = &body.stmts[si.as_usize()]
            {
                let cs_lhs = self.mgr.cs_var(ctx.clone(), m, *lhs);
                if self.pfg.add_edge(CsPointer::ArrayElement(cs_obj), CsPointer::Var(cs_lhs)) {
                    for o in self.pts_of(CsPointer::ArrayElement(cs_obj)) {
                        self.add_pt(CsPointer::Var(cs_lhs), o);
                    }
                }
            }
        }
        for &si in body.var_index.invokes_of(v) {
            if let Stmt::Invoke { lhs, call } = &body.stmts[si.as_usize()] {
                self.handle_virtual_call(ctx.clone(), m, si, call, *lhs, cs_obj)?;
            }
        }
        Ok(())
    }

    fn handle_virtual_call(
        &mut self,
        ctx: Context,
        caller: MethodId,
        stmt: StmtIndex,
        call: &CallSite,
        lhs: Option<VarId>,
        cs_obj: CSObj,
    ) -> Result<(), PointerError> {
        let target_class = match call.kind {
            CallKind::Special => call.method_ref.declaring_class,
            _ => self.heap.class_of(self.mgr.underlying_obj(cs_obj)),
        };
        let Some(target) = cha::dispatch(self.hierarchy, target_class, &call.method_ref.subsignature) else {
            return Ok(());
        };
        let site = CallSiteRef { method: caller, stmt };
        self.call_graph.add_edge(caller, target, site, call.kind);
        let target_ctx = self.selector.select(&ctx, site, Some(cs_obj), target);
        self.add_reachable(target_ctx.clone(), target)?;
        self.connect_call(ctx, caller, call, lhs, target_ctx, target, Some(cs_obj));
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn connect_call(
        &mut self,
        caller_ctx: Context,
        caller: MethodId,
        call: &CallSite,
        lhs: Option<VarId>,
        target_ctx: Context,
        target: MethodId,
        receiver_obj: Option<CSObj>,
    ) {
        let Some(target_method) = self.hierarchy.method(target) else {
            return;
        };
        let Some(target_body) = &target_method.body else {
            return;
        };

        if !target_method.is_static {
            if let (Some(this_param), Some(obj)) = (target_body.params.first(), receiver_obj) {
                let cs_this = self.mgr.cs_var(target_ctx.clone(), target, this_param.var);
                self.add_pt(CsPointer::Var(cs_this), obj);
            }
        }

        let param_offset = if target_method.is_static { 0 } else { 1 };
        for (i, &arg) in call.args.iter().enumerate() {
            if let Some(p) = target_body.params.get(i + param_offset) {
                let cs_arg = self.mgr.cs_var(caller_ctx.clone(), caller, arg);
                let cs_param = self.mgr.cs_var(target_ctx.clone(), target, p.var);
                if self.pfg.add_edge(CsPointer::Var(cs_arg), CsPointer::Var(cs_param)) {
                    for o in self.pts_of(CsPointer::Var(cs_arg)) {
                        self.add_pt(CsPointer::Var(cs_param), o);
                    }
                }
            }
        }

        if let Some(ret_var) = lhs {
            for stmt in &target_body.stmts {
                if let Stmt::Return(Some(rv)) = stmt {
                    let cs_rv = self.mgr.cs_var(target_ctx.clone(), target, *rv);
                    let cs_lhs = self.mgr.cs_var(caller_ctx.clone(), caller, ret_var);
                    if self.pfg.add_edge(CsPointer::Var(cs_rv), CsPointer::Var(cs_lhs)) {
                        for o in self.pts_of(CsPointer::Var(cs_rv)) {
                            self.add_pt(CsPointer::Var(cs_lhs), o);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CallSiteSensitiveSelector;
    use std::collections::HashMap as StdHashMap;
    use wpa_core::{MethodBody, MethodRef, Param, Subsignature, VarType};

    /// Two distinct call sites calling the same `id(x)` method with two
    /// distinct freshly-allocated objects must not merge their results
    /// under a 1-call-site-sensitive context: each call's own return
    /// binding should see only the object it passed in.
    #[test]
    fn distinct_call_sites_stay_separate_under_call_site_sensitivity() {
        let mut h = ClassHierarchy::new();
        let class_a = h.add_class("A", None);

        let callee_body = MethodBody::new(
            vec![Stmt::Return(Some(VarId(0)))],
            vec![Param { var: VarId(0), ty: VarType::Other }],
            StdHashMap::new(),
        );
        let callee = h.add_method(class_a, Subsignature::new("id(A)"), false, true, 1, Some(callee_body));

        let caller_body = MethodBody::new(
            vec![
                Stmt::New { lhs: VarId(0), class: class_a },
                Stmt::New { lhs: VarId(1), class: class_a },
                Stmt::Invoke {
                    lhs: Some(VarId(2)),
                    call: CallSite {
                        kind: CallKind::Static,
                        method_ref: MethodRef {
                            declaring_class: class_a,
                            subsignature: Subsignature::new("id(A)"),
                        },
                        receiver: None,
                        args: vec![VarId(0)],
                    },
                },
                Stmt::Invoke {
                    lhs: Some(VarId(3)),
                    call: CallSite {
                        kind: CallKind::Static,
                        method_ref: MethodRef {
                            declaring_class: class_a,
                            subsignature: Subsignature::new("id(A)"),
                        },
                        receiver: None,
                        args: vec![VarId(1)],
                    },
                },
                Stmt::Return(None),
            ],
            vec![],
            StdHashMap::new(),
        );
        let caller = h.add_method(class_a, Subsignature::new("caller()"), false, true, 0, Some(caller_body));

        let analysis = CSPointerAnalysis::new(&h, caller, CallSiteSensitiveSelector);
        let result = analysis.solve().unwrap();
        assert!(result.call_graph.callees_of(caller).contains(&callee));

        let mut manager = result.manager;
        let ctx0 = Context::empty();
        let cs_v2 = CsPointer::Var(manager.cs_var(ctx0.clone(), caller, VarId(2)));
        let cs_v3 = CsPointer::Var(manager.cs_var(ctx0, caller, VarId(3)));
        let v2 = result.pt.get(&cs_v2).cloned().unwrap_or_default();
        let v3 = result.pt.get(&cs_v3).cloned().unwrap_or_default();

        assert_eq!(v2.len(), 1);
        assert_eq!(v3.len(), 1);
        assert_ne!(v2, v3);
    }
}
