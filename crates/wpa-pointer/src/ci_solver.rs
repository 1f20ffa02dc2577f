//! Context-insensitive whole-program points-to analysis (C6): a single
//! abstract object set per variable, field, or array element, with the
//! call graph discovered on the fly as dispatch targets become resolvable
//! once a receiver variable's points-to set is non-empty.

use std::collections::{HashMap, HashSet};

use wpa_callgraph::{cha, CallGraph};
use wpa_core::{CallKind, CallSite, CallSiteRef, ClassHierarchy, Exp, FieldRef, HeapModel, MethodId, Obj, Stmt, StmtIndex, VarId};

use crate::error::PointerError;
use crate::pfg::PointerFlowGraph;
use crate::pointer::Pointer;
use crate::worklist::Worklist;

pub struct CIResult {
    pub call_graph: CallGraph,
    pub pt: HashMap<Pointer, HashSet<Obj>>,
    pub heap: HeapModel,
}

pub struct CIPointerAnalysis<'a> {
    hierarchy: &'a ClassHierarchy,
    entry: MethodId,
    heap: HeapModel,
    pfg: PointerFlowGraph<Pointer>,
    pt: HashMap<Pointer, HashSet<Obj>>,
    reachable: HashSet<MethodId>,
    call_graph: CallGraph,
    worklist: Worklist<Pointer, Obj>,
}

impl<'a> CIPointerAnalysis<'a> {
    pub fn new(hierarchy: &'a ClassHierarchy, entry: MethodId) -> Self {
        CIPointerAnalysis {
            hierarchy,
            entry,
            heap: HeapModel::new(),
            pfg: PointerFlowGraph::new(),
            pt: HashMap::new(),
            reachable: HashSet::new(),
            call_graph: CallGraph::new(),
            worklist: Worklist::new(),
        }
    }

    pub fn solve(mut self) -> Result<CIResult, PointerError> {
        self.add_reachable(self.entry)?;
        while let Some(entry) = self.worklist.pop() {
            self.propagate(entry.pointer, entry.obj)?;
        }
        Ok(CIResult {
            call_graph: self.call_graph,
            pt: self.pt,
            heap: self.heap,
        })
    }

    fn add_pt(&mut self, p: Pointer, obj: Obj) {
        if self.pt.entry(p).or_default().insert(obj) {
            self.worklist.push(p, obj);
        }
    }

    fn pts_of(&self, p: Pointer) -> Vec<Obj> {
        self.pt.get(&p).map(|s| s.iter().copied().collect()).unwrap_or_default()
    }

    fn add_reachable(&mut self, m: MethodId) -> Result<(), PointerError> {
        if !self.reachable.insert(m) {
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
                    self.add_pt(Pointer::Var(m, *lhs), obj);
                }
                Stmt::Assign { lhs, rhs: Exp::Var(rhs) } => {
                    if self.pfg.add_edge(Pointer::Var(m, *rhs), Pointer::Var(m, *lhs)) {
                        for obj in self.pts_of(Pointer::Var(m, *rhs)) {
                            self.add_pt(Pointer::Var(m, *lhs), obj);
                        }
                    }
                }
                Stmt::Assign {
                    lhs,
                    rhs: Exp::FieldAccess(FieldRef::Static(field)),
                } => {
                    if self.pfg.add_edge(Pointer::StaticField(*field), Pointer::Var(m, *lhs)) {
                        for obj in self.pts_of(Pointer::StaticField(*field)) {
                            self.add_pt(Pointer::Var(m, *lhs), obj);
                        }
                    }
                }
                Stmt::StoreField {
                    field: FieldRef::Static(field),
                    rhs,
                } => {
                    if self.pfg.add_edge(Pointer::Var(m, *rhs), Pointer::StaticField(*field)) {
                        for obj in self.pts_of(Pointer::Var(m, *rhs)) {
                            self.add_pt(Pointer::StaticField(*field), obj);
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
                        self.add_reachable(target)?;
                        self.connect_call(m, call, *lhs, target, None);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn propagate(&mut self, p: Pointer, obj: Obj) -> Result<(), PointerError> {
        for succ in self.pfg.succs_of(&p).copied().collect::<Vec<_>>() {
            self.add_pt(succ, obj);
        }
        if let Pointer::Var(m, v) = p {
            self.handle_var_obj(m, v, obj)?;
        }
        Ok(())
    }

    fn handle_var_obj(&mut self, m: MethodId, v: VarId, obj: Obj) -> Result<(), PointerError> {
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
                if self.pfg.add_edge(Pointer::Var(m, *rhs), Pointer::InstanceField(obj, *field)) {
                    for o in self.pts_of(Pointer::Var(m, *rhs)) {
                        self.add_pt(Pointer::InstanceField(obj, *field), o);
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
                if self.pfg.add_edge(Pointer::InstanceField(obj, *field), Pointer::Var(m, *lhs)) {
                    for o in self.pts_of(Pointer::InstanceField(obj, *field)) {
                        self.add_pt(Pointer::Var(m, *lhs), o);
                    }
                }
            }
        }
        for &si in body.var_index.store_arrays_of(v) {
            if let Stmt::StoreArray { rhs, .. } = &body.stmts[si.as_usize()] {
                if self.pfg.add_edge(Pointer::Var(m, *rhs), Pointer::ArrayElement(obj)) {
                    for o in self.pts_of(Pointer::Var(m, *rhs)) {
                        self.add_pt(Pointer::ArrayElement(obj), o);
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
                if self.pfg.add_edge(Pointer::ArrayElement(obj), Pointer::Var(m, *lhs)) {
                    for o in self.pts_of(Pointer::ArrayElement(obj)) {
                        self.add_pt(Pointer::Var(m, *lhs), o);
                    }
                }
            }
        }
        for &si in body.var_index.invokes_of(v) {
            if let Stmt::Invoke { lhs, call } = &body.stmts[si.as_usize()] {
                self.handle_virtual_call(m, si, call, *lhs, obj)?;
            }
        }
        Ok(())
    }

    fn handle_virtual_call(
        &mut self,
        caller: MethodId,
        stmt: StmtIndex,
        call: &CallSite,
        lhs: Option<VarId>,
        obj: Obj,
    ) -> Result<(), PointerError> {
        let target_class = match call.kind {
            CallKind::Special => call.method_ref.declaring_class,
            _ => self.heap.class_of(obj),
        };
        let Some(target) = cha::dispatch(self.hierarchy, target_class, &call.method_ref.subsignature) else {
            return Ok(());
        };
        let site = CallSiteRef { method: caller, stmt };
        self.call_graph.add_edge(caller, target, site, call.kind);
        self.add_reachable(target)?;
        self.connect_call(caller, call, lhs, target, Some(obj));
        Ok(())
    }

    /// Bind a resolved call's receiver (if any), arguments, and return
    /// value into the pointer flow graph. By convention an instance
    /// method's first declared parameter binds `this`; the remaining
    /// parameters bind the call's arguments in order.
    fn connect_call(&mut self, caller: MethodId, call: &CallSite, lhs: Option<VarId>, target: MethodId, receiver_obj: Option<Obj>) {
        let Some(target_method) = self.hierarchy.method(target) else {
            return;
        };
        let Some(target_body) = &target_method.body else {
            return;
        };

        if !target_method.is_static {
            if let (Some(this_param), Some(obj)) = (target_body.params.first(), receiver_obj) {
                self.add_pt(Pointer::Var(target, this_param.var), obj);
            }
        }

        let param_offset = if target_method.is_static { 0 } else { 1 };
        for (i, &arg) in call.args.iter().enumerate() {
            if let Some(p) = target_body.params.get(i + param_offset) {
                if self.pfg.add_edge(Pointer::Var(caller, arg), Pointer::Var(target, p.var)) {
                    for o in self.pts_of(Pointer::Var(caller, arg)) {
                        self.add_pt(Pointer::Var(target, p.var), o);
                    }
                }
            }
        }

        if let Some(ret_var) = lhs {
            for stmt in &target_body.stmts {
                if let Stmt::Return(Some(rv)) = stmt {
                    if self.pfg.add_edge(Pointer::Var(target, *rv), Pointer::Var(caller, ret_var)) {
                        for o in self.pts_of(Pointer::Var(target, *rv)) {
                            self.add_pt(Pointer::Var(caller, ret_var), o);
                        }
                    }
                }
            }
        }
    }
}
