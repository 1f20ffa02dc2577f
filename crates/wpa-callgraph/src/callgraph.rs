//! The call graph itself: a directed graph over methods whose node- and
//! edge-set grows as CHA (or, later, points-to analysis) discovers more of
//! it. Backed by `petgraph::stable_graph::StableDiGraph`, mirroring how
//! the wider graph-substrate patterns in this workspace's origin represent
//! a growing node/edge set with stable identities.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction as PgDirection;

use wpa_core::{CallSiteRef, CallKind, MethodId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CgEdge {
    pub call_site: CallSiteRef,
    pub kind: CallKind,
}

#[derive(Debug, Default)]
pub struct CallGraph {
    graph: StableDiGraph<MethodId, CgEdge, u32>,
    index_of: HashMap<MethodId, NodeIndex<u32>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, m: MethodId) -> NodeIndex<u32> {
        if let Some(&idx) = self.index_of.get(&m) {
            return idx;
        }
        let idx = self.graph.add_node(m);
        self.index_of.insert(m, idx);
        idx
    }

    /// Record that `caller` reaches `callee` through `call_site` with
    /// dispatch kind `kind`. Adding the same edge twice is a no-op at the
    /// node level (both methods already have nodes) but always records a
    /// new edge, since a call graph can legitimately have parallel edges
    /// from two different call sites to the same callee.
    pub fn add_edge(&mut self, caller: MethodId, callee: MethodId, call_site: CallSiteRef, kind: CallKind) {
        let from = self.ensure_node(caller);
        let to = self.ensure_node(callee);
        if !self
            .graph
            .edges_connecting(from, to)
            .any(|e| e.weight().call_site == call_site)
        {
            self.graph.add_edge(from, to, CgEdge { call_site, kind });
        }
    }

    /// Register `m` as a node with no edges yet, e.g. the program's entry
    /// method before its body has been scanned, or an abstract method
    /// reached as a dispatch target but never itself a caller.
    pub fn add_method(&mut self, m: MethodId) {
        self.ensure_node(m);
    }

    pub fn contains_method(&self, m: MethodId) -> bool {
        self.index_of.contains_key(&m)
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.graph.node_weights().copied()
    }

    pub fn callees_of(&self, m: MethodId) -> Vec<MethodId> {
        let Some(&idx) = self.index_of.get(&m) else { return vec![] };
        self.graph
            .neighbors_directed(idx, PgDirection::Outgoing)
            .map(|n| self.graph[n])
            .collect()
    }

    pub fn callers_of(&self, m: MethodId) -> Vec<MethodId> {
        let Some(&idx) = self.index_of.get(&m) else { return vec![] };
        self.graph
            .neighbors_directed(idx, PgDirection::Incoming)
            .map(|n| self.graph[n])
            .collect()
    }

    pub fn edges(&self) -> impl Iterator<Item = (MethodId, MethodId, CgEdge)> + '_ {
        self.graph.edge_indices().map(move |e| {
            let (from, to) = self.graph.edge_endpoints(e).unwrap();
            (self.graph[from], self.graph[to], self.graph[e])
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpa_core::StmtIndex;

    fn site(stmt: u32) -> CallSiteRef {
        CallSiteRef {
            method: MethodId(0),
            stmt: StmtIndex(stmt),
        }
    }

    #[test]
    fn add_edge_grows_nodes_and_edges() {
        let mut cg = CallGraph::new();
        cg.add_edge(MethodId(0), MethodId(1), site(0), CallKind::Static);
        assert_eq!(cg.node_count(), 2);
        assert_eq!(cg.edge_count(), 1);
        assert_eq!(cg.callees_of(MethodId(0)), vec![MethodId(1)]);
        assert_eq!(cg.callers_of(MethodId(1)), vec![MethodId(0)]);
    }

    #[test]
    fn duplicate_call_site_is_not_duplicated() {
        let mut cg = CallGraph::new();
        cg.add_edge(MethodId(0), MethodId(1), site(0), CallKind::Virtual);
        cg.add_edge(MethodId(0), MethodId(1), site(0), CallKind::Virtual);
        assert_eq!(cg.edge_count(), 1);
    }

    #[test]
    fn distinct_call_sites_to_same_callee_both_recorded() {
        let mut cg = CallGraph::new();
        cg.add_edge(MethodId(0), MethodId(1), site(0), CallKind::Virtual);
        cg.add_edge(MethodId(0), MethodId(1), site(1), CallKind::Virtual);
        assert_eq!(cg.edge_count(), 2);
    }
}
