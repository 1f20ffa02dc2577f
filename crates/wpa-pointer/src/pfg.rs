//! The pointer flow graph: edges along which points-to sets propagate.
//! Generic over the pointer type so the same structure backs both the
//! context-insensitive solver (C6, `Pointer = pointer::Pointer`) and the
//! context-sensitive one (C7, `Pointer = cs_manager::CSVar`-or-similar
//! interned index). Like the call graph, its node- and edge-set only ever
//! grows during solving.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

#[derive(Debug)]
pub struct PointerFlowGraph<P> {
    succs: HashMap<P, HashSet<P>>,
}

impl<P> Default for PointerFlowGraph<P> {
    fn default() -> Self {
        PointerFlowGraph { succs: HashMap::new() }
    }
}

impl<P: Eq + Hash + Clone> PointerFlowGraph<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flow edge `from -> to`. Returns `true` if this edge did not
    /// already exist (the caller only needs to propagate along a genuinely
    /// new edge).
    pub fn add_edge(&mut self, from: P, to: P) -> bool {
        self.succs.entry(from).or_default().insert(to)
    }

    pub fn succs_of(&self, p: &P) -> impl Iterator<Item = &P> {
        self.succs.get(p).into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_reports_novelty() {
        let mut pfg: PointerFlowGraph<u32> = PointerFlowGraph::new();
        assert!(pfg.add_edge(1, 2));
        assert!(!pfg.add_edge(1, 2));
        assert_eq!(pfg.succs_of(&1).collect::<Vec<_>>(), vec![&2]);
    }
}
