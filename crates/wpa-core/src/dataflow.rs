//! A generic monotone dataflow framework driving both forward and backward
//! analyses to a fixpoint over a method's CFG. Constant propagation and
//! live-variable analysis are both just an `Analysis` impl plus a call to
//! `solve`.

use std::collections::{HashMap, VecDeque};

use crate::cfg::{Cfg, CfgNode};
use crate::ir::Stmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// One dataflow analysis: its fact lattice and the functions that drive it.
pub trait Analysis {
    type Fact: Clone + PartialEq;

    fn direction(&self) -> Direction;

    /// The fact that holds at the graph's boundary (entry for forward,
    /// exit for backward) before any statement runs.
    fn boundary_fact(&self) -> Self::Fact;

    /// The fact every non-boundary node starts with before iteration.
    fn init_fact(&self) -> Self::Fact;

    /// Merge `src` into `dst` in place (the lattice's meet).
    fn meet_into(&self, src: &Self::Fact, dst: &mut Self::Fact);

    /// Compute the fact flowing out of `stmt` (or through entry/exit, where
    /// `stmt` is `None`) given the fact flowing in.
    fn transfer(&self, stmt: Option<&Stmt>, in_fact: &Self::Fact) -> Self::Fact;
}

/// Per-node `in`/`out` facts computed by `solve`. For a forward analysis
/// `out_facts[n]` is the standard OUT fact of `n`; for a backward analysis
/// it is the meet of its successors' `in` facts (e.g. liveness's `out`).
pub struct DataflowResult<F> {
    pub in_facts: HashMap<CfgNode, F>,
    pub out_facts: HashMap<CfgNode, F>,
}

impl<F> DataflowResult<F> {
    pub fn in_fact(&self, n: CfgNode) -> &F {
        &self.in_facts[&n]
    }

    pub fn out_fact(&self, n: CfgNode) -> &F {
        &self.out_facts[&n]
    }
}

fn stmt_at<'a>(stmts: &'a [Stmt], n: CfgNode) -> Option<&'a Stmt> {
    match n {
        CfgNode::Stmt(i) => stmts.get(i.as_usize()),
        _ => None,
    }
}

pub fn solve<A: Analysis>(cfg: &Cfg, stmts: &[Stmt], analysis: &A) -> DataflowResult<A::Fact> {
    match analysis.direction() {
        Direction::Forward => solve_forward(cfg, stmts, analysis),
        Direction::Backward => solve_backward(cfg, stmts, analysis),
    }
}

fn solve_forward<A: Analysis>(cfg: &Cfg, stmts: &[Stmt], analysis: &A) -> DataflowResult<A::Fact> {
    let preds = cfg.preds();
    let mut in_facts: HashMap<CfgNode, A::Fact> = HashMap::new();
    let mut out_facts: HashMap<CfgNode, A::Fact> = HashMap::new();
    for n in cfg.nodes() {
        out_facts.insert(n, analysis.init_fact());
    }

    let mut worklist: VecDeque<CfgNode> = cfg.nodes().collect();
    let mut queued: std::collections::HashSet<CfgNode> = worklist.iter().copied().collect();

    while let Some(n) = worklist.pop_front() {
        queued.remove(&n);
        let new_in = if n == cfg.entry() {
            analysis.boundary_fact()
        } else {
            let mut acc = analysis.init_fact();
            for &p in preds.get(&n).map(Vec::as_slice).unwrap_or(&[]) {
                analysis.meet_into(&out_facts[&p], &mut acc);
            }
            acc
        };
        let new_out = analysis.transfer(stmt_at(stmts, n), &new_in);
        in_facts.insert(n, new_in);
        let changed = out_facts.get(&n).map(|old| old != &new_out).unwrap_or(true);
        out_facts.insert(n, new_out);
        if changed {
            for &s in cfg.succs_of(n) {
                if queued.insert(s) {
                    worklist.push_back(s);
                }
            }
        }
    }

    DataflowResult { in_facts, out_facts }
}

fn solve_backward<A: Analysis>(cfg: &Cfg, stmts: &[Stmt], analysis: &A) -> DataflowResult<A::Fact> {
    let preds = cfg.preds();
    let mut in_facts: HashMap<CfgNode, A::Fact> = HashMap::new();
    let mut out_facts: HashMap<CfgNode, A::Fact> = HashMap::new();
    for n in cfg.nodes() {
        in_facts.insert(n, analysis.init_fact());
    }

    let mut worklist: VecDeque<CfgNode> = cfg.nodes().collect();
    let mut queued: std::collections::HashSet<CfgNode> = worklist.iter().copied().collect();

    while let Some(n) = worklist.pop_front() {
        queued.remove(&n);
        let new_out = if n == cfg.exit() {
            analysis.boundary_fact()
        } else {
            let mut acc = analysis.init_fact();
            for &s in cfg.succs_of(n) {
                analysis.meet_into(&in_facts[&s], &mut acc);
            }
            acc
        };
        let new_in = analysis.transfer(stmt_at(stmts, n), &new_out);
        out_facts.insert(n, new_out);
        let changed = in_facts.get(&n).map(|old| old != &new_in).unwrap_or(true);
        in_facts.insert(n, new_in);
        if changed {
            for &p in preds.get(&n).map(Vec::as_slice).unwrap_or(&[]) {
                if queued.insert(p) {
                    worklist.push_back(p);
                }
            }
        }
    }

    DataflowResult { in_facts, out_facts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::build_cfg;
    use crate::id::{StmtIndex, VarId};
    use crate::ir::Exp;
    use std::collections::HashSet;

    /// A toy backward "used-before-exit" analysis: tracks which variables
    /// are ever read, checking the generic backward driver independent of
    /// the real liveness implementation in wpa-dataflow.
    struct ToyLiveness;

    impl Analysis for ToyLiveness {
        type Fact = HashSet<VarId>;

        fn direction(&self) -> Direction {
            Direction::Backward
        }

        fn boundary_fact(&self) -> Self::Fact {
            HashSet::new()
        }

        fn init_fact(&self) -> Self::Fact {
            HashSet::new()
        }

        fn meet_into(&self, src: &Self::Fact, dst: &mut Self::Fact) {
            dst.extend(src.iter().copied());
        }

        fn transfer(&self, stmt: Option<&Stmt>, out_fact: &Self::Fact) -> Self::Fact {
            let mut result = out_fact.clone();
            if let Some(s) = stmt {
                if let Some(d) = s.def() {
                    result.remove(&d);
                }
                result.extend(s.uses());
            }
            result
        }
    }

    #[test]
    fn backward_analysis_propagates_uses() {
        let stmts = vec![
            Stmt::Assign {
                lhs: VarId(0),
                rhs: Exp::IntLiteral(1),
            },
            Stmt::Return(Some(VarId(0))),
        ];
        let cfg = build_cfg(&stmts);
        let result = solve(&cfg, &stmts, &ToyLiveness);
        // Before stmt 0 runs, v0 is not yet live (stmt 0 defines it).
        assert!(!result.in_fact(crate::cfg::CfgNode::Stmt(StmtIndex(0))).contains(&VarId(0)));
        // After stmt 0 (out fact), v0 is live because stmt 1 uses it.
        assert!(result.out_fact(crate::cfg::CfgNode::Stmt(StmtIndex(0))).contains(&VarId(0)));
    }
}
