//! Dead-code detection (C3): fuses constant propagation, live-variable
//! analysis, and CFG reachability into two disjoint findings — statements
//! unreachable due to a constant branch condition, and assignments whose
//! value is never subsequently read.

use std::collections::{HashMap, HashSet};

use wpa_core::dataflow::solve;
use wpa_core::{CfgNode, MethodBody, MethodId, Stmt, StmtIndex};

use crate::constprop::{evaluate, ConstantPropagation};
use crate::error::AnalysisError;
use crate::fact::CPFact;
use crate::liveness::LiveVariables;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeadCodeResult {
    /// Statements control-flow can never reach, because a constant branch
    /// condition rules them out.
    pub unreachable: Vec<StmtIndex>,
    /// Reachable assignments whose defined variable is never live at the
    /// assignment's own out-fact.
    pub useless_assignments: Vec<StmtIndex>,
}

/// Walk the CFG from entry, following both successors of an `If` unless
/// constant propagation pins its condition to a single value, in which
/// case only the determined branch is descended into.
fn reachable_nodes(
    body: &MethodBody,
    method: MethodId,
    cp_out: &HashMap<CfgNode, CPFact>,
) -> Result<HashSet<CfgNode>, AnalysisError> {
    let cfg = &body.cfg;
    let mut seen = HashSet::new();
    let mut stack = vec![cfg.entry()];

    while let Some(n) = stack.pop() {
        if !seen.insert(n) {
            continue;
        }
        let stmt = match n {
            CfgNode::Stmt(i) => body.stmt(i),
            _ => None,
        };
        match (n, stmt) {
            (CfgNode::Stmt(i), Some(Stmt::If { cond, target })) => {
                let succs = cfg.succs_of(n);
                if succs.len() != 2 {
                    return Err(AnalysisError::MalformedBranch(i, method));
                }
                let in_fact = cp_out.get(&n).cloned().unwrap_or_default();
                match evaluate(cond, &in_fact).as_const() {
                    Some(c) if c != 0 => stack.push(CfgNode::Stmt(*target)),
                    Some(_) => stack.push(wpa_core::cfg::fallthrough(i.as_usize(), body.stmts.len())),
                    None => stack.extend(succs.iter().copied()),
                }
            }
            (CfgNode::Stmt(_), Some(Stmt::Switch { selector, cases, default })) => {
                let in_fact = cp_out.get(&n).cloned().unwrap_or_default();
                match in_fact.get(*selector).as_const() {
                    Some(v) => {
                        let target = cases.iter().find(|(c, _)| *c == v).map(|(_, t)| *t).unwrap_or(*default);
                        stack.push(CfgNode::Stmt(target));
                    }
                    None => stack.extend(cfg.succs_of(n).iter().copied()),
                }
            }
            _ => stack.extend(cfg.succs_of(n).iter().copied()),
        }
    }

    Ok(seen)
}

pub fn analyze(body: &MethodBody, method: MethodId) -> DeadCodeResult {
    let cp = ConstantPropagation::new(body);
    let cp_result = solve(&body.cfg, &body.stmts, &cp);
    let live_result = solve(&body.cfg, &body.stmts, &LiveVariables);

    // A malformed CFG (not one this crate built itself) fails the
    // reachability walk; treat everything as reachable rather than
    // reporting spurious dead code in that case.
    let reachable =
        reachable_nodes(body, method, &cp_result.out_facts).unwrap_or_else(|_| body.cfg.nodes().collect());

    let mut unreachable = Vec::new();
    let mut useless_assignments = Vec::new();

    for i in 0..body.stmts.len() {
        let idx = StmtIndex(i as u32);
        let node = CfgNode::Stmt(idx);
        if !reachable.contains(&node) {
            unreachable.push(idx);
            continue;
        }
        let stmt = &body.stmts[i];
        if let Stmt::Assign { lhs, .. } = stmt {
            if !stmt.is_side_effecting() && !live_result.out_fact(node).contains(lhs) {
                useless_assignments.push(idx);
            }
        }
    }

    DeadCodeResult {
        unreachable,
        useless_assignments,
    }
}
