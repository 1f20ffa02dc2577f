//! Live-variable analysis: a backward dataflow over sets of `VarId`, used
//! by dead-code detection to recognize assignments whose value is never
//! read.

use std::collections::HashSet;

use wpa_core::{Analysis, Direction, Stmt, VarId};

pub struct LiveVariables;

impl Analysis for LiveVariables {
    type Fact = HashSet<VarId>;

    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn boundary_fact(&self) -> HashSet<VarId> {
        HashSet::new()
    }

    fn init_fact(&self) -> HashSet<VarId> {
        HashSet::new()
    }

    fn meet_into(&self, src: &HashSet<VarId>, dst: &mut HashSet<VarId>) {
        dst.extend(src.iter().copied());
    }

    fn transfer(&self, stmt: Option<&Stmt>, out_fact: &HashSet<VarId>) -> HashSet<VarId> {
        let mut in_fact = out_fact.clone();
        if let Some(s) = stmt {
            if let Some(d) = s.def() {
                in_fact.remove(&d);
            }
            in_fact.extend(s.uses());
        }
        in_fact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpa_core::cfg::build_cfg;
    use wpa_core::dataflow::solve;
    use wpa_core::{CfgNode, Exp, StmtIndex};

    #[test]
    fn dead_assignment_is_not_live_at_its_own_out() {
        // x = 1; (x never used again)
        let stmts = vec![
            Stmt::Assign { lhs: VarId(0), rhs: Exp::IntLiteral(1) },
            Stmt::Return(None),
        ];
        let cfg = build_cfg(&stmts);
        let result = solve(&cfg, &stmts, &LiveVariables);
        assert!(!result.out_fact(CfgNode::Stmt(StmtIndex(0))).contains(&VarId(0)));
    }

    #[test]
    fn used_later_is_live_across_the_gap() {
        let stmts = vec![
            Stmt::Assign { lhs: VarId(0), rhs: Exp::IntLiteral(1) },
            Stmt::Assign { lhs: VarId(1), rhs: Exp::IntLiteral(2) },
            Stmt::Return(Some(VarId(0))),
        ];
        let cfg = build_cfg(&stmts);
        let result = solve(&cfg, &stmts, &LiveVariables);
        assert!(result.out_fact(CfgNode::Stmt(StmtIndex(0))).contains(&VarId(0)));
        assert!(result.out_fact(CfgNode::Stmt(StmtIndex(1))).contains(&VarId(0)));
    }
}
