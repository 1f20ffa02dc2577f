//! Control-flow graph built over a method's flat statement list, with
//! synthetic entry and exit nodes.

use std::collections::HashMap;

use crate::id::StmtIndex;
use crate::ir::Stmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfgNode {
    Entry,
    Stmt(StmtIndex),
    Exit,
}

#[derive(Debug, Clone)]
pub struct Cfg {
    num_stmts: usize,
    succs: HashMap<CfgNode, Vec<CfgNode>>,
}

impl Cfg {
    pub fn entry(&self) -> CfgNode {
        CfgNode::Entry
    }

    pub fn exit(&self) -> CfgNode {
        CfgNode::Exit
    }

    pub fn num_stmts(&self) -> usize {
        self.num_stmts
    }

    pub fn nodes(&self) -> impl Iterator<Item = CfgNode> + '_ {
        std::iter::once(CfgNode::Entry)
            .chain((0..self.num_stmts).map(|i| CfgNode::Stmt(StmtIndex(i as u32))))
            .chain(std::iter::once(CfgNode::Exit))
    }

    pub fn succs_of(&self, n: CfgNode) -> &[CfgNode] {
        self.succs.get(&n).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Inverse of `succs_of`, computed on demand. Backward analyses and
    /// dead-code reachability both need predecessors.
    pub fn preds(&self) -> HashMap<CfgNode, Vec<CfgNode>> {
        let mut preds: HashMap<CfgNode, Vec<CfgNode>> = HashMap::new();
        for n in self.nodes() {
            for &s in self.succs_of(n) {
                preds.entry(s).or_default().push(n);
            }
        }
        preds
    }
}

/// The node directly following statement `i` in a method of `n`
/// statements: the next statement, or the exit node if `i` is last.
/// Exposed so other analyses (dead-code reachability) can compute an
/// `If`'s fall-through target without guessing at this CFG's successor
/// ordering.
pub fn fallthrough(i: usize, n: usize) -> CfgNode {
    if i + 1 < n {
        CfgNode::Stmt(StmtIndex((i + 1) as u32))
    } else {
        CfgNode::Exit
    }
}

pub fn build_cfg(stmts: &[Stmt]) -> Cfg {
    let n = stmts.len();
    let mut succs: HashMap<CfgNode, Vec<CfgNode>> = HashMap::new();

    succs.insert(
        CfgNode::Entry,
        if n > 0 {
            vec![CfgNode::Stmt(StmtIndex(0))]
        } else {
            vec![CfgNode::Exit]
        },
    );
    succs.insert(CfgNode::Exit, vec![]);

    for (i, stmt) in stmts.iter().enumerate() {
        let node = CfgNode::Stmt(StmtIndex(i as u32));
        let out = match stmt {
            Stmt::If { target, .. } => vec![CfgNode::Stmt(*target), fallthrough(i, n)],
            Stmt::Switch { cases, default, .. } => {
                let mut v: Vec<CfgNode> = cases.iter().map(|(_, t)| CfgNode::Stmt(*t)).collect();
                v.push(CfgNode::Stmt(*default));
                v
            }
            Stmt::Goto(t) => vec![CfgNode::Stmt(*t)],
            Stmt::Return(_) => vec![CfgNode::Exit],
            Stmt::New { .. }
            | Stmt::Assign { .. }
            | Stmt::StoreField { .. }
            | Stmt::StoreArray { .. }
            | Stmt::Invoke { .. } => vec![fallthrough(i, n)],
        };
        succs.insert(node, out);
    }

    Cfg { num_stmts: n, succs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::VarId;
    use crate::ir::Exp;

    #[test]
    fn linear_body_falls_through_to_exit() {
        let stmts = vec![
            Stmt::Assign {
                lhs: VarId(0),
                rhs: Exp::IntLiteral(1),
            },
            Stmt::Return(Some(VarId(0))),
        ];
        let cfg = build_cfg(&stmts);
        assert_eq!(cfg.succs_of(cfg.entry()), &[CfgNode::Stmt(StmtIndex(0))]);
        assert_eq!(cfg.succs_of(CfgNode::Stmt(StmtIndex(0))), &[CfgNode::Stmt(StmtIndex(1))]);
        assert_eq!(cfg.succs_of(CfgNode::Stmt(StmtIndex(1))), &[CfgNode::Exit]);
    }

    #[test]
    fn if_has_exactly_two_successors() {
        let stmts = vec![
            Stmt::If {
                cond: Exp::IntLiteral(1),
                target: StmtIndex(2),
            },
            Stmt::Return(None),
            Stmt::Return(None),
        ];
        let cfg = build_cfg(&stmts);
        let succs = cfg.succs_of(CfgNode::Stmt(StmtIndex(0)));
        assert_eq!(succs.len(), 2);
        assert!(succs.contains(&CfgNode::Stmt(StmtIndex(2))));
        assert!(succs.contains(&CfgNode::Stmt(StmtIndex(1))));
    }

    #[test]
    fn preds_are_inverse_of_succs() {
        let stmts = vec![
            Stmt::Goto(StmtIndex(1)),
            Stmt::Return(None),
        ];
        let cfg = build_cfg(&stmts);
        let preds = cfg.preds();
        assert_eq!(preds.get(&CfgNode::Stmt(StmtIndex(1))).unwrap(), &vec![CfgNode::Stmt(StmtIndex(0))]);
    }
}
