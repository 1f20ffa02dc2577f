//! Intraprocedural constant propagation (C2): a forward dataflow over the
//! three-point lattice in [`crate::lattice`].

use wpa_core::{Analysis, ArithOp, CmpOp, Direction, Exp, MethodBody, Stmt, VarId, VarType};

use crate::fact::CPFact;
use crate::lattice::Value;

/// Evaluate `exp` under `fact`. Anything not a literal, a variable, or a
/// binary arithmetic/comparison expression over two trackable operands
/// collapses to `NAC`: field/array reads, casts, allocation. Division and
/// modulo by a known-zero divisor instead yield `UNDEF`: such a statement
/// never completes normally, so no value flows out of it.
pub fn evaluate(exp: &Exp, fact: &CPFact) -> Value {
    match exp {
        Exp::IntLiteral(i) => Value::Const(*i),
        Exp::Var(v) => fact.get(*v),
        Exp::Arithmetic { op, a, b } => {
            let (va, vb) = (fact.get(*a), fact.get(*b));
            binary(va, vb, |x, y| eval_arith(*op, x, y))
        }
        Exp::Condition { op, a, b } => {
            let (va, vb) = (fact.get(*a), fact.get(*b));
            binary(va, vb, |x, y| Some(eval_cmp(*op, x, y)))
        }
        Exp::Shift { .. } | Exp::Bitwise { .. } | Exp::New(_) | Exp::Cast { .. } | Exp::FieldAccess(_) | Exp::ArrayAccess { .. } => {
            Value::Nac
        }
    }
}

fn binary(a: Value, b: Value, f: impl Fn(i32, i32) -> Option<i32>) -> Value {
    match (a, b) {
        (Value::Nac, _) | (_, Value::Nac) => Value::Nac,
        (Value::Undef, _) | (_, Value::Undef) => Value::Undef,
        (Value::Const(x), Value::Const(y)) => match f(x, y) {
            Some(r) => Value::Const(r),
            None => Value::Undef,
        },
    }
}

fn eval_arith(op: ArithOp, a: i32, b: i32) -> Option<i32> {
    match op {
        ArithOp::Add => Some(a.wrapping_add(b)),
        ArithOp::Sub => Some(a.wrapping_sub(b)),
        ArithOp::Mul => Some(a.wrapping_mul(b)),
        ArithOp::Div => {
            if b == 0 {
                None
            } else {
                Some(a.wrapping_div(b))
            }
        }
        ArithOp::Rem => {
            if b == 0 {
                None
            } else {
                Some(a.wrapping_rem(b))
            }
        }
    }
}

fn eval_cmp(op: CmpOp, a: i32, b: i32) -> i32 {
    let r = match op {
        CmpOp::Eq => a == b,
        CmpOp::Ne => a != b,
        CmpOp::Lt => a < b,
        CmpOp::Gt => a > b,
        CmpOp::Le => a <= b,
        CmpOp::Ge => a >= b,
    };
    r as i32
}

/// The constant-propagation analysis over one method body. Formal
/// parameters whose static type is an integer holder start at `NAC` at
/// the method's entry, since their value may flow in from a caller this
/// analysis never sees.
pub struct ConstantPropagation<'a> {
    body: &'a MethodBody,
}

impl<'a> ConstantPropagation<'a> {
    pub fn new(body: &'a MethodBody) -> Self {
        ConstantPropagation { body }
    }

    fn is_trackable(&self, v: VarId) -> bool {
        matches!(self.body.var_type(v), VarType::IntHolder(_))
    }
}

impl<'a> Analysis for ConstantPropagation<'a> {
    type Fact = CPFact;

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn boundary_fact(&self) -> CPFact {
        let mut fact = CPFact::new();
        for param in &self.body.params {
            if param.ty.is_int_holder() {
                fact.set(param.var, Value::Nac);
            }
        }
        fact
    }

    fn init_fact(&self) -> CPFact {
        CPFact::new()
    }

    fn meet_into(&self, src: &CPFact, dst: &mut CPFact) {
        src.meet_into(dst);
    }

    fn transfer(&self, stmt: Option<&Stmt>, in_fact: &CPFact) -> CPFact {
        let mut out = in_fact.clone();
        if let Some(Stmt::Assign { lhs, rhs }) = stmt {
            if self.is_trackable(*lhs) {
                out.set(*lhs, evaluate(rhs, in_fact));
            }
        } else if let Some(Stmt::New { lhs, .. }) = stmt {
            // Allocation never produces a trackable int-holder value, but
            // an int-holder-typed lhs reused across a loop must still be
            // killed so stale constants don't survive past it.
            if self.is_trackable(*lhs) {
                out.set(*lhs, Value::Nac);
            }
        } else if let Some(Stmt::Invoke { lhs: Some(lhs), .. }) = stmt {
            if self.is_trackable(*lhs) {
                out.set(*lhs, Value::Nac);
            }
        }
        out
    }
}
