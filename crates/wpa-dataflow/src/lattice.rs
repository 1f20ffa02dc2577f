//! The three-point constant-propagation lattice: `UNDEF < CONST(i) <
//! CONST(j) (i != j, incomparable) < NAC`. `UNDEF` means "not yet shown to
//! be anything"; `NAC` ("not a constant") means two different constants
//! met, or the value came from something dataflow can't model.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Undef,
    Const(i32),
    Nac,
}

impl Value {
    pub fn is_const(self) -> bool {
        matches!(self, Value::Const(_))
    }

    pub fn as_const(self) -> Option<i32> {
        match self {
            Value::Const(i) => Some(i),
            _ => None,
        }
    }

    /// Lattice meet: UNDEF is the bottom, NAC the top, two distinct
    /// constants are incomparable and meet to NAC.
    pub fn meet(self, other: Value) -> Value {
        match (self, other) {
            (Value::Undef, v) | (v, Value::Undef) => v,
            (Value::Nac, _) | (_, Value::Nac) => Value::Nac,
            (Value::Const(a), Value::Const(b)) if a == b => Value::Const(a),
            (Value::Const(_), Value::Const(_)) => Value::Nac,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undef => write!(f, "UNDEF"),
            Value::Const(i) => write!(f, "{i}"),
            Value::Nac => write!(f, "NAC"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undef_is_bottom() {
        assert_eq!(Value::Undef.meet(Value::Const(1)), Value::Const(1));
        assert_eq!(Value::Const(1).meet(Value::Undef), Value::Const(1));
    }

    #[test]
    fn nac_is_top() {
        assert_eq!(Value::Nac.meet(Value::Const(1)), Value::Nac);
        assert_eq!(Value::Undef.meet(Value::Nac), Value::Nac);
    }

    #[test]
    fn distinct_constants_meet_to_nac() {
        assert_eq!(Value::Const(1).meet(Value::Const(2)), Value::Nac);
    }

    #[test]
    fn equal_constants_meet_to_themselves() {
        assert_eq!(Value::Const(5).meet(Value::Const(5)), Value::Const(5));
    }

    #[test]
    fn meet_is_commutative_and_idempotent() {
        let vs = [Value::Undef, Value::Const(1), Value::Const(2), Value::Nac];
        for &a in &vs {
            for &b in &vs {
                assert_eq!(a.meet(b), b.meet(a));
            }
            assert_eq!(a.meet(a), a);
        }
    }
}
