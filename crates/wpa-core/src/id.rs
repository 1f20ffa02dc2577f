//! Stable ID newtypes for IR entities.
//!
//! All IDs are distinct newtype wrappers over `u32`, providing type safety
//! so that a `ClassId` cannot be accidentally used where a `MethodId` is
//! expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a class or interface in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub u32);

/// Identity of a method (static or instance, abstract or concrete).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodId(pub u32);

/// Identity of a field (static or instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(pub u32);

/// Identity of a local variable (including formal parameters), unique
/// within its owning method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub u32);

/// Position of a statement within a method's flat statement list. Does not
/// include the CFG's synthetic entry/exit nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StmtIndex(pub u32);

impl StmtIndex {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a call site: the statement containing the `Invoke`, within
/// the method that contains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallSiteRef {
    pub method: MethodId,
    pub stmt: StmtIndex,
}

macro_rules! impl_display {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

impl_display!(ClassId);
impl_display!(MethodId);
impl_display!(FieldId);
impl_display!(VarId);
impl_display!(StmtIndex);

impl fmt::Display for CallSiteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.stmt, self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let class = ClassId(1);
        let method = MethodId(1);
        assert_eq!(class.0, method.0);
    }

    #[test]
    fn display_formats() {
        assert_eq!(format!("{}", ClassId(3)), "3");
        assert_eq!(format!("{}", VarId(7)), "7");
        assert_eq!(
            format!(
                "{}",
                CallSiteRef {
                    method: MethodId(2),
                    stmt: StmtIndex(5)
                }
            ),
            "5@2"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let v = VarId(42);
        let json = serde_json::to_string(&v).unwrap();
        let back: VarId = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
