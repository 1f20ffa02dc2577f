//! Program representation shared by every analysis crate in this
//! workspace: IDs, IR, class hierarchy, CFG, heap abstraction, and the
//! generic dataflow driver.

pub mod arena;
pub mod cfg;
pub mod dataflow;
pub mod error;
pub mod heap;
pub mod hierarchy;
pub mod id;
pub mod ir;
pub mod method;
pub mod types;
pub mod world;

pub use cfg::{Cfg, CfgNode};
pub use dataflow::{Analysis, DataflowResult, Direction};
pub use error::CoreError;
pub use heap::{HeapModel, Obj};
pub use hierarchy::{Class, ClassHierarchy};
pub use id::{CallSiteRef, ClassId, FieldId, MethodId, StmtIndex, VarId};
pub use ir::{CallSite, Exp, FieldRef, MethodRef, Stmt, Subsignature};
pub use method::{Method, MethodBody, Param, VarIndex};
pub use types::{ArithOp, BitwiseOp, CallKind, CmpOp, IntHolderType, ShiftOp, VarType};
pub use world::World;
