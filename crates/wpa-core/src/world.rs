//! The handle every analysis solver is constructed with: a borrowed view
//! of the frozen class hierarchy plus the program's designated entry
//! method. Analyses never reach for ambient global state; everything they
//! need crosses this one handle.

use crate::hierarchy::ClassHierarchy;
use crate::id::MethodId;

pub struct World<'a> {
    pub hierarchy: &'a ClassHierarchy,
    pub entry: MethodId,
}

impl<'a> World<'a> {
    pub fn new(hierarchy: &'a ClassHierarchy, entry: MethodId) -> Self {
        World { hierarchy, entry }
    }
}
