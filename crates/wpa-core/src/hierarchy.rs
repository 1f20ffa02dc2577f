//! The class hierarchy: classes, interfaces, and their declared methods.
//!
//! Built once up front and treated as immutable afterwards; CHA and the
//! pointer analyses only ever read it.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::id::{ClassId, MethodId};
use crate::ir::Subsignature;
use crate::method::{Method, MethodBody};

#[derive(Debug, Clone)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub is_interface: bool,
    pub super_class: Option<ClassId>,
    direct_subclasses: Vec<ClassId>,
    direct_sub_interfaces: Vec<ClassId>,
    direct_implementors: Vec<ClassId>,
    /// Declaration order matters: CHA walks a class's declared methods
    /// deterministically when building dispatch tables.
    declared_methods: IndexMap<Subsignature, MethodId>,
}

/// Class hierarchy plus the methods declared across it.
#[derive(Debug, Default)]
pub struct ClassHierarchy {
    classes: HashMap<ClassId, Class>,
    methods: HashMap<MethodId, Method>,
    next_class_id: u32,
    next_method_id: u32,
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, name: impl Into<String>, super_class: Option<ClassId>) -> ClassId {
        self.insert_class(name, false, super_class)
    }

    pub fn add_interface(&mut self, name: impl Into<String>) -> ClassId {
        self.insert_class(name, true, None)
    }

    fn insert_class(&mut self, name: impl Into<String>, is_interface: bool, super_class: Option<ClassId>) -> ClassId {
        let id = ClassId(self.next_class_id);
        self.next_class_id += 1;
        if let Some(sup) = super_class {
            if let Some(sup_class) = self.classes.get_mut(&sup) {
                sup_class.direct_subclasses.push(id);
            }
        }
        self.classes.insert(
            id,
            Class {
                id,
                name: name.into(),
                is_interface,
                super_class,
                direct_subclasses: Vec::new(),
                direct_sub_interfaces: Vec::new(),
                direct_implementors: Vec::new(),
                declared_methods: IndexMap::new(),
            },
        );
        id
    }

    /// Record that `class` implements (if concrete) or extends (if itself
    /// an interface) `iface`.
    pub fn add_implements(&mut self, class: ClassId, iface: ClassId) {
        let class_is_interface = self.classes.get(&class).map(|c| c.is_interface).unwrap_or(false);
        if let Some(iface_class) = self.classes.get_mut(&iface) {
            if class_is_interface {
                iface_class.direct_sub_interfaces.push(class);
            } else {
                iface_class.direct_implementors.push(class);
            }
        }
    }

    pub fn add_method(
        &mut self,
        declaring_class: ClassId,
        subsignature: Subsignature,
        is_abstract: bool,
        is_static: bool,
        param_count: usize,
        body: Option<MethodBody>,
    ) -> MethodId {
        let id = MethodId(self.next_method_id);
        self.next_method_id += 1;
        if let Some(class) = self.classes.get_mut(&declaring_class) {
            class.declared_methods.insert(subsignature.clone(), id);
        }
        self.methods.insert(
            id,
            Method {
                id,
                declaring_class,
                subsignature,
                is_abstract,
                is_static,
                param_count,
                body,
            },
        );
        id
    }

    pub fn class(&self, id: ClassId) -> Option<&Class> {
        self.classes.get(&id)
    }

    pub fn method(&self, id: MethodId) -> Option<&Method> {
        self.methods.get(&id)
    }

    pub fn is_interface(&self, c: ClassId) -> bool {
        self.classes.get(&c).map(|c| c.is_interface).unwrap_or(false)
    }

    pub fn super_class(&self, c: ClassId) -> Option<ClassId> {
        self.classes.get(&c).and_then(|c| c.super_class)
    }

    pub fn direct_subclasses(&self, c: ClassId) -> &[ClassId] {
        self.classes.get(&c).map(|c| c.direct_subclasses.as_slice()).unwrap_or(&[])
    }

    pub fn direct_sub_interfaces(&self, c: ClassId) -> &[ClassId] {
        self.classes
            .get(&c)
            .map(|c| c.direct_sub_interfaces.as_slice())
            .unwrap_or(&[])
    }

    pub fn direct_implementors(&self, c: ClassId) -> &[ClassId] {
        self.classes
            .get(&c)
            .map(|c| c.direct_implementors.as_slice())
            .unwrap_or(&[])
    }

    /// The method declared directly in `class` under `subsignature`, not
    /// walking superclasses. Used as the building block for virtual
    /// dispatch resolution.
    pub fn declared_method(&self, class: ClassId, subsignature: &Subsignature) -> Option<MethodId> {
        self.classes.get(&class)?.declared_methods.get(subsignature).copied()
    }

    /// All methods declared directly in `class`, in declaration order.
    pub fn declared_methods(&self, class: ClassId) -> impl Iterator<Item = (&Subsignature, MethodId)> {
        self.classes
            .get(&class)
            .into_iter()
            .flat_map(|c| c.declared_methods.iter().map(|(sig, id)| (sig, *id)))
    }

    /// Every class and interface id in the hierarchy.
    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes.keys().copied()
    }

    /// Walk from `class` up through superclasses looking for the nearest
    /// declaration of `subsignature`. This is the method resolution rule
    /// virtual/interface/special dispatch all build on.
    pub fn resolve_method(&self, class: ClassId, subsignature: &Subsignature) -> Option<MethodId> {
        let mut cur = Some(class);
        while let Some(c) = cur {
            if let Some(m) = self.declared_method(c, subsignature) {
                return Some(m);
            }
            cur = self.super_class(c);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subclass_links_are_recorded() {
        let mut h = ClassHierarchy::new();
        let object = h.add_class("Object", None);
        let animal = h.add_class("Animal", Some(object));
        let dog = h.add_class("Dog", Some(animal));
        assert_eq!(h.direct_subclasses(object), &[animal]);
        assert_eq!(h.direct_subclasses(animal), &[dog]);
        assert_eq!(h.super_class(dog), Some(animal));
    }

    #[test]
    fn implements_distinguishes_class_vs_interface() {
        let mut h = ClassHierarchy::new();
        let runnable = h.add_interface("Runnable");
        let dog = h.add_class("Dog", None);
        h.add_implements(dog, runnable);
        assert_eq!(h.direct_implementors(runnable), &[dog]);
        assert!(h.direct_sub_interfaces(runnable).is_empty());
    }

    #[test]
    fn resolve_method_walks_superclasses() {
        let mut h = ClassHierarchy::new();
        let animal = h.add_class("Animal", None);
        let dog = h.add_class("Dog", Some(animal));
        let sig = Subsignature::new("speak()");
        let m = h.add_method(animal, sig.clone(), false, false, 0, None);
        assert_eq!(h.resolve_method(dog, &sig), Some(m));
        assert_eq!(h.declared_method(dog, &sig), None);
    }
}
