//! Class-Hierarchy-Analysis: resolving a call site's possible targets from
//! the static class hierarchy alone, and the worklist that turns this into
//! a whole call graph (C4).

use std::collections::{HashSet, VecDeque};

use wpa_core::{CallKind, CallSite, CallSiteRef, ClassHierarchy, ClassId, MethodId, Stmt, StmtIndex, Subsignature};

use crate::callgraph::CallGraph;

/// The Tai-e-style dispatch rule: starting at `class`, find the nearest
/// declaration of `subsignature`. If that declaration is concrete, it's the
/// target. If it's abstract, the walk stops there and returns `None` — an
/// abstract redeclaration in `class` prunes any concrete implementation an
/// ancestor might have, since `class` itself has committed to overriding
/// the method without providing a body.
pub fn dispatch(hierarchy: &ClassHierarchy, class: ClassId, subsignature: &Subsignature) -> Option<MethodId> {
    let mut cur = Some(class);
    while let Some(c) = cur {
        if let Some(m) = hierarchy.declared_method(c, subsignature) {
            return if hierarchy.method(m)?.is_abstract { None } else { Some(m) };
        }
        cur = hierarchy.super_class(c);
    }
    None
}

/// `class` and every class reachable from it via subclassing,
/// sub-interfacing, or interface implementation.
fn subtypes_including_self(hierarchy: &ClassHierarchy, class: ClassId) -> Vec<ClassId> {
    let mut result = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![class];
    while let Some(c) = stack.pop() {
        if !seen.insert(c) {
            continue;
        }
        result.push(c);
        stack.extend(hierarchy.direct_subclasses(c).iter().copied());
        stack.extend(hierarchy.direct_sub_interfaces(c).iter().copied());
        stack.extend(hierarchy.direct_implementors(c).iter().copied());
    }
    result
}

/// Every method a call site could invoke under CHA: exactly one for
/// `Static`/`Special`, one per concrete override across the declaring
/// class's subtype lattice for `Virtual`/`Interface`, none for `Other`.
pub fn resolve(hierarchy: &ClassHierarchy, call: &CallSite) -> Vec<MethodId> {
    match call.kind {
        CallKind::Static => hierarchy
            .resolve_method(call.method_ref.declaring_class, &call.method_ref.subsignature)
            .into_iter()
            .collect(),
        CallKind::Special => dispatch(hierarchy, call.method_ref.declaring_class, &call.method_ref.subsignature)
            .into_iter()
            .collect(),
        CallKind::Virtual | CallKind::Interface => {
            let mut found: HashSet<MethodId> = HashSet::new();
            for sub in subtypes_including_self(hierarchy, call.method_ref.declaring_class) {
                if let Some(m) = dispatch(hierarchy, sub, &call.method_ref.subsignature) {
                    found.insert(m);
                }
            }
            found.into_iter().collect()
        }
        CallKind::Other => Vec::new(),
    }
}

/// Build the whole-program call graph by a worklist starting from `entry`:
/// every reachable method is scanned for its call sites, each resolved
/// under CHA, with newly discovered callees enqueued in turn.
pub fn build(hierarchy: &ClassHierarchy, entry: MethodId) -> CallGraph {
    let mut cg = CallGraph::new();
    let mut worklist = VecDeque::from([entry]);
    let mut processed = HashSet::new();

    while let Some(m) = worklist.pop_front() {
        if !processed.insert(m) {
            continue;
        }
        cg.add_method(m);
        let Some(method) = hierarchy.method(m) else { continue };
        let Some(body) = &method.body else { continue };

        for (i, stmt) in body.stmts.iter().enumerate() {
            if let Stmt::Invoke { call, .. } = stmt {
                let site = CallSiteRef {
                    method: m,
                    stmt: StmtIndex(i as u32),
                };
                for callee in resolve(hierarchy, call) {
                    cg.add_edge(m, callee, site, call.kind);
                    if !processed.contains(&callee) {
                        worklist.push_back(callee);
                    }
                }
            }
        }
    }

    cg
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpa_core::{CallSite, MethodRef, Stmt as CoreStmt, VarId, VarType};
    use std::collections::HashMap;

    fn sig(s: &str) -> Subsignature {
        Subsignature::new(s)
    }

    /// Animal { speak() } <- Dog(speak overrides), Cat (no override, uses
    /// Animal.speak); a virtual call site on static type Animal dispatches
    /// to both Dog.speak and Animal.speak (inherited by Cat).
    fn build_animal_hierarchy() -> (ClassHierarchy, ClassId, MethodId, MethodId) {
        let mut h = ClassHierarchy::new();
        let animal = h.add_class("Animal", None);
        let dog = h.add_class("Dog", Some(animal));
        let _cat = h.add_class("Cat", Some(animal));

        let animal_speak = h.add_method(
            animal,
            sig("speak()"),
            false,
            false,
            0,
            Some(wpa_core::MethodBody::new(vec![CoreStmt::Return(None)], vec![], HashMap::new())),
        );
        let dog_speak = h.add_method(
            dog,
            sig("speak()"),
            false,
            false,
            0,
            Some(wpa_core::MethodBody::new(vec![CoreStmt::Return(None)], vec![], HashMap::new())),
        );
        (h, animal, animal_speak, dog_speak)
    }

    #[test]
    fn dispatch_finds_nearest_concrete_override() {
        let (h, _animal, animal_speak, dog_speak) = build_animal_hierarchy();
        let dog = h.class_ids().find(|&c| h.class(c).unwrap().name == "Dog").unwrap();
        let cat = h.class_ids().find(|&c| h.class(c).unwrap().name == "Cat").unwrap();
        assert_eq!(dispatch(&h, dog, &sig("speak()")), Some(dog_speak));
        assert_eq!(dispatch(&h, cat, &sig("speak()")), Some(animal_speak));
    }

    #[test]
    fn virtual_call_resolves_to_every_concrete_override() {
        let (h, animal, animal_speak, dog_speak) = build_animal_hierarchy();
        let call = CallSite {
            kind: CallKind::Virtual,
            method_ref: MethodRef {
                declaring_class: animal,
                subsignature: sig("speak()"),
            },
            receiver: Some(VarId(0)),
            args: vec![],
        };
        let mut callees = resolve(&h, &call);
        callees.sort_by_key(|m| m.0);
        let mut expected = vec![animal_speak, dog_speak];
        expected.sort_by_key(|m| m.0);
        assert_eq!(callees, expected);
    }

    #[test]
    fn abstract_declaration_is_skipped_during_dispatch() {
        let mut h = ClassHierarchy::new();
        let shape = h.add_class("Shape", None);
        let circle = h.add_class("Circle", Some(shape));
        let _abstract_area = h.add_method(shape, sig("area()"), true, false, 0, None);
        let circle_area = h.add_method(
            circle,
            sig("area()"),
            false,
            false,
            0,
            Some(wpa_core::MethodBody::new(vec![CoreStmt::Return(None)], vec![], HashMap::new())),
        );
        assert_eq!(dispatch(&h, circle, &sig("area()")), Some(circle_area));
    }

    /// A { f() concrete } <- B (f() redeclared abstract) <- C (f()
    /// overridden concrete). Dispatch starting at B must stop at B's own
    /// abstract redeclaration rather than climbing past it to A's
    /// implementation; only C provides a usable override.
    #[test]
    fn abstract_redeclaration_prunes_ancestors_implementation() {
        let mut h = ClassHierarchy::new();
        let a = h.add_class("A", None);
        let b = h.add_class("B", Some(a));
        let c = h.add_class("C", Some(b));
        let sig_f = sig("f()");

        let a_f = h.add_method(
            a,
            sig_f.clone(),
            false,
            false,
            0,
            Some(wpa_core::MethodBody::new(vec![CoreStmt::Return(None)], vec![], HashMap::new())),
        );
        let _b_f = h.add_method(b, sig_f.clone(), true, false, 0, None);
        let c_f = h.add_method(
            c,
            sig_f.clone(),
            false,
            false,
            0,
            Some(wpa_core::MethodBody::new(vec![CoreStmt::Return(None)], vec![], HashMap::new())),
        );

        assert_eq!(dispatch(&h, b, &sig_f), None);
        assert_eq!(dispatch(&h, c, &sig_f), Some(c_f));

        // A call site whose static receiver type is B: only B's subtypes
        // (B itself, abstract, and C) are candidate runtime types, so A's
        // implementation is never a candidate target in the first place.
        let call = CallSite {
            kind: CallKind::Virtual,
            method_ref: MethodRef {
                declaring_class: b,
                subsignature: sig_f,
            },
            receiver: Some(VarId(0)),
            args: vec![],
        };
        let callees = resolve(&h, &call);
        assert_eq!(callees, vec![c_f]);
        assert!(!callees.contains(&a_f));
    }

    #[test]
    fn build_walks_from_entry_through_virtual_calls() {
        let mut h = ClassHierarchy::new();
        let animal = h.add_class("Animal", None);
        let dog = h.add_class("Dog", Some(animal));

        let speak_sig = sig("speak()");
        let animal_speak = h.add_method(
            animal,
            speak_sig.clone(),
            false,
            false,
            0,
            Some(wpa_core::MethodBody::new(vec![CoreStmt::Return(None)], vec![], HashMap::new())),
        );
        let dog_speak = h.add_method(
            dog,
            speak_sig.clone(),
            false,
            false,
            0,
            Some(wpa_core::MethodBody::new(vec![CoreStmt::Return(None)], vec![], HashMap::new())),
        );

        let main_body = wpa_core::MethodBody::new(
            vec![
                CoreStmt::Invoke {
                    lhs: None,
                    call: CallSite {
                        kind: CallKind::Virtual,
                        method_ref: MethodRef {
                            declaring_class: animal,
                            subsignature: speak_sig,
                        },
                        receiver: Some(VarId(0)),
                        args: vec![],
                    },
                },
                CoreStmt::Return(None),
            ],
            vec![wpa_core::Param {
                var: VarId(0),
                ty: VarType::Other,
            }],
            HashMap::new(),
        );
        let main = h.add_method(animal, sig("main()"), false, true, 1, Some(main_body));

        let cg = build(&h, main);
        assert!(cg.callees_of(main).contains(&animal_speak));
        assert!(cg.callees_of(main).contains(&dog_speak));
    }
}
