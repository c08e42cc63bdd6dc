use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

/// A chain of name→value bindings with lexical parent lookup.
///
/// Lookup walks to the root; assignment is always local to the current
/// frame. There is no removal and no shadowing rule beyond ordinary
/// lexical scope. The root namespace (no parent) holds the standard
/// library; every `function` body allocates a child namespace whose
/// parent is the namespace it was defined in.
pub struct Namespace {
    parent: Option<Rc<RefCell<Namespace>>>,
    bindings: HashMap<String, Value>,
}

pub type NsRef = Rc<RefCell<Namespace>>;

impl Namespace {
    pub fn root() -> NsRef {
        Rc::new(RefCell::new(Namespace {
            parent: None,
            bindings: HashMap::new(),
        }))
    }

    pub fn child(parent: &NsRef) -> NsRef {
        Rc::new(RefCell::new(Namespace {
            parent: Some(Rc::clone(parent)),
            bindings: HashMap::new(),
        }))
    }

    /// Bind `name` in the local frame, shadowing any parent binding.
    pub fn bind(ns: &NsRef, name: impl Into<String>, value: Value) {
        ns.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Walk from `ns` to the root looking for `name`.
    pub fn lookup(ns: &NsRef, name: &str) -> Option<Value> {
        let this = ns.borrow();
        if let Some(v) = this.bindings.get(name) {
            return Some(v.clone());
        }
        match &this.parent {
            Some(parent) => Namespace::lookup(parent, name),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types;

    #[test]
    fn lookup_walks_parent_chain() {
        let root = Namespace::root();
        Namespace::bind(&root, "x", Value::int(types::int_type(), 1));
        let child = Namespace::child(&root);
        assert_eq!(Namespace::lookup(&child, "x").unwrap().as_int(), Some(1));
    }

    #[test]
    fn local_binding_shadows_parent() {
        let root = Namespace::root();
        Namespace::bind(&root, "x", Value::int(types::int_type(), 1));
        let child = Namespace::child(&root);
        Namespace::bind(&child, "x", Value::int(types::int_type(), 2));
        assert_eq!(Namespace::lookup(&child, "x").unwrap().as_int(), Some(2));
        assert_eq!(Namespace::lookup(&root, "x").unwrap().as_int(), Some(1));
    }

    #[test]
    fn unbound_name_is_none() {
        let root = Namespace::root();
        assert!(Namespace::lookup(&root, "nope").is_none());
    }
}
