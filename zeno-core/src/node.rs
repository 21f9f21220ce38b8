// zeno-core - Script node trees
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! The node tree consumed by the compiler and handed to slot handlers.
//!
//! A tree builder (the parser, or a host constructing requests directly)
//! produces `Node`s; the compiler lowers them to bytecode, and the VM
//! rebuilds transient nodes to pass slot arguments to handlers. Names
//! prefixed with `$` denote variable bindings; the name `root` (or an
//! empty name) marks a structural node whose children are evaluated in
//! order.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::value::Native;

/// A unit of the script tree: a name, an optional value, ordered
/// children, and a back-reference to the containing node.
#[derive(Debug)]
pub struct Node {
    name: String,
    value: Option<Native>,
    children: RefCell<Vec<Rc<Node>>>,
    parent: RefCell<Weak<Node>>,
}

impl Node {
    /// Create a node with no value.
    pub fn new(name: impl Into<String>) -> Rc<Node> {
        Rc::new(Node {
            name: name.into(),
            value: None,
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
        })
    }

    /// Create a node carrying a value.
    pub fn with_value(name: impl Into<String>, value: impl Into<Native>) -> Rc<Node> {
        Rc::new(Node {
            name: name.into(),
            value: Some(value.into()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
        })
    }

    /// Append a child, wiring its parent back-reference to `self`.
    pub fn add_child(self: &Rc<Self>, child: Rc<Node>) {
        *child.parent.borrow_mut() = Rc::downgrade(self);
        self.children.borrow_mut().push(child);
    }

    /// The node's name. Empty for the implicit root.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&Native> {
        self.value.as_ref()
    }

    /// An ordered snapshot of the children. Handles are reference
    /// counted, so this is cheap.
    #[must_use]
    pub fn children(&self) -> Vec<Rc<Node>> {
        self.children.borrow().clone()
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// The containing node, if this node is attached to a tree.
    #[must_use]
    pub fn parent(&self) -> Option<Rc<Node>> {
        self.parent.borrow().upgrade()
    }

    /// The first child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<Rc<Node>> {
        self.children
            .borrow()
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    /// Whether this node is a `$`-prefixed variable binding.
    #[must_use]
    pub fn is_binding(&self) -> bool {
        self.name.starts_with('$')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_child_sets_parent() {
        let root = Node::new("root");
        let child = Node::with_value("status", Native::Num(201.0));
        root.add_child(Rc::clone(&child));

        let parent = child.parent().expect("child should have a parent");
        assert!(Rc::ptr_eq(&parent, &root));
        assert_eq!(root.child_count(), 1);
    }

    #[test]
    fn children_preserve_insertion_order() {
        let root = Node::new("http.response");
        root.add_child(Node::with_value("status", 201.0));
        root.add_child(Node::with_value("body", "created"));

        let names: Vec<_> = root.children().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["status", "body"]);
    }

    #[test]
    fn child_lookup_by_name() {
        let root = Node::new("if");
        root.add_child(Node::new("then"));
        root.add_child(Node::new("else"));

        assert!(root.child("then").is_some());
        assert!(root.child("elif").is_none());
    }

    #[test]
    fn binding_detection() {
        assert!(Node::with_value("$x", "10").is_binding());
        assert!(!Node::new("http.response").is_binding());
    }
}
