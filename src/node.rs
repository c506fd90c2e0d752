use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::value::Value;

/// A lazy sequence of nodes, as produced by query steps.
pub type Nodes = Box<dyn Iterator<Item = Node>>;

/// A node in an indented tree.
///
/// Nodes are shared handles: cloning a `Node` clones the handle, not the
/// subtree, so a node reached through two different paths is the same node.
/// Each node carries a name (possibly empty), an optional [`Value`], its
/// children in insertion order, and a weak link back to its parent. A node
/// with no parent is a root.
///
/// # Examples
///
/// ```
/// use sprig_lang::{Node, Value};
///
/// let doc = Node::new("");
/// let item = Node::with_value("item", Value::Str("first".to_string()));
/// doc.push(item.clone());
///
/// assert_eq!(item.parent().unwrap().ptr_eq(&doc), true);
/// assert_eq!(doc.child(0).unwrap().name(), "item");
/// ```
#[derive(Clone)]
pub struct Node {
    inner: Rc<RefCell<Inner>>,
}

struct Inner {
    name: String,
    value: Option<Value>,
    parent: Weak<RefCell<Inner>>,
    children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Node {
        Node {
            inner: Rc::new(RefCell::new(Inner {
                name: name.into(),
                value: None,
                parent: Weak::new(),
                children: Vec::new(),
            })),
        }
    }

    pub fn with_value(name: impl Into<String>, value: Value) -> Node {
        let node = Node::new(name);
        node.set_value(Some(value));
        node
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.inner.borrow_mut().name = name.into();
    }

    pub fn value(&self) -> Option<Value> {
        self.inner.borrow().value.clone()
    }

    pub fn set_value(&self, value: Option<Value>) {
        self.inner.borrow_mut().value = value;
    }

    pub fn parent(&self) -> Option<Node> {
        let parent = self.inner.borrow().parent.upgrade()?;
        Some(Node { inner: parent })
    }

    /// Append `child`, reparenting it under this node.
    pub fn push(&self, child: Node) {
        child.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
        self.inner.borrow_mut().children.push(child);
    }

    pub fn children(&self) -> Vec<Node> {
        self.inner.borrow().children.clone()
    }

    pub fn child(&self, index: usize) -> Option<Node> {
        self.inner.borrow().children.get(index).cloned()
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    /// The topmost ancestor, or this node itself when it has no parent.
    pub fn root(&self) -> Node {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Number of ancestors above this node.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Index of this node among its siblings, by handle identity.
    pub fn position(&self) -> Option<usize> {
        let parent = self.parent()?;
        parent.children().iter().position(|c| c.ptr_eq(self))
    }

    /// The sibling `offset` positions away, wrapping around the sibling
    /// list in either direction.
    pub fn sibling(&self, offset: isize) -> Option<Node> {
        let parent = self.parent()?;
        let count = parent.child_count() as isize;
        let index = self.position()? as isize;
        parent.child((index + offset).rem_euclid(count) as usize)
    }

    /// The closest of this node and its ancestors whose name is `name`.
    pub fn ancestor_named(&self, name: &str) -> Option<Node> {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.name() == name {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// Depth-first pre-order walk over this node and its descendants.
    pub fn walk(&self) -> Walk {
        Walk {
            stack: vec![self.clone()],
        }
    }

    /// Whether two handles refer to the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Pre-order iterator returned by [`Node::walk`].
pub struct Walk {
    stack: Vec<Node>,
}

impl Iterator for Walk {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let node = self.stack.pop()?;
        for child in node.children().into_iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

/// Structural equality: same name, value, and children, position for
/// position. Use [`Node::ptr_eq`] for handle identity.
impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.name() != other.name() || self.value() != other.value() {
            return false;
        }
        let ours = self.children();
        let theirs = other.children();
        ours.len() == theirs.len() && ours.iter().zip(theirs.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("name", &self.name());
        if let Some(value) = self.value() {
            s.field("value", &value);
        }
        s.field("children", &self.children());
        s.finish()
    }
}

/// Renders the node's children as indented-tree source, treating the node
/// as a document root.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::output::to_source(self))
    }
}
