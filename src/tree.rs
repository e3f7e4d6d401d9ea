//! Tree data structure used by the search

use std::{cell::RefCell, rc::{Rc, Weak}};

/// Strong reference to a tree node
pub type NodeRef<T> = Rc<RefCell<Node<T>>>;
/// Weak reference to a tree node (to break reference cycles)
pub type WeakNodeRef<T> = Weak<RefCell<Node<T>>>;

/// A node in the tree structure
///
/// A node owns its children; the link back to the parent is weak, so
/// dropping the root drops the whole tree at once.
///
/// # Type Parameters
/// - `T`: The data type stored in the node
pub struct Node<T>{
    parent: Option<WeakNodeRef<T>>,
    children: Vec<NodeRef<T>>,
    data: T
}

impl<T> Node<T>{
    /// Creates a new root node with given data
    ///
    /// # Parameters
    /// - `data`: The data to store in the root node
    #[inline]
    pub fn new_root(data: T) -> NodeRef<T>{
        Rc::new(RefCell::new(Node{ parent: None, children: Vec::new(), data }))
    }

    /// Checks if this node is the root (has no parent)
    #[inline]
    pub fn is_root(&self) -> bool{
        self.parent.is_none()
    }

    /// Gets the parent node if it exists
    #[inline]
    pub fn get_parent(&self) -> Option<NodeRef<T>>{
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Children in expansion order
    #[inline]
    pub fn children(&self) -> &[NodeRef<T>]{
        &self.children
    }

    /// Number of children
    #[inline]
    pub fn len(&self) -> usize{
        self.children.len()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool{
        self.children.is_empty()
    }

    /// Appends a new child node holding `data`
    ///
    /// # Parameters
    /// - `node`: The parent node
    /// - `data`: The data for the new child
    ///
    /// # Returns
    /// Reference to the newly created child node
    #[inline]
    pub fn push_child(node: &NodeRef<T>, data: T) -> NodeRef<T>{
        let ref_node = Rc::new(RefCell::new(
            Node{ parent: Some(Rc::downgrade(node)), children: Vec::new(), data }
        ));

        node.borrow_mut().children.push(Rc::clone(&ref_node));
        ref_node
    }

    /// Gets a reference to the node's data
    #[inline]
    pub fn get(&self) -> &T{
        &self.data
    }

    /// Gets a mutable reference to the node's data
    #[inline]
    pub fn get_mut(&mut self) -> &mut T{
        &mut self.data
    }
}

/// Counts the nodes of the subtree rooted at `node`, itself included.
pub fn count_nodes<T>(node: &NodeRef<T>) -> usize{
    1 + node.borrow().children.iter().map(count_nodes).sum::<usize>()
}
