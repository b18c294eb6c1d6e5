//! Iterator-based syntax traversal.
//!
//! Provides a lazy pre-order iterator over the named nodes below a root,
//! so consumers can filter and fold without writing their own recursion.
//!
//! # Example
//!
//! ```ignore
//! use disposal_lint::syntax::{kinds, Descendants};
//!
//! let creations = Descendants::new(file.root())
//!     .filter(|node| kinds::is_resource_creation(node.kind()))
//!     .count();
//! ```

use tree_sitter::Node;

use super::kinds;

/// Lazy pre-order iterator over named nodes, the root included.
///
/// Uses an explicit stack so deeply nested expressions never recurse.
pub struct Descendants<'t> {
    stack: Vec<Node<'t>>,
}

impl<'t> Descendants<'t> {
    pub fn new(root: Node<'t>) -> Self {
        Self { stack: vec![root] }
    }

    /// Only yield nodes of the given kind.
    pub fn of_kind(root: Node<'t>, kind: &'static str) -> impl Iterator<Item = Node<'t>> {
        Self::new(root).filter(move |node| node.kind() == kind)
    }
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
        // Reverse so the leftmost child is visited first
        self.stack.extend(children.into_iter().rev());
        Some(node)
    }
}

/// Named children of a node, comments excluded.
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != kinds::COMMENT)
        .collect()
}

/// All children of a node, anonymous tokens included.
pub fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Strict ancestors of a node, innermost first.
pub fn ancestors<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    std::iter::successors(node.parent(), |n| n.parent())
}
