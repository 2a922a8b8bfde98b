//! Child collection handed to [`Node::on_init`].
//!
//! Instead of returning `Vec<Box<dyn Node<D>>>` from every `on_init`, nodes push
//! concrete values and the builder takes care of boxing:
//!
//! ```rust
//! use state_tree::{Children, Node};
//!
//! #[derive(Default)]
//! struct Jump;
//! impl Node<()> for Jump {}
//!
//! #[derive(Default)]
//! struct Idle;
//! impl Node<()> for Idle {}
//!
//! struct Grounded;
//! impl Node<()> for Grounded {
//!     fn on_init(&mut self, children: &mut Children<()>) {
//!         children.push(Jump).push_default::<Idle>();
//!     }
//! }
//! ```

use crate::Node;

/// Ordered, write-only list of children being declared by a node.
///
/// Push order is priority order: the first child pushed wins arbitration
/// over every later sibling.
pub struct Children<D> {
    nodes: Vec<Box<dyn Node<D>>>,
}

impl<D: 'static> Children<D> {
    pub(crate) fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Appends a child with the next-lower priority.
    #[inline]
    pub fn push<N: Node<D>>(&mut self, node: N) -> &mut Self {
        self.nodes.push(Box::new(node));
        self
    }

    /// Appends an already boxed child.
    #[inline]
    pub fn push_boxed(&mut self, node: Box<dyn Node<D>>) -> &mut Self {
        self.nodes.push(node);
        self
    }

    /// Shorthand for `push(N::default())`.
    #[inline]
    pub fn push_default<N: Node<D> + Default>(&mut self) -> &mut Self {
        self.push(N::default())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn into_nodes(self) -> Vec<Box<dyn Node<D>>> {
        self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct A;
    impl Node<u32> for A {}

    #[derive(Default)]
    struct B;
    impl Node<u32> for B {}

    #[test]
    fn push_preserves_declaration_order() {
        let mut children = Children::<u32>::new();
        children
            .push(A)
            .push_default::<B>()
            .push_boxed(Box::new(A));

        assert_eq!(children.len(), 3);
        let names: Vec<_> = children.into_nodes().iter().map(|n| n.name()).collect();
        assert_eq!(names, ["A", "B", "A"]);
    }

    #[test]
    fn new_collection_is_empty() {
        let children = Children::<u32>::new();
        assert!(children.is_empty());
    }
}
