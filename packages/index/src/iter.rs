//! In-order iteration over an index.

use collision_map_collision_models::Collision;

use crate::node::Node;

/// Lazy in-order iterator over the records of a
/// [`CollisionIndex`](crate::CollisionIndex), ascending by
/// [`Collision::cmp_key`].
///
/// Holds the chain of ancestors whose record has not been yielded yet, so
/// memory use is bounded by the tree height.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(root: Option<&'a Node>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut link: Option<&'a Node>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Collision;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.record)
    }
}

impl std::iter::FusedIterator for Iter<'_> {}
