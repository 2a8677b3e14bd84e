use super::{Color, NodeId, RbTree, NIL};
use crate::Key;

/// An iterator over the keys of a [`RbTree`] in ascending order.
pub struct Iter<'tree> {
    tree: &'tree RbTree,
    visit: NodeId,
    stack: Vec<NodeId>,
    remaining_elements: usize,
}

impl<'tree> Iter<'tree> {
    pub fn new(tree: &'tree RbTree) -> Self {
        Self {
            tree,
            visit: tree.root(),
            stack: Vec::with_capacity(8),
            remaining_elements: tree.len(),
        }
    }
}

impl<'tree> Iterator for Iter<'tree> {
    type Item = Key;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while self.visit != NIL {
            self.stack.push(self.visit);
            self.visit = self.tree.node(self.visit).left;
        }

        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.visit = node.right;
        self.remaining_elements -= 1;
        Some(node.key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining_elements, Some(self.remaining_elements))
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// An iterator over the `(key, color)` pairs of a [`RbTree`] in preorder: a node, then its
/// left subtree, then its right subtree.
pub struct Preorder<'tree> {
    tree: &'tree RbTree,
    stack: Vec<NodeId>,
    remaining_elements: usize,
}

impl<'tree> Preorder<'tree> {
    pub fn new(tree: &'tree RbTree) -> Self {
        let mut stack = Vec::with_capacity(8);
        if tree.root() != NIL {
            stack.push(tree.root());
        }

        Self {
            tree,
            stack,
            remaining_elements: tree.len(),
        }
    }
}

impl<'tree> Iterator for Preorder<'tree> {
    type Item = (Key, Color);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        if node.right != NIL {
            self.stack.push(node.right);
        }
        if node.left != NIL {
            self.stack.push(node.left);
        }
        self.remaining_elements -= 1;
        Some((node.key, node.color))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining_elements, Some(self.remaining_elements))
    }
}

impl ExactSizeIterator for Preorder<'_> {}

impl<'tree> IntoIterator for &'tree RbTree {
    type Item = Key;
    type IntoIter = Iter<'tree>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
