//! The red-black tree behind [`RbTree`].
//!
//! Nodes keep a parent link and live in a per-tree arena, slot [`NIL`] of which is a black
//! sentinel standing in for every missing child and for the root's parent. Reading through the
//! sentinel is always allowed, writing to it never is: rotation, transplant and the fixups
//! skip the sentinel, and the deletion fixup carries the parent of its cursor explicitly
//! because the cursor may be the sentinel.
//!
//! After every completed operation:
//! 1. The root and the sentinel are black.
//! 2. Children of a red node are black.
//! 3. Every path from a node to a descendant sentinel goes through the same number of black
//!    nodes.
//! 4. Keys in a left subtree are strictly smaller, keys in a right subtree strictly larger.

use std::cmp::Ordering::{Equal, Greater, Less};
use std::fmt;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{Config, Key, LoadError, TreeError};
use arena::NodeArena;
use iterator::{Iter, Preorder};

pub(crate) mod arena;
mod check;
pub mod iterator;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Single letter form, `r` or `b`.
    pub fn as_char(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Black => 'b',
        }
    }
}

pub(crate) type NodeId = usize;

/// The sentinel's slot in the arena.
pub(crate) const NIL: NodeId = 0;

/// Which way a rotation turns, or which child of a node is meant.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Direction {
    Left,
    Right,
}

impl Direction {
    #[inline]
    fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

pub(crate) struct Node {
    key: Key,
    color: Color,
    parent: NodeId,
    left: NodeId,
    right: NodeId,
}

impl Node {
    fn new(key: Key) -> Self {
        Self {
            key,
            color: Color::Red,
            parent: NIL,
            left: NIL,
            right: NIL,
        }
    }

    fn sentinel() -> Self {
        Self {
            key: 0,
            color: Color::Black,
            parent: NIL,
            left: NIL,
            right: NIL,
        }
    }
}

/// An ordered set of unique integer keys.
///
/// The tree is not safe for concurrent mutation; wrap it in a lock when it is shared, since
/// the fixups pass through states that break the invariants.
pub struct RbTree {
    root: NodeId,
    len: usize,
    arena: NodeArena,
}

impl Default for RbTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RbTree {
    /// Create an empty tree.
    #[inline]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            root: NIL,
            len: 0,
            arena: NodeArena::new(&config),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root == NIL
    }

    /// Returns `true` if the key is in the tree.
    #[inline]
    pub fn contains(&self, key: Key) -> bool {
        self.find(key) != NIL
    }

    /// Remove every key. The sentinel is kept, node slots are released.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = NIL;
        self.len = 0;
    }

    /// Iterate over the keys in ascending order.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Iterate over `(key, color)` pairs in preorder.
    #[inline]
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder::new(self)
    }

    /// The preorder `(key, color)` sequence of the tree. It describes the shape completely, see
    /// [`RbTree::from_preorder`].
    pub fn traverse(&self) -> Vec<(Key, Color)> {
        self.preorder().collect()
    }

    /// Number of nodes on the longest path from the root down to a leaf, `0` when empty.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = Vec::new();
        if self.root != NIL {
            stack.push((self.root, 1));
        }
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            let node = &self.arena[id];
            for child in [node.left, node.right] {
                if child != NIL {
                    stack.push((child, depth + 1));
                }
            }
        }
        height
    }

    /// Black nodes on a path from the root down to the sentinel, counting the sentinel but not
    /// the root. `0` for an empty tree.
    pub fn black_height(&self) -> usize {
        if self.root == NIL {
            return 0;
        }
        let mut count = 1;
        let mut id = self.arena[self.root].left;
        while id != NIL {
            if self.color(id) == Color::Black {
                count += 1;
            }
            id = self.arena[id].left;
        }
        count
    }

    /// Insert a key. Nothing changes when the key is already present or no node could be
    /// allocated for it.
    pub fn insert(&mut self, key: Key) -> Result<(), TreeError> {
        let mut parent = NIL;
        let mut side = Direction::Left;
        let mut cursor = self.root;
        while cursor != NIL {
            parent = cursor;
            side = match key.cmp(&self.arena[cursor].key) {
                Less => Direction::Left,
                Greater => Direction::Right,
                Equal => {
                    debug!("Rejecting insert of {}: already in the tree", key);
                    return Err(TreeError::DuplicateKey(key));
                }
            };
            cursor = self.child(cursor, side);
        }

        let node = self.arena.allocate(key)?;
        self.arena[node].parent = parent;
        if parent == NIL {
            self.root = node;
        } else {
            self.set_child(parent, side, node);
        }
        self.len += 1;

        self.insert_fixup(node);

        #[cfg(test)]
        debug_assert_eq!(
            self.validate(),
            Ok(()),
            "invalid tree after inserting {}:\n{:?}",
            key,
            self
        );

        Ok(())
    }

    /// Delete a key. Nothing changes when the key is not in the tree.
    pub fn delete(&mut self, key: Key) -> Result<(), TreeError> {
        let target = self.find(key);
        if target == NIL {
            debug!("Rejecting delete of {}: not in the tree", key);
            return Err(TreeError::NotFound(key));
        }

        // `fixup` takes over the vacated slot, `fixup_parent` is its parent afterwards. The
        // pair is tracked explicitly since `fixup` may be the sentinel.
        let mut removed_color = self.color(target);
        let fixup;
        let fixup_parent;

        let (left, right) = (self.arena[target].left, self.arena[target].right);
        if left == NIL || right == NIL {
            fixup = if left == NIL { right } else { left };
            fixup_parent = self.parent(target);
            self.transplant(target, fixup);
        } else {
            let successor = self.minimum(right);
            removed_color = self.color(successor);
            fixup = self.arena[successor].right;

            if self.parent(successor) == target {
                fixup_parent = successor;
            } else {
                fixup_parent = self.parent(successor);
                self.transplant(successor, fixup);
                self.arena[successor].right = right;
                self.arena[right].parent = successor;
            }

            self.transplant(target, successor);
            self.arena[successor].left = left;
            self.arena[left].parent = successor;
            self.arena[successor].color = self.color(target);
        }

        self.arena.free(target);
        self.len -= 1;

        if removed_color == Color::Black {
            self.delete_fixup(fixup, fixup_parent);
        }

        #[cfg(test)]
        debug_assert_eq!(
            self.validate(),
            Ok(()),
            "invalid tree after deleting {}:\n{:?}",
            key,
            self
        );

        Ok(())
    }

    /// Rebuild the exact tree described by a preorder `(key, color)` sequence, as produced by
    /// [`RbTree::traverse`]. The input is checked: duplicate keys and sequences that do not
    /// describe a valid red-black tree are rejected. A red root is recolored black.
    pub fn from_preorder<I>(entries: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (Key, Color)>,
    {
        Self::from_preorder_with_config(entries, Config::default())
    }

    pub fn from_preorder_with_config<I>(entries: I, config: Config) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (Key, Color)>,
    {
        let mut tree = Self::with_config(config);
        // the path from the root to the last node that can still receive a right child.
        let mut spine: Vec<NodeId> = Vec::new();

        for (key, color) in entries {
            let node = tree.arena.allocate(key)?;
            tree.arena[node].color = color;
            tree.len += 1;

            let top = match spine.last() {
                Some(&top) => top,
                None => {
                    tree.root = node;
                    spine.push(node);
                    continue;
                }
            };

            match key.cmp(&tree.arena[top].key) {
                Equal => return Err(TreeError::DuplicateKey(key).into()),
                Less => {
                    tree.arena[top].left = node;
                    tree.arena[node].parent = top;
                }
                Greater => {
                    let mut parent = top;
                    spine.pop();
                    while let Some(&above) = spine.last() {
                        match tree.arena[above].key.cmp(&key) {
                            Less => {
                                parent = above;
                                spine.pop();
                            }
                            Equal => return Err(TreeError::DuplicateKey(key).into()),
                            Greater => break,
                        }
                    }
                    tree.arena[parent].right = node;
                    tree.arena[node].parent = parent;
                }
            }
            spine.push(node);
        }

        if tree.root != NIL && tree.color(tree.root) == Color::Red {
            debug!("Recoloring red root {} of a loaded tree", tree.arena[tree.root].key);
            let root = tree.root;
            tree.arena[root].color = Color::Black;
        }

        tree.validate()?;
        Ok(tree)
    }

    /// Number of freed node slots kept for reuse.
    pub fn pooled_nodes(&self) -> usize {
        self.arena.pooled()
    }

    #[inline]
    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.arena[id]
    }

    /// Walk down from the root to the node holding `key`, or to the sentinel.
    pub(crate) fn find(&self, key: Key) -> NodeId {
        let mut cursor = self.root;
        while cursor != NIL {
            let node = &self.arena[cursor];
            match key.cmp(&node.key) {
                Equal => return cursor,
                Less => cursor = node.left,
                Greater => cursor = node.right,
            }
        }
        NIL
    }

    #[inline]
    fn color(&self, id: NodeId) -> Color {
        self.arena[id].color
    }

    #[inline]
    fn parent(&self, id: NodeId) -> NodeId {
        self.arena[id].parent
    }

    #[inline]
    fn child(&self, id: NodeId, side: Direction) -> NodeId {
        match side {
            Direction::Left => self.arena[id].left,
            Direction::Right => self.arena[id].right,
        }
    }

    #[inline]
    fn set_child(&mut self, id: NodeId, side: Direction, child: NodeId) {
        match side {
            Direction::Left => self.arena[id].left = child,
            Direction::Right => self.arena[id].right = child,
        }
    }

    /// Which child of its parent the node is. The node must not be the sentinel.
    #[inline]
    fn side_of(&self, id: NodeId) -> Direction {
        debug_assert_ne!(id, NIL);
        if self.arena[self.parent(id)].left == id {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    /// The sibling of the node's parent, or the sentinel when there is no grandparent.
    fn uncle(&self, id: NodeId) -> NodeId {
        let parent = self.parent(id);
        if parent == NIL {
            return NIL;
        }
        let grandparent = self.parent(parent);
        if grandparent == NIL {
            return NIL;
        }
        self.child(grandparent, self.side_of(parent).opposite())
    }

    pub(crate) fn minimum(&self, mut id: NodeId) -> NodeId {
        while self.arena[id].left != NIL {
            id = self.arena[id].left;
        }
        id
    }

    /// Point `parent`'s link to `old` at `new` instead, or the root when `parent` is the
    /// sentinel.
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if parent == NIL {
            self.root = new;
        } else if self.arena[parent].left == old {
            self.arena[parent].left = new;
        } else {
            self.arena[parent].right = new;
        }
    }

    /// Put the subtree `from` in the place of the subtree `to`.
    pub(crate) fn transplant(&mut self, to: NodeId, from: NodeId) {
        let parent = self.parent(to);
        self.replace_child(parent, to, from);
        if from != NIL {
            self.arena[from].parent = parent;
        }
    }

    /// Rotate around `pivot`. A left rotation lifts the pivot's right child into its place and
    /// makes the pivot its left child, a right rotation is the mirror image.
    pub(crate) fn rotate(&mut self, pivot: NodeId, direction: Direction) {
        let riser = self.child(pivot, direction.opposite());
        debug_assert_ne!(pivot, NIL);
        debug_assert_ne!(riser, NIL, "rotating {:?} without a child to lift", direction);
        trace!(
            "Rotating {:?} around {}, lifting {}",
            direction,
            self.arena[pivot].key,
            self.arena[riser].key
        );

        let moved = self.child(riser, direction);
        self.set_child(pivot, direction.opposite(), moved);
        if moved != NIL {
            self.arena[moved].parent = pivot;
        }

        let above = self.parent(pivot);
        self.set_child(riser, direction, pivot);
        self.arena[pivot].parent = riser;
        self.arena[riser].parent = above;
        self.replace_child(above, pivot, riser);
    }

    fn insert_fixup(&mut self, mut node: NodeId) {
        let mut uncle = self.uncle(node);

        // Case 1: parent and uncle are both red, push the violation up to the grandparent.
        while self.color(self.parent(node)) == Color::Red && self.color(uncle) == Color::Red {
            let parent = self.parent(node);
            let grandparent = self.parent(parent);
            trace!(
                "Insertion case 1: {} with uncle {}",
                self.arena[node].key,
                self.arena[uncle].key
            );
            self.arena[grandparent].color = Color::Red;
            self.arena[uncle].color = Color::Black;
            self.arena[parent].color = Color::Black;
            node = grandparent;
            uncle = self.uncle(node);
        }

        let parent = self.parent(node);
        if self.color(parent) == Color::Black {
            if node == self.root {
                self.arena[node].color = Color::Black;
            }
            return;
        }

        // A red parent is never the root, so the grandparent is a real node.
        let grandparent = self.parent(parent);
        let parent_side = self.side_of(parent);

        // Case 2: the node is on the uncle's side, turn it into the outer configuration.
        let parent = if self.side_of(node) != parent_side {
            trace!(
                "Insertion case 2: {} with uncle {}",
                self.arena[node].key,
                self.arena[uncle].key
            );
            self.rotate(parent, parent_side);
            node
        } else {
            parent
        };

        // Case 3
        trace!(
            "Insertion case 3: {} below {}",
            self.arena[parent].key,
            self.arena[grandparent].key
        );
        self.arena[parent].color = Color::Black;
        self.arena[grandparent].color = Color::Red;
        self.rotate(grandparent, parent_side.opposite());

        let root = self.root;
        self.arena[root].color = Color::Black;
    }

    /// `node` carries an extra black. `parent` is its parent, given explicitly because `node`
    /// may be the sentinel.
    fn delete_fixup(&mut self, mut node: NodeId, mut parent: NodeId) {
        while node != self.root && self.color(node) == Color::Black {
            debug_assert_ne!(parent, NIL);
            // a black sentinel in `node`'s place always has a real sibling, so comparing
            // against the left link is unambiguous.
            let side = if self.arena[parent].left == node {
                Direction::Left
            } else {
                Direction::Right
            };
            let mut sibling = self.child(parent, side.opposite());
            debug_assert_ne!(sibling, NIL);

            if self.color(sibling) == Color::Red {
                trace!(
                    "Deletion case 1: below {} with sibling {}",
                    self.arena[parent].key,
                    self.arena[sibling].key
                );
                self.arena[sibling].color = Color::Black;
                self.arena[parent].color = Color::Red;
                self.rotate(parent, side);
                sibling = self.child(parent, side.opposite());
            }

            let near = self.child(sibling, side);
            let far = self.child(sibling, side.opposite());

            if self.color(near) == Color::Black && self.color(far) == Color::Black {
                trace!(
                    "Deletion case 2: below {} with sibling {}",
                    self.arena[parent].key,
                    self.arena[sibling].key
                );
                self.arena[sibling].color = Color::Red;
                node = parent;
                parent = self.parent(node);
                continue;
            }

            if self.color(far) == Color::Black {
                trace!(
                    "Deletion case 3: below {} with sibling {}",
                    self.arena[parent].key,
                    self.arena[sibling].key
                );
                self.arena[near].color = Color::Black;
                self.arena[sibling].color = Color::Red;
                self.rotate(sibling, side.opposite());
                sibling = self.child(parent, side.opposite());
            }

            trace!(
                "Deletion case 4: below {} with sibling {}",
                self.arena[parent].key,
                self.arena[sibling].key
            );
            let far = self.child(sibling, side.opposite());
            let parent_color = self.color(parent);
            self.arena[sibling].color = parent_color;
            self.arena[parent].color = Color::Black;
            self.arena[far].color = Color::Black;
            self.rotate(parent, side);
            node = self.root;
            parent = NIL;
        }

        if node != NIL {
            self.arena[node].color = Color::Black;
        }
    }
}

/// Indented view of the tree, one `[R]`/`[B]` node per line.
impl fmt::Debug for RbTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn go(f: &mut fmt::Formatter<'_>, tree: &RbTree, id: NodeId, offset: usize) -> fmt::Result {
            if id == NIL {
                return writeln!(f, "{:width$}[B] <nil>", "", width = offset);
            }
            let node = tree.node(id);
            writeln!(
                f,
                "{:width$}[{}] {}",
                "",
                if node.color == Color::Red { "R" } else { "B" },
                node.key,
                width = offset
            )?;
            go(f, tree, node.left, offset + 2)?;
            go(f, tree, node.right, offset + 2)
        }
        go(f, self, self.root, 0)
    }
}

#[cfg(test)]
mod test;
