use crate::Key;
use std::error;
use std::fmt;

/// A possible error value when mutating a [`RbTree`](crate::RbTree).
///
/// A failed operation never leaves a partial mutation behind, the tree is exactly as it was
/// before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The key is already present in the tree.
    DuplicateKey(Key),
    /// The key is not present in the tree.
    NotFound(Key),
    /// No more nodes could be allocated for the tree.
    OutOfMemory,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DuplicateKey(key) => write!(f, "key {} is already in the tree", key),
            Self::NotFound(key) => write!(f, "key {} does not exist", key),
            Self::OutOfMemory => f.write_str("Out of memory"),
        }
    }
}

impl error::Error for TreeError {}

/// A broken structural rule found by [`RbTree::validate`](crate::RbTree::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The sentinel is not black, or one of its links was rewritten.
    Sentinel,
    /// The root of a non-empty tree is red.
    RedRoot(Key),
    /// A red node has a red child.
    RedRed { parent: Key, child: Key },
    /// A path ending below `key` crosses a different number of black nodes than the others.
    BlackHeight {
        key: Key,
        expected: usize,
        found: usize,
    },
    /// The key is out of order with respect to one of its ancestors.
    Order(Key),
    /// The child's parent link does not point back at its parent.
    ParentLink(Key),
    /// The number of reachable nodes does not match the recorded length.
    Count { expected: usize, found: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Sentinel => f.write_str("the sentinel was modified"),
            Self::RedRoot(key) => write!(f, "root {} is red", key),
            Self::RedRed { parent, child } => {
                write!(f, "red node {} has a red child {}", parent, child)
            }
            Self::BlackHeight {
                key,
                expected,
                found,
            } => write!(
                f,
                "path below {} has {} black nodes, expected {}",
                key, found, expected
            ),
            Self::Order(key) => write!(f, "key {} is out of order", key),
            Self::ParentLink(key) => write!(f, "node {} has a dangling parent link", key),
            Self::Count { expected, found } => write!(
                f,
                "expected {} nodes in the tree but found {}",
                expected, found
            ),
        }
    }
}

impl error::Error for Violation {}

/// Error returned when rebuilding a tree from a preorder sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    Tree(TreeError),
    Violation(Violation),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Tree(e) => write!(f, "could not load tree: {}", e),
            Self::Violation(v) => write!(f, "not a valid red-black tree: {}", v),
        }
    }
}

impl error::Error for LoadError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Tree(e) => Some(e),
            Self::Violation(v) => Some(v),
        }
    }
}

impl From<TreeError> for LoadError {
    fn from(e: TreeError) -> Self {
        Self::Tree(e)
    }
}

impl From<Violation> for LoadError {
    fn from(v: Violation) -> Self {
        Self::Violation(v)
    }
}
