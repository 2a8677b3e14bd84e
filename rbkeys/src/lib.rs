//! An ordered store of unique integer keys backed by a red-black tree.
//!
//! The tree keeps parent links and a per-tree black sentinel in place of null links, and its
//! nodes live in an arena owned by the tree. Every accepted [`RbTree::insert`] and
//! [`RbTree::delete`] leaves the tree balanced, so lookups are `O(log n)` in the worst case.
//!
//! ```
//! use rbkeys::{Color, RbTree};
//!
//! let mut tree = RbTree::new();
//! for key in 1..=3 {
//!     tree.insert(key).unwrap();
//! }
//!
//! assert!(tree.contains(2));
//! assert_eq!(tree.traverse(), vec![(2, Color::Black), (1, Color::Red), (3, Color::Red)]);
//! ```
pub mod config;
pub mod error;
pub mod rbtree;
mod snapshot;

pub use config::Config;
pub use error::{LoadError, TreeError, Violation};
pub use rbtree::iterator::{Iter, Preorder};
pub use rbtree::{Color, RbTree};
pub use snapshot::Entry;

/// The key type stored in the tree.
pub type Key = i64;
