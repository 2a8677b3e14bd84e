//! Snapshots and drawings of an [`rbkeys::RbTree`].
//!
//! Both formats are built on the tree's preorder `(key, color)` sequence, see
//! [`RbTree::traverse`](rbkeys::RbTree::traverse), and never look at the tree's internals.
pub mod svg;
pub mod text;

pub use svg::{draw_to_file, render, DrawOptions, Drawing};
pub use text::{parse, read_tree, write, ParseError, TextError};
