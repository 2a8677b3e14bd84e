//! The preorder text format: one `c, k` entry per node, joined by `"; "`, where `c` is `b` for
//! a black node and `r` for a red one.
//!
//! ```
//! use rbkeys::RbTree;
//!
//! let mut tree = RbTree::new();
//! for key in [1, 2, 3] {
//!     tree.insert(key).unwrap();
//! }
//!
//! let text = rbkeys_io::write(&tree);
//! assert_eq!(text, "b, 2; r, 1; r, 3");
//! assert_eq!(rbkeys_io::read_tree(&text).unwrap().traverse(), tree.traverse());
//! ```
use std::error;
use std::fmt;

use log::debug;
use rbkeys::{Color, Config, Key, LoadError, RbTree};

/// Render the tree in the text format. An empty tree is the empty string.
pub fn write(tree: &RbTree) -> String {
    let mut out = String::new();
    for (i, (key, color)) in tree.preorder().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        out.push(color.as_char());
        out.push_str(", ");
        out.push_str(&key.to_string());
    }
    out
}

/// Parse the text format into its preorder entries. Whitespace around colors, keys and
/// separators is ignored, and so is one trailing `;`.
pub fn parse(input: &str) -> Result<Vec<(Key, Color)>, ParseError> {
    let input = input.trim();
    let input = input.strip_suffix(';').unwrap_or(input);
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    input
        .split(';')
        .enumerate()
        .map(|(entry, text)| parse_entry(text).map_err(|reason| ParseError { entry, reason }))
        .collect()
}

fn parse_entry(text: &str) -> Result<(Key, Color), Reason> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Reason::Empty);
    }

    let (color, key) = text.split_once(',').ok_or(Reason::MissingComma)?;
    let color = match color.trim() {
        "b" => Color::Black,
        "r" => Color::Red,
        other => return Err(Reason::Color(other.to_string())),
    };
    let key = key.trim();
    let key = key.parse().map_err(|_| Reason::Key(key.to_string()))?;

    Ok((key, color))
}

/// Parse the text format and rebuild the tree it describes.
pub fn read_tree(input: &str) -> Result<RbTree, TextError> {
    read_tree_with_config(input, Config::default())
}

pub fn read_tree_with_config(input: &str, config: Config) -> Result<RbTree, TextError> {
    let entries = parse(input)?;
    debug!("Rebuilding a tree from {} entries", entries.len());
    Ok(RbTree::from_preorder_with_config(entries, config)?)
}

/// An entry of the text format that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Zero based position of the entry.
    pub entry: usize,
    pub reason: Reason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    Empty,
    MissingComma,
    Color(String),
    Key(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "entry {}: ", self.entry + 1)?;
        match &self.reason {
            Reason::Empty => f.write_str("empty entry"),
            Reason::MissingComma => f.write_str("expected `color, key`"),
            Reason::Color(color) => write!(f, "unknown color `{}`, expected `b` or `r`", color),
            Reason::Key(key) => write!(f, "`{}` is not an integer key", key),
        }
    }
}

impl error::Error for ParseError {}

/// Error returned by [`read_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    Parse(ParseError),
    Load(LoadError),
}

impl fmt::Display for TextError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "malformed tree text, {}", e),
            Self::Load(e) => e.fmt(f),
        }
    }
}

impl error::Error for TextError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Load(e) => Some(e),
        }
    }
}

impl From<ParseError> for TextError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<LoadError> for TextError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}
