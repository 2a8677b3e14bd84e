//! SVG drawings of a tree.
//!
//! Every level of the tree is one row of circles. A node is centred in the horizontal interval
//! it owns and hands the left and right halves of that interval to its children.
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::debug;
use rbkeys::{Color, Key, RbTree};

/// Sizes of a drawing, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOptions {
    /// Radius of a node circle.
    pub radius: u32,
    /// Gap between rows, and around the picture.
    pub padding: u32,
    /// The picture is never wider than this.
    pub max_width: u32,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            radius: 15,
            padding: 10,
            max_width: 1000,
        }
    }
}

struct Shape {
    key: Key,
    color: Color,
    left: Option<usize>,
    right: Option<usize>,
    // 1 for the root.
    depth: usize,
}

/// A tree laid out for drawing, written out as an SVG document by its `Display` impl.
pub struct Drawing {
    nodes: Vec<Shape>,
    levels: usize,
    options: DrawOptions,
}

/// Lay out a drawing of the tree, `None` when the tree is empty.
pub fn render(tree: &RbTree, options: DrawOptions) -> Option<Drawing> {
    let entries = tree.traverse();
    if entries.is_empty() {
        return None;
    }

    // Rebuild the shape from the preorder sequence: a key smaller than the last node becomes its
    // left child, otherwise it is the right child of the deepest open node that is smaller.
    let mut nodes: Vec<Shape> = Vec::with_capacity(entries.len());
    let mut spine: Vec<usize> = Vec::new();
    let mut levels = 0;
    for (key, color) in entries {
        let id = nodes.len();
        let depth = match spine.last() {
            None => 1,
            Some(&top) if key < nodes[top].key => {
                nodes[top].left = Some(id);
                nodes[top].depth + 1
            }
            Some(&top) => {
                let mut parent = top;
                while let Some(&above) = spine.last() {
                    if nodes[above].key > key {
                        break;
                    }
                    parent = above;
                    spine.pop();
                }
                nodes[parent].right = Some(id);
                nodes[parent].depth + 1
            }
        };

        levels = levels.max(depth);
        nodes.push(Shape {
            key,
            color,
            left: None,
            right: None,
            depth,
        });
        spine.push(id);
    }

    Some(Drawing {
        nodes,
        levels,
        options,
    })
}

/// Write a drawing of the tree to `path`. Returns `false` without creating the file when the
/// tree is empty.
pub fn draw_to_file<P: AsRef<Path>>(
    tree: &RbTree,
    path: P,
    options: DrawOptions,
) -> io::Result<bool> {
    let drawing = match render(tree, options) {
        Some(drawing) => drawing,
        None => return Ok(false),
    };

    let path = path.as_ref();
    debug!(
        "Drawing {} nodes into {} ({}x{})",
        drawing.nodes.len(),
        path.display(),
        drawing.width(),
        drawing.height()
    );

    let mut out = BufWriter::new(File::create(path)?);
    write!(out, "{}", drawing)?;
    out.flush()?;
    Ok(true)
}

impl Drawing {
    /// Width of the picture: two slots per node of the last level, capped at `max_width`.
    pub fn width(&self) -> i64 {
        let slot = i64::from(self.options.radius) + i64::from(self.options.padding);
        let max = i64::from(self.options.max_width);
        if self.levels >= 62 {
            return max;
        }
        (1i64 << self.levels).saturating_mul(slot).min(max)
    }

    pub fn height(&self) -> i64 {
        let row = 2 * i64::from(self.options.radius) + i64::from(self.options.padding);
        self.levels as i64 * row + i64::from(self.options.padding)
    }

    /// Draw the subtree under `id` into the interval `[left, right]`, with its root on row `y`.
    fn node(
        &self,
        f: &mut fmt::Formatter,
        id: usize,
        left: i64,
        right: i64,
        y: i64,
    ) -> fmt::Result {
        let shape = &self.nodes[id];
        let mid = (left + right) / 2;
        let next_y = y + 2 * i64::from(self.options.radius) + i64::from(self.options.padding);

        if let Some(child) = shape.left {
            edge(f, mid, y, (left + mid) / 2, next_y)?;
            self.node(f, child, left, mid, next_y)?;
        }
        if let Some(child) = shape.right {
            edge(f, mid, y, (mid + right) / 2, next_y)?;
            self.node(f, child, mid, right, next_y)?;
        }

        let fill = match shape.color {
            Color::Black => "black",
            Color::Red => "red",
        };
        writeln!(
            f,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" stroke=\"black\" stroke-width=\"1\" fill=\"{}\"/>",
            mid, y, self.options.radius, fill
        )?;
        writeln!(
            f,
            "<text x=\"{}\" y=\"{}\" fill=\"white\" text-anchor=\"middle\" dy=\"0.5ex\">{}</text>",
            mid, y, shape.key
        )
    }
}

fn edge(f: &mut fmt::Formatter, x1: i64, y1: i64, x2: i64, y2: i64) -> fmt::Result {
    writeln!(
        f,
        "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" style=\"stroke:black;stroke-width:1\"/>",
        x1, y1, x2, y2
    )
}

impl fmt::Display for Drawing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (width, height) = (self.width(), self.height());
        let inset = i64::from(self.options.radius) + i64::from(self.options.padding);

        writeln!(
            f,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>"
        )?;
        writeln!(
            f,
            "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
             \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">"
        )?;
        writeln!(
            f,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{}px\" \
             height=\"{}px\" style=\"background-color:white\">",
            width, height
        )?;
        // the root is the first entry of the preorder sequence.
        self.node(f, 0, 0, width - inset, inset)?;
        writeln!(f, "</svg>")
    }
}
