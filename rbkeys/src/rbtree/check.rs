use super::{Color, NodeId, RbTree, NIL};
use crate::{Key, Violation};

impl RbTree {
    /// Check every structural rule of the tree: the coloring rules, equal black height on all
    /// paths, strict key order, parent links agreeing with child links, an untouched sentinel
    /// and a node count matching [`RbTree::len`].
    ///
    /// This walks the whole tree, it is meant for tests and for checking loaded trees.
    pub fn validate(&self) -> Result<(), Violation> {
        let nil = self.node(NIL);
        if nil.color != Color::Black || nil.left != NIL || nil.right != NIL || nil.parent != NIL
        {
            return Err(Violation::Sentinel);
        }

        if self.root == NIL {
            return match self.len {
                0 => Ok(()),
                expected => Err(Violation::Count { expected, found: 0 }),
            };
        }

        let root = self.node(self.root);
        if root.parent != NIL {
            return Err(Violation::ParentLink(root.key));
        }
        if root.color == Color::Red {
            return Err(Violation::RedRoot(root.key));
        }

        // (node, exclusive lower bound, exclusive upper bound, black nodes above it)
        let mut stack: Vec<(NodeId, Option<Key>, Option<Key>, usize)> =
            vec![(self.root, None, None, 0)];
        let mut expected_black: Option<usize> = None;
        let mut found = 0;

        while let Some((id, lo, hi, above)) = stack.pop() {
            found += 1;
            // a cycle in the links would otherwise never end.
            if found > self.len {
                return Err(Violation::Count {
                    expected: self.len,
                    found,
                });
            }

            let node = self.node(id);
            if lo.map_or(false, |lo| node.key <= lo) || hi.map_or(false, |hi| node.key >= hi) {
                return Err(Violation::Order(node.key));
            }

            let blacks = above + (node.color == Color::Black) as usize;
            let children = [
                (node.left, lo, Some(node.key)),
                (node.right, Some(node.key), hi),
            ];

            for (child_id, lo, hi) in children {
                if child_id == NIL {
                    match expected_black {
                        None => expected_black = Some(blacks),
                        Some(expected) if expected != blacks => {
                            return Err(Violation::BlackHeight {
                                key: node.key,
                                expected,
                                found: blacks,
                            })
                        }
                        Some(_) => {}
                    }
                    continue;
                }

                let child = self.node(child_id);
                if child.parent != id {
                    return Err(Violation::ParentLink(child.key));
                }
                if node.color == Color::Red && child.color == Color::Red {
                    return Err(Violation::RedRed {
                        parent: node.key,
                        child: child.key,
                    });
                }
                stack.push((child_id, lo, hi, blacks));
            }
        }

        if found != self.len {
            return Err(Violation::Count {
                expected: self.len,
                found,
            });
        }
        if self.arena.live() != self.len {
            return Err(Violation::Count {
                expected: self.len,
                found: self.arena.live(),
            });
        }

        Ok(())
    }
}
