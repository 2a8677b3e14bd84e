use super::{Color, Node, NodeId, NIL};
use crate::{Config, Key, TreeError};
use log::debug;
use std::ops::{Index, IndexMut};

/// Owns every node of one tree. Slot [`NIL`] holds the sentinel for the whole lifetime of the
/// arena, freed slots are chained through their `parent` field and handed out again before the
/// arena grows.
pub(crate) struct NodeArena {
    nodes: Vec<Node>,
    // head of the free list, NIL when empty.
    free: NodeId,
    live: usize,
    limit: Option<usize>,
}

impl NodeArena {
    pub fn new(config: &Config) -> Self {
        let mut nodes = Vec::new();
        // the reservation is a hint, allocation reports its own failures later.
        if nodes
            .try_reserve(config.initial_capacity.saturating_add(1))
            .is_err()
        {
            debug!(
                "Could not reserve {} node slots up front",
                config.initial_capacity
            );
        }
        nodes.push(Node::sentinel());

        Self {
            nodes,
            free: NIL,
            live: 0,
            limit: config.node_limit,
        }
    }

    /// Hand out a red node holding `key` with every link on the sentinel. Fails without touching
    /// the arena when the node limit is reached or the backing vector cannot grow.
    pub fn allocate(&mut self, key: Key) -> Result<NodeId, TreeError> {
        if let Some(limit) = self.limit {
            if self.live >= limit {
                return Err(TreeError::OutOfMemory);
            }
        }

        let id = if self.free != NIL {
            let id = self.free;
            self.free = self.nodes[id].parent;
            debug!("Reusing node slot {} for key {}", id, key);
            self.nodes[id] = Node::new(key);
            id
        } else {
            self.nodes
                .try_reserve(1)
                .map_err(|_| TreeError::OutOfMemory)?;
            self.nodes.push(Node::new(key));
            self.nodes.len() - 1
        };

        self.live += 1;
        Ok(id)
    }

    /// Return the slot to the free list. The node must already be unlinked from the tree.
    pub fn free(&mut self, id: NodeId) {
        debug_assert_ne!(id, NIL, "the sentinel is never freed");
        debug_assert!(self.live > 0);

        let node = &mut self.nodes[id];
        node.color = Color::Black;
        node.left = NIL;
        node.right = NIL;
        node.parent = self.free;
        self.free = id;
        self.live -= 1;
    }

    /// Drop every node and the free list, keeping only the sentinel.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes.shrink_to_fit();
        self.free = NIL;
        self.live = 0;
    }

    /// Number of nodes currently handed out.
    #[inline]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of freed slots waiting for reuse.
    #[inline]
    pub fn pooled(&self) -> usize {
        self.nodes.len() - 1 - self.live
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

impl IndexMut<NodeId> for NodeArena {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        debug_assert_ne!(id, NIL, "attempted to write through the sentinel");
        &mut self.nodes[id]
    }
}
