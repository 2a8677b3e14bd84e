/// Construction time settings of a [`RbTree`](crate::RbTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of live nodes, inserting past it fails with
    /// [`TreeError::OutOfMemory`](crate::TreeError::OutOfMemory). `None` means unbounded.
    pub node_limit: Option<usize>,
    /// Number of node slots reserved up front.
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_limit: None,
            initial_capacity: 0,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of keys the tree can hold at once.
    pub fn node_limit(mut self, limit: usize) -> Self {
        self.node_limit = Some(limit);
        self
    }

    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
