//! Handles for tree nodes. Every tree keeps its nodes in a `slab::Slab` and
//! nodes refer to each other by slab key instead of pointers, so parent
//! links and rotations are plain index rewiring.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Slab key of the node.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(key: usize) -> Self {
        NodeId(key)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
