use std::fmt;
use std::mem::size_of;

use super::{
    comparator::{DefaultKeyComparator, Destructor, KeyComparator},
    error::{Result, TreeError},
};

const fn _max(a: usize, b: usize) -> usize {
    [a, b][(a < b) as usize]
}

/// Default B+ tree fanout: as many keys as fit in 256 bytes, at least 8.
pub const fn default_fanout<K>() -> usize {
    _max(8, 256 / _max(size_of::<K>(), 1))
}

pub const MIN_FANOUT: usize = 2;

/// Backend picked by `create_tree`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Bst,
    Avl,
    RedBlack,
    BPlus,
}

/// Creation parameters for any backend.
pub struct TreeConfig<K, C = DefaultKeyComparator<K>> {
    pub kind: TreeKind,
    pub comparator: C,
    /// Maximum keys per B+ tree node. Ignored by the binary backends.
    pub fanout: usize,
    pub destructor: Option<Destructor<K>>,
}

impl<K: Ord> TreeConfig<K> {
    pub fn new(kind: TreeKind) -> Self {
        Self::with_comparator(kind, DefaultKeyComparator::new())
    }
}

impl<K, C: KeyComparator<K>> TreeConfig<K, C> {
    pub fn with_comparator(kind: TreeKind, comparator: C) -> Self {
        Self {
            kind,
            comparator,
            fanout: default_fanout::<K>(),
            destructor: None,
        }
    }

    pub fn fanout(mut self, fanout: usize) -> Self {
        self.fanout = fanout;
        self
    }

    pub fn destructor(mut self, destructor: impl FnMut(K) + 'static) -> Self {
        self.destructor = Some(Box::new(destructor));
        self
    }

    pub fn validate(&self) -> Result<()> {
        if size_of::<K>() == 0 {
            return Err(TreeError::InvalidArgument("record size must be positive"));
        }
        if self.kind == TreeKind::BPlus && self.fanout < MIN_FANOUT {
            return Err(TreeError::InvalidArgument("fanout must be at least 2"));
        }
        Ok(())
    }
}

impl<K, C: fmt::Debug> fmt::Debug for TreeConfig<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeConfig")
            .field("kind", &self.kind)
            .field("comparator", &self.comparator)
            .field("fanout", &self.fanout)
            .field("destructor", &self.destructor.is_some())
            .finish()
    }
}
