use super::btree::BPlusTree;
use crate::tree_base::{
    iter::{CursorPos, TreeCursor},
    node_id::NodeId,
};

/// Cursor over the leaf chain of a [`BPlusTree`].
pub struct BPlusCursor<'a, K, C> {
    tree: &'a BPlusTree<K, C>,
    curr_leaf: Option<NodeId>,
    curr_slot: usize,
}

impl<'a, K, C> Clone for BPlusCursor<'a, K, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            curr_leaf: self.curr_leaf,
            curr_slot: self.curr_slot,
        }
    }
}

impl<'a, K, C> BPlusCursor<'a, K, C> {
    pub(super) fn new(tree: &'a BPlusTree<K, C>, leaf: NodeId, slot: usize) -> Self {
        Self {
            tree,
            curr_leaf: Some(leaf),
            curr_slot: slot,
        }
    }

    pub(super) fn end(tree: &'a BPlusTree<K, C>) -> Self {
        Self {
            tree,
            curr_leaf: None,
            curr_slot: 0,
        }
    }

    /// Cursor on `slot` of `leaf`, or on the next leaf's first slot when
    /// `slot` is one past the end.
    pub(super) fn at_or_after(tree: &'a BPlusTree<K, C>, leaf: NodeId, slot: usize) -> Self {
        let l = tree.node(leaf).as_leaf();
        if slot < l.slotdata.len() {
            return Self::new(tree, leaf, slot);
        }
        match l.next_leaf {
            Some(next) => Self::new(tree, next, 0),
            None => Self::end(tree),
        }
    }
}

impl<'a, K, C> TreeCursor<'a, K> for BPlusCursor<'a, K, C> {
    #[inline]
    fn get_data(&self) -> Option<&'a K> {
        let tree = self.tree;
        self.curr_leaf
            .map(|leaf| &tree.node(leaf).as_leaf().slotdata[self.curr_slot])
    }

    #[inline]
    fn get_node(&self) -> Option<CursorPos> {
        self.curr_leaf.map(|leaf| CursorPos::Slot {
            leaf,
            slot: self.curr_slot,
        })
    }

    fn next(&mut self) {
        let leaf = match self.curr_leaf {
            Some(leaf) => self.tree.node(leaf).as_leaf(),
            None => return,
        };
        if self.curr_slot + 1 < leaf.slotdata.len() {
            self.curr_slot += 1;
        } else {
            self.curr_leaf = leaf.next_leaf;
            self.curr_slot = 0;
        }
    }

    fn prev(&mut self) {
        let leaf = match self.curr_leaf {
            Some(leaf) => self.tree.node(leaf).as_leaf(),
            None => return,
        };
        if self.curr_slot > 0 {
            self.curr_slot -= 1;
        } else {
            self.curr_leaf = leaf.prev_leaf;
            self.curr_slot = match leaf.prev_leaf {
                Some(prev) => self.tree.node(prev).as_leaf().slotdata.len() - 1,
                None => 0,
            };
        }
    }
}
