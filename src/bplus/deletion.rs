use std::fmt::Debug;
use std::mem;
use std::ops;

use bitmask_enum::bitmask;

use super::{btree::BPlusTree, node::Node};
use crate::tree_base::{
    comparator::KeyComparator,
    error::{Result, TreeError},
    node_id::NodeId,
};

/// `UpdateFirstKey`: the subtree's smallest key changed and `first_key`
/// holds the new one. `Underflow`: the node fell below the minimum fill and
/// its parent has to borrow or merge.
#[bitmask(u8)]
pub enum DeletionResultFlags {
    Ok = 0,
    UpdateFirstKey = 1,
    Underflow = 2,
}

pub struct DeletionResult<K> {
    pub flags: DeletionResultFlags,
    pub first_key: Option<K>,
}

impl<K> DeletionResult<K> {
    pub fn new(flags: DeletionResultFlags) -> Self {
        Self {
            flags,
            first_key: None,
        }
    }

    pub fn new_with_key(flags: DeletionResultFlags, first_key: Option<K>) -> Self {
        Self { flags, first_key }
    }

    pub fn has(&self, flag: DeletionResultFlags) -> bool {
        self.flags.contains(flag)
    }
}

impl<K> ops::BitOrAssign<DeletionResult<K>> for DeletionResult<K> {
    fn bitor_assign(&mut self, rhs: DeletionResult<K>) {
        self.flags = self.flags | rhs.flags;
        if rhs.has(DeletionResultFlags::UpdateFirstKey) {
            self.first_key = rhs.first_key;
        }
    }
}

impl<K: Clone + Debug, C: KeyComparator<K>> BPlusTree<K, C> {
    /// Removes `key` and returns the stored record.
    pub fn delete(&mut self, key: &K) -> Result<K> {
        let root = self.root_.ok_or(TreeError::EmptyTree)?;
        log::debug!("BPlusTree::delete({:?}) on tree size {}", key, self.len());

        let (record, _) = self.erase_descend(root, key)?;
        self.stats_.size -= 1;
        self.collapse_root();
        Ok(record)
    }

    /// Removes `key` and passes the record to the destructor.
    pub fn delete_entry(&mut self, key: &K) -> Result<()> {
        let record = self.delete(key)?;
        if let Some(destructor) = self.destructor.as_mut() {
            destructor(record);
        }
        Ok(())
    }

    /// Drops inner roots left with a single child and an emptied leaf root.
    fn collapse_root(&mut self) {
        while let Some(root) = self.root_ {
            let child = match self.node(root) {
                Node::Leaf(leaf) if leaf.slotdata.is_empty() => None,
                Node::Inner(inner) if inner.slotkey.is_empty() => Some(inner.get_child(0)),
                _ => return,
            };
            self.free_node(root);
            self.root_ = child;
            match child {
                Some(child) => log::debug!("BPlusTree::collapse_root new root {:?}", child),
                None => {
                    self.head_leaf_ = None;
                    self.tail_leaf_ = None;
                    log::debug!("BPlusTree::collapse_root tree is now empty");
                }
            }
        }
    }

    /// Erases `key` below `n`. Children that underflow are fixed on the way
    /// back up by borrowing from or merging with a sibling, and separator keys
    /// are refreshed whenever a subtree's smallest key went away.
    fn erase_descend(&mut self, n: NodeId, key: &K) -> Result<(K, DeletionResult<K>)> {
        let min = self.min_keys();

        if self.node(n).is_leafnode() {
            let leaf = self.nodes[n.index()].as_leaf_mut();
            let slot = Self::find_lower(&self.key_cmp, &leaf.slotdata, key);
            if slot >= leaf.slotdata.len() || !self.key_cmp.equal(key, &leaf.slotdata[slot]) {
                log::debug!("Could not find key {:?} to erase.", key);
                return Err(TreeError::KeyNotFound);
            }

            let record = leaf.slotdata.remove(slot);
            let mut result = DeletionResult::new(DeletionResultFlags::Ok);
            if slot == 0 {
                result |= DeletionResult::new_with_key(
                    DeletionResultFlags::UpdateFirstKey,
                    leaf.slotdata.first().cloned(),
                );
            }
            if leaf.is_underflow(min) {
                result |= DeletionResult::new(DeletionResultFlags::Underflow);
            }
            return Ok((record, result));
        }

        let (slot, child) = {
            let inner = self.node(n).as_inner();
            let slot = Self::find_upper(&self.key_cmp, &inner.slotkey, key);
            (slot, inner.get_child(slot))
        };

        let (record, child_result) = self.erase_descend(child, key)?;
        let mut result = DeletionResult::new(DeletionResultFlags::Ok);
        let update = child_result.has(DeletionResultFlags::UpdateFirstKey);
        let underflowed = child_result.has(DeletionResultFlags::Underflow);

        // the separator must be current before it can move down in a fix
        if update && slot > 0 {
            if let Some(first) = &child_result.first_key {
                self.node_mut(n).as_inner_mut().slotkey[slot - 1] = first.clone();
            }
        }

        // slot of the child that now holds the erased key's range, or None
        // if it was merged into its left sibling
        let mut holder = Some(slot);
        if underflowed {
            holder = self.fix_underflow(n, slot);
        }

        if update {
            match holder {
                Some(0) => {
                    let first = match child_result.first_key {
                        Some(first) if !underflowed => first,
                        _ => self.subtree_first(self.node(n).as_inner().get_child(0)).clone(),
                    };
                    result |= DeletionResult::new_with_key(
                        DeletionResultFlags::UpdateFirstKey,
                        Some(first),
                    );
                }
                Some(i) if underflowed => {
                    let first = self.subtree_first(self.node(n).as_inner().get_child(i)).clone();
                    self.node_mut(n).as_inner_mut().slotkey[i - 1] = first;
                }
                _ => {}
            }
        }

        if self.node(n).as_inner().is_underflow(min) {
            result |= DeletionResult::new(DeletionResultFlags::Underflow);
        }
        Ok((record, result))
    }

    /// Repairs the underflowing child at `slot` of inner node `p`. Prefers
    /// borrowing from the left sibling, then the right one, and merges only
    /// when both siblings are at the minimum. Returns the slot now covering
    /// the child's range, or None if the child was folded into its left
    /// sibling.
    fn fix_underflow(&mut self, p: NodeId, slot: usize) -> Option<usize> {
        let min = self.min_keys();
        let (left, child, right) = {
            let inner = self.node(p).as_inner();
            (
                slot.checked_sub(1).map(|i| inner.get_child(i)),
                inner.get_child(slot),
                inner.childid.get(slot + 1).copied(),
            )
        };
        let lends = |id: Option<NodeId>| id.map_or(false, |id| !self.node(id).is_few(min));
        let (left_lends, right_lends) = (lends(left), lends(right));

        if let (Some(left), true) = (left, left_lends) {
            self.shift_right(p, slot - 1, left, child);
            return Some(slot);
        }
        if let (Some(right), true) = (right, right_lends) {
            self.shift_left(p, slot, child, right);
            return Some(slot);
        }
        if let Some(left) = left {
            self.merge(p, slot - 1, left, child);
            return None;
        }
        if let Some(right) = right {
            self.merge(p, slot, child, right);
            return Some(slot);
        }
        unreachable!("underflowing child {:?} has no sibling", child)
    }

    /// Number of entries to move so both nodes end up about equally full.
    fn shift_count(&self, from: NodeId, to: NodeId) -> usize {
        let (from, to) = (self.node(from).slotuse(), self.node(to).slotuse());
        debug_assert!(from > to + 1);
        (from - to) >> 1
    }

    /// Moves entries from `left` into its right sibling `right`. `sep` is
    /// the slot of the parent key separating the two.
    fn shift_right(&mut self, p: NodeId, sep: usize, left: NodeId, right: NodeId) {
        let shiftnum = self.shift_count(left, right);
        log::debug!(
            "BPlusTree::shift_right {} entries from {:?} to {:?}",
            shiftnum,
            left,
            right
        );

        if self.node(left).is_leafnode() {
            let l = self.node_mut(left).as_leaf_mut();
            let moved: Vec<K> = l.slotdata.drain(l.slotdata.len() - shiftnum..).collect();
            let r = self.node_mut(right).as_leaf_mut();
            r.slotdata.splice(0..0, moved);
            let first = r.slotdata[0].clone();
            self.node_mut(p).as_inner_mut().slotkey[sep] = first;
            return;
        }

        for _ in 0..shiftnum {
            let l = self.node_mut(left).as_inner_mut();
            let (key, child) = match (l.slotkey.pop(), l.childid.pop()) {
                (Some(key), Some(child)) => (key, child),
                _ => unreachable!("lending inner node {:?} is empty", left),
            };
            let down = mem::replace(&mut self.node_mut(p).as_inner_mut().slotkey[sep], key);
            let r = self.node_mut(right).as_inner_mut();
            r.slotkey.insert(0, down);
            r.childid.insert(0, child);
        }
    }

    /// Moves entries from `right` into its left sibling `left`.
    fn shift_left(&mut self, p: NodeId, sep: usize, left: NodeId, right: NodeId) {
        let shiftnum = self.shift_count(right, left);
        log::debug!(
            "BPlusTree::shift_left {} entries from {:?} to {:?}",
            shiftnum,
            right,
            left
        );

        if self.node(right).is_leafnode() {
            let r = self.node_mut(right).as_leaf_mut();
            let moved: Vec<K> = r.slotdata.drain(..shiftnum).collect();
            let first = r.slotdata[0].clone();
            self.node_mut(left).as_leaf_mut().slotdata.extend(moved);
            self.node_mut(p).as_inner_mut().slotkey[sep] = first;
            return;
        }

        for _ in 0..shiftnum {
            let r = self.node_mut(right).as_inner_mut();
            let key = r.slotkey.remove(0);
            let child = r.childid.remove(0);
            let down = mem::replace(&mut self.node_mut(p).as_inner_mut().slotkey[sep], key);
            let l = self.node_mut(left).as_inner_mut();
            l.slotkey.push(down);
            l.childid.push(child);
        }
    }

    /// Folds `right` into its left sibling and drops it from the parent. For
    /// inner nodes the parent's separator moves down between the two halves.
    fn merge(&mut self, p: NodeId, sep: usize, left: NodeId, right: NodeId) {
        log::debug!("BPlusTree::merge {:?} into {:?}", right, left);
        let parent = self.node_mut(p).as_inner_mut();
        let down = parent.slotkey.remove(sep);
        parent.childid.remove(sep + 1);

        match self.free_node(right) {
            Node::Leaf(mut r) => {
                let l = self.node_mut(left).as_leaf_mut();
                l.slotdata.append(&mut r.slotdata);
                l.next_leaf = r.next_leaf;
                match r.next_leaf {
                    Some(next) => self.node_mut(next).as_leaf_mut().prev_leaf = Some(left),
                    None => self.tail_leaf_ = Some(left),
                }
            }
            Node::Inner(mut r) => {
                let l = self.node_mut(left).as_inner_mut();
                l.slotkey.push(down);
                l.slotkey.append(&mut r.slotkey);
                l.childid.append(&mut r.childid);
            }
        }
    }
}

#[cfg(test)]
impl<K: Clone + Debug, C: KeyComparator<K>> BPlusTree<K, C> {
    /// Walks the whole tree asserting the structural invariants. Returns the
    /// number of records found.
    pub(super) fn check_consistency(&self) -> usize {
        let root = match self.root_ {
            Some(root) => root,
            None => {
                assert!(self.head_leaf_.is_none() && self.tail_leaf_.is_none());
                assert_eq!(self.stats_.size, 0);
                return 0;
            }
        };
        let mut leaves = Vec::new();
        let count = self.check_node(root, true, None, None, &mut leaves);
        assert_eq!(count, self.len());
        assert_eq!(self.stats_.leaves, leaves.len());

        assert_eq!(self.head_leaf_, leaves.first().copied());
        assert_eq!(self.tail_leaf_, leaves.last().copied());
        for (i, &leaf) in leaves.iter().enumerate() {
            let l = self.node(leaf).as_leaf();
            assert_eq!(l.prev_leaf, i.checked_sub(1).map(|j| leaves[j]));
            assert_eq!(l.next_leaf, leaves.get(i + 1).copied());
        }
        count
    }

    fn check_node(
        &self,
        n: NodeId,
        is_root: bool,
        lower: Option<&K>,
        upper: Option<&K>,
        leaves: &mut Vec<NodeId>,
    ) -> usize {
        let node = self.node(n);
        assert!(node.slotuse() <= self.fanout, "node {:?} overflows", n);
        if !is_root {
            assert!(node.slotuse() >= self.min_keys(), "node {:?} underflows", n);
        }
        match node {
            Node::Leaf(leaf) => {
                assert!(!leaf.slotdata.is_empty());
                for w in leaf.slotdata.windows(2) {
                    assert!(self.key_cmp.less(&w[0], &w[1]));
                }
                if let Some(lower) = lower {
                    assert!(self.key_cmp.equal(lower, &leaf.slotdata[0]));
                }
                if let (Some(upper), Some(last)) = (upper, leaf.slotdata.last()) {
                    assert!(self.key_cmp.less(last, upper));
                }
                leaves.push(n);
                leaf.slotdata.len()
            }
            Node::Inner(inner) => {
                assert!(!inner.slotkey.is_empty());
                assert_eq!(inner.childid.len(), inner.slotkey.len() + 1);
                let mut count = 0;
                for (i, &child) in inner.childid.iter().enumerate() {
                    assert_eq!(self.node(child).level() + 1, inner.level);
                    let lo = if i == 0 { lower } else { Some(&inner.slotkey[i - 1]) };
                    let hi = inner.slotkey.get(i).or(upper);
                    count += self.check_node(child, false, lo, hi, leaves);
                }
                count
            }
        }
    }
}
