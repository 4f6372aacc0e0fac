//! AVL tree. Every node carries a three-state balance tag; insert and
//! delete retrace toward the root and repair with single or double
//! rotations, keeping sibling subtree heights within one of each other.

use std::fmt::Debug;

use crate::tree_base::{
    comparator::{DefaultKeyComparator, Destructor, KeyComparator},
    error::{Result, TreeError},
    node::{BinaryTree, Locate},
    node_id::NodeId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Balance {
    LeftHeavy,
    Balanced,
    RightHeavy,
}

pub struct AvlTree<K, C = DefaultKeyComparator<K>> {
    tree: BinaryTree<K, Balance>,
    key_cmp: C,
    destructor: Option<Destructor<K>>,
}

crate::tree_base::impl_binary_common!(
    AvlTree, Balance,
    crate::tree_base::config::TreeKind::Avl
);

/// Rotations
impl<K, C> AvlTree<K, C> {
    #[inline]
    fn balance_of(&self, id: NodeId) -> Balance {
        self.tree.node(id).tag
    }

    #[inline]
    fn set_balance(&mut self, id: NodeId, b: Balance) {
        self.tree.node_mut(id).tag = b;
    }

    /// Repairs `p` whose left subtree is two levels taller than its right.
    /// Returns the new subtree root and whether the subtree got shorter
    /// than it was before the height difference appeared.
    fn fix_left_heavy(&mut self, p: NodeId) -> (NodeId, bool) {
        let l = match self.tree.left(p) {
            Some(l) => l,
            None => unreachable!("left-heavy node {:?} without left child", p),
        };
        match self.balance_of(l) {
            Balance::LeftHeavy => {
                log::trace!("AvlTree::rotate_ll at {:?}", p);
                let top = self.tree.rotate_right(p);
                self.set_balance(p, Balance::Balanced);
                self.set_balance(l, Balance::Balanced);
                (top, true)
            }
            Balance::Balanced => {
                // only reachable from deletion
                log::trace!("AvlTree::rotate_ll (balanced child) at {:?}", p);
                let top = self.tree.rotate_right(p);
                self.set_balance(p, Balance::LeftHeavy);
                self.set_balance(l, Balance::RightHeavy);
                (top, false)
            }
            Balance::RightHeavy => {
                log::trace!("AvlTree::rotate_lr at {:?}", p);
                let lr = match self.tree.right(l) {
                    Some(lr) => lr,
                    None => unreachable!("right-heavy node {:?} without right child", l),
                };
                let (bp, bl) = match self.balance_of(lr) {
                    Balance::LeftHeavy => (Balance::RightHeavy, Balance::Balanced),
                    Balance::Balanced => (Balance::Balanced, Balance::Balanced),
                    Balance::RightHeavy => (Balance::Balanced, Balance::LeftHeavy),
                };
                self.tree.rotate_left(l);
                let top = self.tree.rotate_right(p);
                self.set_balance(p, bp);
                self.set_balance(l, bl);
                self.set_balance(lr, Balance::Balanced);
                (top, true)
            }
        }
    }

    /// Mirror of `fix_left_heavy`.
    fn fix_right_heavy(&mut self, p: NodeId) -> (NodeId, bool) {
        let r = match self.tree.right(p) {
            Some(r) => r,
            None => unreachable!("right-heavy node {:?} without right child", p),
        };
        match self.balance_of(r) {
            Balance::RightHeavy => {
                log::trace!("AvlTree::rotate_rr at {:?}", p);
                let top = self.tree.rotate_left(p);
                self.set_balance(p, Balance::Balanced);
                self.set_balance(r, Balance::Balanced);
                (top, true)
            }
            Balance::Balanced => {
                log::trace!("AvlTree::rotate_rr (balanced child) at {:?}", p);
                let top = self.tree.rotate_left(p);
                self.set_balance(p, Balance::RightHeavy);
                self.set_balance(r, Balance::LeftHeavy);
                (top, false)
            }
            Balance::LeftHeavy => {
                log::trace!("AvlTree::rotate_rl at {:?}", p);
                let rl = match self.tree.left(r) {
                    Some(rl) => rl,
                    None => unreachable!("left-heavy node {:?} without left child", r),
                };
                let (bp, br) = match self.balance_of(rl) {
                    Balance::RightHeavy => (Balance::LeftHeavy, Balance::Balanced),
                    Balance::Balanced => (Balance::Balanced, Balance::Balanced),
                    Balance::LeftHeavy => (Balance::Balanced, Balance::RightHeavy),
                };
                self.tree.rotate_right(r);
                let top = self.tree.rotate_left(p);
                self.set_balance(p, bp);
                self.set_balance(r, br);
                self.set_balance(rl, Balance::Balanced);
                (top, true)
            }
        }
    }
}

/// Insertion
impl<K: Debug, C: KeyComparator<K>> AvlTree<K, C> {
    pub fn insert(&mut self, key: K) -> Result<()> {
        let (parent, ord) = match self.tree.locate(&self.key_cmp, &key) {
            Locate::Found(_) => {
                log::trace!("AvlTree::insert duplicate {:?}", key);
                return Err(TreeError::DuplicateKey);
            }
            Locate::Vacant { parent, ord } => (parent, ord),
        };
        let id = self.tree.attach(key, Balance::Balanced, parent, ord);
        self.retrace_insert(id);
        Ok(())
    }

    /// Walks up from a freshly attached leaf. Stops once a subtree keeps its
    /// height: either a skewed node became balanced or one rotation fixed it.
    fn retrace_insert(&mut self, mut child: NodeId) {
        while let Some(p) = self.tree.parent(child) {
            let from_left = self.tree.left(p) == Some(child);
            match (self.balance_of(p), from_left) {
                (Balance::Balanced, true) => self.set_balance(p, Balance::LeftHeavy),
                (Balance::Balanced, false) => self.set_balance(p, Balance::RightHeavy),
                (Balance::RightHeavy, true) | (Balance::LeftHeavy, false) => {
                    self.set_balance(p, Balance::Balanced);
                    return;
                }
                (Balance::LeftHeavy, true) => {
                    self.fix_left_heavy(p);
                    return;
                }
                (Balance::RightHeavy, false) => {
                    self.fix_right_heavy(p);
                    return;
                }
            }
            child = p;
        }
    }
}

/// Deletion
impl<K: Debug, C: KeyComparator<K>> AvlTree<K, C> {
    pub fn delete(&mut self, key: &K) -> Result<K> {
        if self.is_empty() {
            return Err(TreeError::EmptyTree);
        }
        let id = self
            .tree
            .find(&self.key_cmp, key)
            .ok_or(TreeError::KeyNotFound)?;
        let victim = self.tree.prepare_removal(id);
        let spliced = self.tree.splice(victim);
        log::trace!("AvlTree::delete {:?}", spliced.key);
        self.retrace_delete(spliced.parent, spliced.was_left);
        Ok(spliced.key)
    }

    /// Walks up from the parent of the unlinked node; `from_left` tells which
    /// of its subtrees just lost a level. Unlike insertion, a rotation may
    /// still leave the subtree shorter, so retracing can continue past it.
    fn retrace_delete(&mut self, mut parent: Option<NodeId>, mut from_left: bool) {
        while let Some(p) = parent {
            let (top, shrunk) = match (self.balance_of(p), from_left) {
                (Balance::Balanced, true) => {
                    self.set_balance(p, Balance::RightHeavy);
                    return;
                }
                (Balance::Balanced, false) => {
                    self.set_balance(p, Balance::LeftHeavy);
                    return;
                }
                (Balance::LeftHeavy, true) | (Balance::RightHeavy, false) => {
                    self.set_balance(p, Balance::Balanced);
                    (p, true)
                }
                (Balance::RightHeavy, true) => self.fix_right_heavy(p),
                (Balance::LeftHeavy, false) => self.fix_left_heavy(p),
            };
            if !shrunk {
                return;
            }
            from_left = self.tree.is_left_child(top);
            parent = self.tree.parent(top);
        }
    }
}

impl<K, C: KeyComparator<K>> AvlTree<K, C> {
    /// AVL trees stay balanced; this only reports whether there is anything
    /// to balance.
    pub fn balance(&mut self) -> Result<()> {
        if self.is_empty() {
            return Err(TreeError::EmptyTree);
        }
        Ok(())
    }

    /// Checks parent links, ordering and that every balance tag matches the
    /// real subtree heights. Returns the tree height.
    #[cfg(test)]
    pub(crate) fn check_consistency(&self) -> usize {
        fn walk<K, C: KeyComparator<K>>(t: &AvlTree<K, C>, id: NodeId) -> usize {
            let n = t.tree.node(id);
            let mut hl = 0;
            let mut hr = 0;
            if let Some(l) = n.left {
                assert_eq!(t.tree.parent(l), Some(id));
                assert!(t.key_cmp.less(t.tree.key(l), &n.key));
                hl = walk(t, l);
            }
            if let Some(r) = n.right {
                assert_eq!(t.tree.parent(r), Some(id));
                assert!(t.key_cmp.less(&n.key, t.tree.key(r)));
                hr = walk(t, r);
            }
            let expected = match hl as isize - hr as isize {
                1 => Balance::LeftHeavy,
                0 => Balance::Balanced,
                -1 => Balance::RightHeavy,
                d => panic!("height difference {} at {:?}", d, id),
            };
            assert_eq!(n.tag, expected, "stale balance tag at {:?}", id);
            1 + hl.max(hr)
        }
        match self.tree.root {
            None => 0,
            Some(root) => {
                assert_eq!(self.tree.parent(root), None);
                walk(self, root)
            }
        }
    }
}

crate::tree_base::impl_ordered_tree!(AvlTree, crate::tree_base::config::TreeKind::Avl);
