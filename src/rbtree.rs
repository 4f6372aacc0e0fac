//! Red-black tree. Empty links read as black, which lets the fixup loops
//! treat missing children exactly like the shared black sentinel of the
//! textbook formulation.

use std::fmt::Debug;

use crate::tree_base::{
    comparator::{DefaultKeyComparator, Destructor, KeyComparator},
    error::{Result, TreeError},
    node::{BinaryTree, Link, Locate},
    node_id::NodeId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

pub struct RbTree<K, C = DefaultKeyComparator<K>> {
    tree: BinaryTree<K, Color>,
    key_cmp: C,
    destructor: Option<Destructor<K>>,
}

crate::tree_base::impl_binary_common!(
    RbTree, Color,
    crate::tree_base::config::TreeKind::RedBlack
);

impl<K, C> RbTree<K, C> {
    #[inline]
    fn color(&self, link: Link) -> Color {
        match link {
            Some(id) => self.tree.node(id).tag,
            None => Color::Black,
        }
    }

    #[inline]
    fn set_color(&mut self, id: NodeId, color: Color) {
        self.tree.node_mut(id).tag = color;
    }

    /// Links that must exist by the red-black invariants.
    #[inline]
    fn present(link: Link, what: &str) -> NodeId {
        match link {
            Some(id) => id,
            None => unreachable!("red-black invariant broken: missing {}", what),
        }
    }
}

/// Insertion
impl<K: Debug, C: KeyComparator<K>> RbTree<K, C> {
    pub fn insert(&mut self, key: K) -> Result<()> {
        let (parent, ord) = match self.tree.locate(&self.key_cmp, &key) {
            Locate::Found(_) => {
                log::trace!("RbTree::insert duplicate {:?}", key);
                return Err(TreeError::DuplicateKey);
            }
            Locate::Vacant { parent, ord } => (parent, ord),
        };
        let id = self.tree.attach(key, Color::Red, parent, ord);
        self.insert_fixup(id);
        Ok(())
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        loop {
            let mut p = match self.tree.parent(z) {
                Some(p) if self.color(Some(p)) == Color::Red => p,
                _ => break,
            };
            // a red parent is never the root
            let g = Self::present(self.tree.parent(p), "grandparent");

            if self.tree.left(g) == Some(p) {
                let uncle = self.tree.right(g);
                if self.color(uncle) == Color::Red {
                    log::trace!("RbTree::insert_fixup recolor at {:?}", g);
                    self.set_color(p, Color::Black);
                    self.set_color(Self::present(uncle, "uncle"), Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                    continue;
                }
                if self.tree.right(p) == Some(z) {
                    self.tree.rotate_left(p);
                    z = p;
                    p = Self::present(self.tree.parent(z), "parent");
                }
                log::trace!("RbTree::insert_fixup rotate_right at {:?}", g);
                self.set_color(p, Color::Black);
                self.set_color(g, Color::Red);
                self.tree.rotate_right(g);
            } else {
                let uncle = self.tree.left(g);
                if self.color(uncle) == Color::Red {
                    log::trace!("RbTree::insert_fixup recolor at {:?}", g);
                    self.set_color(p, Color::Black);
                    self.set_color(Self::present(uncle, "uncle"), Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                    continue;
                }
                if self.tree.left(p) == Some(z) {
                    self.tree.rotate_right(p);
                    z = p;
                    p = Self::present(self.tree.parent(z), "parent");
                }
                log::trace!("RbTree::insert_fixup rotate_left at {:?}", g);
                self.set_color(p, Color::Black);
                self.set_color(g, Color::Red);
                self.tree.rotate_left(g);
            }
            break;
        }
        if let Some(root) = self.tree.root {
            self.set_color(root, Color::Black);
        }
    }
}

/// Deletion
impl<K: Debug, C: KeyComparator<K>> RbTree<K, C> {
    /// Removes `key`. For a node with two children the successor's record
    /// moves up and the successor node, with its own color, is the one
    /// physically unlinked.
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
        log::trace!("RbTree::delete {:?} ({:?})", spliced.key, spliced.tag);
        if spliced.tag == Color::Black {
            self.delete_fixup(spliced.child, spliced.parent, spliced.was_left);
        }
        Ok(spliced.key)
    }

    /// Restores black height after a black node was unlinked. `x` carries an
    /// extra black and may be empty, so its parent and side are tracked
    /// explicitly.
    fn delete_fixup(&mut self, mut x: Link, mut parent: Link, mut x_is_left: bool) {
        while x != self.tree.root && self.color(x) == Color::Black {
            let p = Self::present(parent, "parent of doubly black link");
            if x_is_left {
                let mut w = Self::present(self.tree.right(p), "sibling");
                if self.color(Some(w)) == Color::Red {
                    // case 1: red sibling
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.tree.rotate_left(p);
                    w = Self::present(self.tree.right(p), "sibling");
                }
                if self.color(self.tree.left(w)) == Color::Black
                    && self.color(self.tree.right(w)) == Color::Black
                {
                    // case 2: push the extra black up
                    self.set_color(w, Color::Red);
                    x = Some(p);
                    parent = self.tree.parent(p);
                    x_is_left = self.tree.is_left_child(p);
                    continue;
                }
                if self.color(self.tree.right(w)) == Color::Black {
                    // case 3: near child red, far child black
                    self.set_color(Self::present(self.tree.left(w), "near nephew"), Color::Black);
                    self.set_color(w, Color::Red);
                    self.tree.rotate_right(w);
                    w = Self::present(self.tree.right(p), "sibling");
                }
                // case 4: far child red
                let pc = self.color(Some(p));
                self.set_color(w, pc);
                self.set_color(p, Color::Black);
                self.set_color(Self::present(self.tree.right(w), "far nephew"), Color::Black);
                self.tree.rotate_left(p);
            } else {
                let mut w = Self::present(self.tree.left(p), "sibling");
                if self.color(Some(w)) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.tree.rotate_right(p);
                    w = Self::present(self.tree.left(p), "sibling");
                }
                if self.color(self.tree.left(w)) == Color::Black
                    && self.color(self.tree.right(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = Some(p);
                    parent = self.tree.parent(p);
                    x_is_left = self.tree.is_left_child(p);
                    continue;
                }
                if self.color(self.tree.left(w)) == Color::Black {
                    self.set_color(Self::present(self.tree.right(w), "near nephew"), Color::Black);
                    self.set_color(w, Color::Red);
                    self.tree.rotate_left(w);
                    w = Self::present(self.tree.left(p), "sibling");
                }
                let pc = self.color(Some(p));
                self.set_color(w, pc);
                self.set_color(p, Color::Black);
                self.set_color(Self::present(self.tree.left(w), "far nephew"), Color::Black);
                self.tree.rotate_right(p);
            }
            x = self.tree.root;
            break;
        }
        if let Some(x) = x {
            self.set_color(x, Color::Black);
        }
    }
}

impl<K, C: KeyComparator<K>> RbTree<K, C> {
    /// Red-black trees stay balanced; this only reports whether there is
    /// anything to balance.
    pub fn balance(&mut self) -> Result<()> {
        if self.is_empty() {
            return Err(TreeError::EmptyTree);
        }
        Ok(())
    }

    /// Checks coloring, parent links and ordering. Returns the black height.
    #[cfg(test)]
    pub(crate) fn check_consistency(&self) -> usize {
        fn walk<K, C: KeyComparator<K>>(t: &RbTree<K, C>, link: Link) -> usize {
            let id = match link {
                Some(id) => id,
                None => return 1,
            };
            let n = t.tree.node(id);
            if n.tag == Color::Red {
                assert_eq!(t.color(n.left), Color::Black, "red-red at {:?}", id);
                assert_eq!(t.color(n.right), Color::Black, "red-red at {:?}", id);
            }
            for child in [n.left, n.right].into_iter().flatten() {
                assert_eq!(t.tree.parent(child), Some(id));
            }
            if let Some(l) = n.left {
                assert!(t.key_cmp.less(t.tree.key(l), &n.key));
            }
            if let Some(r) = n.right {
                assert!(t.key_cmp.less(&n.key, t.tree.key(r)));
            }
            let bl = walk(t, n.left);
            let br = walk(t, n.right);
            assert_eq!(bl, br, "black height mismatch at {:?}", id);
            bl + usize::from(n.tag == Color::Black)
        }
        if let Some(root) = self.tree.root {
            assert_eq!(self.color(Some(root)), Color::Black);
            assert_eq!(self.tree.parent(root), None);
        }
        walk(self, self.tree.root)
    }
}

crate::tree_base::impl_ordered_tree!(RbTree, crate::tree_base::config::TreeKind::RedBlack);

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    fn height_bound(n: usize) -> f64 {
        2.0 * (((n + 1) as f64).log2() + 1.0)
    }

    #[test]
    fn test_random_1024() {
        let mut keys: Vec<u32> = (1..=1024).collect();
        keys.shuffle(&mut StdRng::seed_from_u64(7));

        let mut tree = RbTree::new();
        for &k in &keys {
            tree.insert(k).unwrap();
        }
        tree.check_consistency();
        assert_eq!(tree.len(), 1024);
        assert_eq!(tree.to_array(), (1..=1024).collect::<Vec<_>>());
        assert!((tree.height() as f64) <= height_bound(1024));
        assert!(tree.height() <= 24);
    }

    #[test]
    fn test_sorted_inserts_stay_shallow() {
        let mut tree = RbTree::new();
        for k in 0..4096 {
            tree.insert(k).unwrap();
        }
        tree.check_consistency();
        assert!((tree.height() as f64) <= 2.0 * (4097f64).log2());
        assert_eq!(tree.min(), Ok(&0));
        assert_eq!(tree.max(), Ok(&4095));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut tree = RbTree::new();
        tree.insert(1).unwrap();
        tree.insert(2).unwrap();
        assert_eq!(tree.insert(1), Err(TreeError::DuplicateKey));
        assert_eq!(tree.len(), 2);
        tree.check_consistency();
    }

    #[test]
    fn test_delete_all_orders() {
        let mut rng = StdRng::seed_from_u64(42);
        for round in 0..20 {
            let n = 50 + round * 13;
            let mut keys: Vec<i64> = (0..n).collect();
            keys.shuffle(&mut rng);
            let mut tree = RbTree::new();
            for &k in &keys {
                tree.insert(k).unwrap();
            }
            keys.shuffle(&mut rng);
            for (i, k) in keys.iter().enumerate() {
                assert_eq!(tree.delete(k), Ok(*k));
                assert!(!tree.key_exists(k));
                assert_eq!(tree.len(), keys.len() - i - 1);
                tree.check_consistency();
            }
            assert!(tree.is_empty());
        }
    }

    #[test]
    fn test_interleaved_insert_delete() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut tree = RbTree::new();
        let mut live = std::collections::BTreeSet::new();
        let mut pool: Vec<i32> = (0..2000).collect();
        pool.shuffle(&mut rng);
        for (i, &k) in pool.iter().enumerate() {
            tree.insert(k).unwrap();
            live.insert(k);
            if i % 3 == 2 {
                let victim = pool[i / 2];
                if live.remove(&victim) {
                    tree.delete(&victim).unwrap();
                }
            }
        }
        tree.check_consistency();
        assert_eq!(tree.to_array(), live.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_balance_is_a_check() {
        let mut tree = RbTree::<i32>::new();
        assert_eq!(tree.balance(), Err(TreeError::EmptyTree));
        tree.insert(1).unwrap();
        assert_eq!(tree.balance(), Ok(()));
    }
}
