//! Unbalanced binary search tree with an explicit Day-Stout-Warren global
//! rebalance. Mutations never restructure the tree; callers run `balance()`
//! when a one-off O(n) pass beats per-operation fixups.

use std::fmt::Debug;

use crate::tree_base::{
    comparator::{DefaultKeyComparator, Destructor, KeyComparator},
    error::{Result, TreeError},
    node::{BinaryTree, Link, Locate},
};

pub struct SearchTree<K, C = DefaultKeyComparator<K>> {
    tree: BinaryTree<K, ()>,
    key_cmp: C,
    destructor: Option<Destructor<K>>,
}

crate::tree_base::impl_binary_common!(
    SearchTree, (),
    crate::tree_base::config::TreeKind::Bst
);

/// Insertion and deletion
impl<K: Debug, C: KeyComparator<K>> SearchTree<K, C> {
    pub fn insert(&mut self, key: K) -> Result<()> {
        match self.tree.locate(&self.key_cmp, &key) {
            Locate::Found(_) => {
                log::trace!("SearchTree::insert duplicate {:?}", key);
                Err(TreeError::DuplicateKey)
            }
            Locate::Vacant { parent, ord } => {
                self.tree.attach(key, (), parent, ord);
                Ok(())
            }
        }
    }

    /// Removes `key`. A node with two children takes over its in-order
    /// successor's record and the successor node is unlinked instead.
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
        log::trace!("SearchTree::delete {:?}", spliced.key);
        Ok(spliced.key)
    }
}

/// Day-Stout-Warren rebalance
impl<K, C: KeyComparator<K>> SearchTree<K, C> {
    /// Rebuilds the tree into minimal height, ceil(log2(n + 1)), in O(n)
    /// time and O(1) extra space.
    pub fn balance(&mut self) -> Result<()> {
        if self.is_empty() {
            return Err(TreeError::EmptyTree);
        }
        let size = self.tree_to_vine();
        debug_assert_eq!(size, self.len());

        // largest perfect tree size not above `size`
        let full = 1usize << (usize::BITS - 1 - (size + 1).leading_zeros());
        let mut vine = full - 1;

        // partial bottom row
        self.compress(size - vine);
        while vine > 1 {
            vine /= 2;
            self.compress(vine);
        }

        log::debug!(
            "SearchTree::balance {} nodes, height now {}",
            size,
            self.tree.height()
        );
        Ok(())
    }

    /// Right-rotates every left child onto the right spine, leaving a sorted
    /// right-leaning vine. Returns the vine length.
    fn tree_to_vine(&mut self) -> usize {
        let mut count = 0;
        let mut curr: Link = self.tree.root;
        while let Some(id) = curr {
            if self.tree.left(id).is_some() {
                curr = Some(self.tree.rotate_right(id));
            } else {
                count += 1;
                curr = self.tree.right(id);
            }
        }
        count
    }

    /// Left-rotates `count` alternate nodes down the right spine.
    fn compress(&mut self, count: usize) {
        let mut next = self.tree.root;
        for _ in 0..count {
            let id = match next {
                Some(id) => id,
                None => unreachable!("vine shorter than compression count"),
            };
            let top = self.tree.rotate_left(id);
            next = self.tree.right(top);
        }
    }
}

crate::tree_base::impl_ordered_tree!(SearchTree, crate::tree_base::config::TreeKind::Bst);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_base::iter::{CursorPos, IterMode, TreeCursor};

    fn ceil_log2(n: usize) -> usize {
        (usize::BITS - n.leading_zeros()) as usize - usize::from(n.is_power_of_two())
    }

    fn check_links(tree: &SearchTree<i32>) {
        let t = &tree.tree;
        if let Some(root) = t.root {
            assert_eq!(t.parent(root), None);
        }
        let mut c = t.cursor(IterMode::Begin);
        while let Some(CursorPos::Node(id)) = c.get_node() {
            for child in [t.left(id), t.right(id)].into_iter().flatten() {
                assert_eq!(t.parent(child), Some(id));
            }
            c.next();
        }
    }

    #[test]
    fn test_insert_and_order() {
        let mut tree = SearchTree::new();
        for k in [50, 30, 70, 20, 40, 60, 80] {
            tree.insert(k).unwrap();
        }
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.insert(40), Err(TreeError::DuplicateKey));
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.to_array(), vec![20, 30, 40, 50, 60, 70, 80]);
        assert_eq!(tree.min(), Ok(&20));
        assert_eq!(tree.max(), Ok(&80));
        assert_eq!(tree.search(&60), Ok(&60));
        assert_eq!(tree.search(&65), Err(TreeError::KeyNotFound));
        check_links(&tree);
    }

    #[test]
    fn test_delete_cases() {
        let mut tree = SearchTree::new();
        for k in [50, 30, 70, 20, 40, 60, 80, 35] {
            tree.insert(k).unwrap();
        }
        // leaf
        assert_eq!(tree.delete(&20), Ok(20));
        // one child
        assert_eq!(tree.delete(&40), Ok(40));
        // two children, root
        assert_eq!(tree.delete(&50), Ok(50));
        assert_eq!(tree.to_array(), vec![30, 35, 60, 70, 80]);
        assert!(!tree.key_exists(&50));
        assert_eq!(tree.delete(&50), Err(TreeError::KeyNotFound));
        check_links(&tree);

        for k in [30, 35, 60, 70, 80] {
            tree.delete(&k).unwrap();
        }
        assert!(tree.is_empty());
        assert_eq!(tree.delete(&1), Err(TreeError::EmptyTree));
        assert_eq!(tree.min(), Err(TreeError::EmptyTree));
    }

    #[test]
    fn test_dsw_degenerate_chain() {
        for n in [1usize, 2, 3, 7, 8, 100, 1023, 1024, 1025] {
            let mut tree = SearchTree::new();
            for k in 0..n as i32 {
                tree.insert(k).unwrap();
            }
            assert_eq!(tree.height(), n);

            tree.balance().unwrap();
            assert!(tree.height() <= ceil_log2(n + 1) + 1);
            assert_eq!(tree.height(), ceil_log2(n + 1));
            assert_eq!(tree.to_array(), (0..n as i32).collect::<Vec<_>>());
            assert_eq!(tree.len(), n);
            check_links(&tree);
        }
    }

    #[test]
    fn test_dsw_left_chain_then_mutate() {
        let mut tree = SearchTree::new();
        for k in (0..64).rev() {
            tree.insert(k).unwrap();
        }
        tree.balance().unwrap();
        assert_eq!(tree.height(), 7);
        tree.insert(100).unwrap();
        tree.delete(&10).unwrap();
        let mut expected: Vec<i32> = (0..64).filter(|&k| k != 10).collect();
        expected.push(100);
        assert_eq!(tree.to_array(), expected);
        check_links(&tree);
    }

    #[test]
    fn test_balance_empty() {
        let mut tree = SearchTree::<i32>::new();
        assert_eq!(tree.balance(), Err(TreeError::EmptyTree));
    }

    #[test]
    fn test_iter_both_ways() {
        let mut tree = SearchTree::new();
        for k in [5, 1, 9, 3, 7] {
            tree.insert(k).unwrap();
        }
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5, 7, 9]);
        assert_eq!(tree.iter().rev().copied().collect::<Vec<_>>(), vec![9, 7, 5, 3, 1]);
        let mut it = tree.iter();
        assert_eq!(it.next(), Some(&1));
        assert_eq!(it.next_back(), Some(&9));
        assert_eq!(it.len(), 3);
    }
}
