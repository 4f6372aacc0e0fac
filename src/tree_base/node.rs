//! Node storage and structural primitives shared by the binary backends
//! (search tree, AVL tree, red-black tree). A `None` link stands for the
//! empty subtree and for "no parent" above the root.

use std::cmp::Ordering;
use std::fmt::{self, Debug};

use slab::Slab;

use super::{
    comparator::KeyComparator,
    iter::{CursorPos, IterMode, TreeCursor},
    node_id::NodeId,
    tree_stats::TreeStats,
};

pub type Link = Option<NodeId>;

#[derive(Debug)]
pub struct BinNode<K, M> {
    pub key: K,
    pub left: Link,
    pub right: Link,
    pub parent: Link,
    /// Balancing tag: `()`, AVL balance or red-black color.
    pub tag: M,
}

/// Result of descending to a key.
pub enum Locate {
    Found(NodeId),
    /// Key is absent; it would hang off `parent` on the given side
    /// (`parent == None` means the tree is empty).
    Vacant { parent: Link, ord: Ordering },
}

/// A node removed from the tree by `splice`, plus where it used to hang.
pub struct Spliced<K, M> {
    pub key: K,
    pub tag: M,
    /// The child that took the removed node's place.
    pub child: Link,
    pub parent: Link,
    /// Whether the removed node was its parent's left child.
    pub was_left: bool,
}

pub struct BinaryTree<K, M> {
    pub nodes: Slab<BinNode<K, M>>,
    pub root: Link,
}

impl<K, M> BinaryTree<K, M> {
    pub fn new() -> Self {
        Self {
            nodes: Slab::new(),
            root: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &BinNode<K, M> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut BinNode<K, M> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn left(&self, id: NodeId) -> Link {
        self.node(id).left
    }

    #[inline]
    pub fn right(&self, id: NodeId) -> Link {
        self.node(id).right
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Link {
        self.node(id).parent
    }

    #[inline]
    pub fn key(&self, id: NodeId) -> &K {
        &self.node(id).key
    }

    #[inline]
    pub fn is_left_child(&self, id: NodeId) -> bool {
        match self.parent(id) {
            Some(p) => self.left(p) == Some(id),
            None => false,
        }
    }
}

/// Navigation
impl<K, M> BinaryTree<K, M> {
    pub fn min_from(&self, mut id: NodeId) -> NodeId {
        while let Some(l) = self.left(id) {
            id = l;
        }
        id
    }

    pub fn max_from(&self, mut id: NodeId) -> NodeId {
        while let Some(r) = self.right(id) {
            id = r;
        }
        id
    }

    pub fn first(&self) -> Link {
        self.root.map(|r| self.min_from(r))
    }

    pub fn last(&self) -> Link {
        self.root.map(|r| self.max_from(r))
    }

    /// In-order successor by parent chasing.
    pub fn successor(&self, id: NodeId) -> Link {
        if let Some(r) = self.right(id) {
            return Some(self.min_from(r));
        }
        let mut child = id;
        let mut parent = self.parent(id);
        while let Some(p) = parent {
            if self.left(p) == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.parent(p);
        }
        None
    }

    /// In-order predecessor by parent chasing.
    pub fn predecessor(&self, id: NodeId) -> Link {
        if let Some(l) = self.left(id) {
            return Some(self.max_from(l));
        }
        let mut child = id;
        let mut parent = self.parent(id);
        while let Some(p) = parent {
            if self.right(p) == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.parent(p);
        }
        None
    }

    pub fn locate<C: KeyComparator<K>>(&self, cmp: &C, key: &K) -> Locate {
        let mut parent = None;
        let mut ord = Ordering::Equal;
        let mut curr = self.root;
        while let Some(id) = curr {
            ord = cmp.compare(key, self.key(id));
            parent = Some(id);
            curr = match ord {
                Ordering::Less => self.left(id),
                Ordering::Greater => self.right(id),
                Ordering::Equal => return Locate::Found(id),
            };
        }
        Locate::Vacant { parent, ord }
    }

    pub fn find<C: KeyComparator<K>>(&self, cmp: &C, key: &K) -> Link {
        match self.locate(cmp, key) {
            Locate::Found(id) => Some(id),
            Locate::Vacant { .. } => None,
        }
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            max = max.max(depth);
            if let Some(l) = self.left(id) {
                stack.push((l, depth + 1));
            }
            if let Some(r) = self.right(id) {
                stack.push((r, depth + 1));
            }
        }
        max
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::new(1);
        stats.size = self.len();
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            stats.height = stats.height.max(depth);
            let n = self.node(id);
            if n.left.is_none() && n.right.is_none() {
                stats.leaves += 1;
            } else {
                stats.inner_nodes += 1;
            }
            stack.extend(n.left.into_iter().chain(n.right).map(|c| (c, depth + 1)));
        }
        stats
    }

    pub fn cursor(&self, mode: IterMode) -> BinCursor<'_, K, M> {
        let node = match mode {
            IterMode::Begin => self.first(),
            IterMode::End => self.last(),
            IterMode::Root => self.root,
        };
        BinCursor { tree: self, node }
    }

    pub fn to_vec(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut out = Vec::with_capacity(self.len());
        let mut curr = self.first();
        while let Some(id) = curr {
            out.push(self.key(id).clone());
            curr = self.successor(id);
        }
        out
    }
}

/// Mutation
impl<K, M> BinaryTree<K, M> {
    /// Hangs a new leaf below `parent` on the side picked by `ord`.
    pub fn attach(&mut self, key: K, tag: M, parent: Link, ord: Ordering) -> NodeId {
        let id = NodeId::from(self.nodes.insert(BinNode {
            key,
            left: None,
            right: None,
            parent,
            tag,
        }));
        match parent {
            None => self.root = Some(id),
            Some(p) if ord == Ordering::Less => self.node_mut(p).left = Some(id),
            Some(p) => self.node_mut(p).right = Some(id),
        }
        id
    }

    /// Points `parent`'s link that used to hold `old` at `new`.
    pub fn replace_child(&mut self, parent: Link, old: NodeId, new: Link) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let p = self.node_mut(p);
                if p.left == Some(old) {
                    p.left = new;
                } else {
                    debug_assert!(p.right == Some(old));
                    p.right = new;
                }
            }
        }
    }

    /// Left rotation around `x`; returns the new subtree root.
    pub fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let y = match self.right(x) {
            Some(y) => y,
            None => unreachable!("rotate_left on {:?} without right child", x),
        };
        let beta = self.left(y);
        let parent = self.parent(x);

        self.node_mut(x).right = beta;
        if let Some(b) = beta {
            self.node_mut(b).parent = Some(x);
        }
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));
        self.node_mut(y).left = Some(x);
        self.node_mut(x).parent = Some(y);
        y
    }

    /// Right rotation around `x`; returns the new subtree root.
    pub fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let y = match self.left(x) {
            Some(y) => y,
            None => unreachable!("rotate_right on {:?} without left child", x),
        };
        let beta = self.right(y);
        let parent = self.parent(x);

        self.node_mut(x).left = beta;
        if let Some(b) = beta {
            self.node_mut(b).parent = Some(x);
        }
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));
        self.node_mut(y).right = Some(x);
        self.node_mut(x).parent = Some(y);
        y
    }

    pub fn swap_keys(&mut self, a: NodeId, b: NodeId) {
        if a != b {
            match self.nodes.get2_mut(a.index(), b.index()) {
                Some((x, y)) => std::mem::swap(&mut x.key, &mut y.key),
                None => unreachable!("dangling node in pair {:?} {:?}", a, b),
            }
        }
    }

    /// For a node with two children, moves its key down into its in-order
    /// successor (which has no left child) and returns the successor. Other
    /// nodes are returned unchanged. The result can always be spliced.
    pub fn prepare_removal(&mut self, id: NodeId) -> NodeId {
        match (self.left(id), self.right(id)) {
            (Some(_), Some(r)) => {
                let succ = self.min_from(r);
                self.swap_keys(id, succ);
                succ
            }
            _ => id,
        }
    }

    /// Unlinks a node with at most one child, lifting that child into its
    /// place.
    pub fn splice(&mut self, id: NodeId) -> Spliced<K, M> {
        let node = self.node(id);
        debug_assert!(node.left.is_none() || node.right.is_none());
        let child = node.left.or(node.right);
        let parent = node.parent;
        let was_left = self.is_left_child(id);

        if let Some(c) = child {
            self.node_mut(c).parent = parent;
        }
        self.replace_child(parent, id, child);

        let node = self.nodes.remove(id.index());
        Spliced {
            key: node.key,
            tag: node.tag,
            child,
            parent,
            was_left,
        }
    }

    pub fn drain_keys(&mut self) -> Vec<K> {
        self.root = None;
        self.nodes.drain().map(|n| n.key).collect()
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.nodes.clear();
    }
}

/// Debug
impl<K: Debug, M: Debug> BinaryTree<K, M> {
    fn print_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        if let Some(r) = self.right(id) {
            self.print_node(f, r, depth + 1)?;
        }
        for _ in 0..depth {
            write!(f, "  ")?;
        }
        let n = self.node(id);
        writeln!(f, "{:?} {:?} {:?}", id, n.key, n.tag)?;
        if let Some(l) = self.left(id) {
            self.print_node(f, l, depth + 1)?;
        }
        Ok(())
    }
}

impl<K: Debug, M: Debug> Debug for BinaryTree<K, M> {
    /// Sideways dump: right subtree above, left subtree below each node.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(root) = self.root {
            self.print_node(f, root, 0)?;
        }
        Ok(())
    }
}

/// Cursor shared by every binary backend.
pub struct BinCursor<'a, K, M> {
    tree: &'a BinaryTree<K, M>,
    node: Link,
}

impl<'a, K, M> Clone for BinCursor<'a, K, M> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            node: self.node,
        }
    }
}

impl<'a, K, M> TreeCursor<'a, K> for BinCursor<'a, K, M> {
    #[inline]
    fn get_data(&self) -> Option<&'a K> {
        let tree = self.tree;
        self.node.map(|id| tree.key(id))
    }

    #[inline]
    fn get_node(&self) -> Option<CursorPos> {
        self.node.map(CursorPos::Node)
    }

    fn next(&mut self) {
        if let Some(id) = self.node {
            self.node = self.tree.successor(id);
        }
    }

    fn prev(&mut self) {
        if let Some(id) = self.node {
            self.node = self.tree.predecessor(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_base::comparator::DefaultKeyComparator;

    fn build(keys: &[i32]) -> BinaryTree<i32, ()> {
        let cmp = DefaultKeyComparator::new();
        let mut tree = BinaryTree::new();
        for &k in keys {
            match tree.locate(&cmp, &k) {
                Locate::Vacant { parent, ord } => {
                    tree.attach(k, (), parent, ord);
                }
                Locate::Found(_) => panic!("duplicate {}", k),
            }
        }
        tree
    }

    #[test]
    fn rotations_keep_order() {
        let mut tree = build(&[4, 2, 6, 1, 3, 5, 7]);
        let root = tree.root.unwrap();
        let new_root = tree.rotate_left(root);
        assert_eq!(*tree.key(new_root), 6);
        assert_eq!(tree.parent(new_root), None);
        assert_eq!(tree.to_vec(), vec![1, 2, 3, 4, 5, 6, 7]);

        let back = tree.rotate_right(new_root);
        assert_eq!(back, root);
        assert_eq!(tree.root, Some(root));
        assert_eq!(tree.to_vec(), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn cursor_walks_both_ways() {
        let tree = build(&[4, 2, 6, 1, 3, 5, 7]);
        let mut c = tree.cursor(IterMode::Begin);
        let mut seen = vec![];
        while let Some(k) = c.get_data() {
            seen.push(*k);
            c.next();
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(c.is_end());

        let mut c = tree.cursor(IterMode::End);
        seen.clear();
        while !c.is_end() {
            seen.push(*c.get_data().unwrap());
            c.prev();
        }
        assert_eq!(seen, vec![7, 6, 5, 4, 3, 2, 1]);

        assert_eq!(tree.cursor(IterMode::Root).get_data(), Some(&4));
    }

    #[test]
    fn splice_two_child_node() {
        let mut tree = build(&[4, 2, 6, 1, 3, 5, 7]);
        let cmp = DefaultKeyComparator::new();
        let id = tree.find(&cmp, &4).unwrap();
        let victim = tree.prepare_removal(id);
        let spliced = tree.splice(victim);
        assert_eq!(spliced.key, 4);
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.to_vec(), vec![1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn freed_slot_is_reused() {
        let mut tree = build(&[2, 1, 3]);
        let cmp = DefaultKeyComparator::new();
        let leaf = tree.find(&cmp, &3).unwrap();
        assert_eq!(tree.splice(leaf).key, 3);
        assert_eq!(tree.len(), 2);

        let parent = tree.root;
        let id = tree.attach(4, (), parent, Ordering::Greater);
        assert_eq!(id, leaf);
        assert_eq!(tree.to_vec(), vec![1, 2, 4]);

        let mut keys = tree.drain_keys();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2, 4]);
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.root, None);
    }
}
