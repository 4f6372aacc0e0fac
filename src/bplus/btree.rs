use std::fmt::{self, Debug};

use slab::Slab;

use super::{
    iter::BPlusCursor,
    node::{LeafNode, Node},
};
use crate::tree_base::{
    comparator::{DefaultKeyComparator, Destructor, KeyComparator},
    config::{default_fanout, TreeConfig, TreeKind, MIN_FANOUT},
    error::{Result, TreeError},
    iter::{Iter, IterMode},
    node_id::NodeId,
    tree_stats::TreeStats,
};

/// B+ tree keeping every record in its leaves. Leaves are chained in key
/// order so sequential scans never climb back through inner nodes.
pub struct BPlusTree<K, C = DefaultKeyComparator<K>> {
    pub(super) nodes: Slab<Node<K>>,
    pub(super) root_: Option<NodeId>,
    pub(super) head_leaf_: Option<NodeId>,
    pub(super) tail_leaf_: Option<NodeId>,
    pub(super) stats_: TreeStats,
    /// Maximum keys per node at rest.
    pub(super) fanout: usize,
    pub(super) key_cmp: C,
    pub(super) destructor: Option<Destructor<K>>,
}

impl<K: Ord> BPlusTree<K> {
    pub fn new() -> Self {
        Self::build(DefaultKeyComparator::new(), default_fanout::<K>(), None)
    }

    pub fn with_fanout(fanout: usize) -> Result<Self> {
        Self::with_comparator(DefaultKeyComparator::new(), fanout)
    }
}

impl<K: Ord> Default for BPlusTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C: KeyComparator<K>> BPlusTree<K, C> {
    pub fn with_comparator(key_cmp: C, fanout: usize) -> Result<Self> {
        Self::from_config(TreeConfig::with_comparator(TreeKind::BPlus, key_cmp).fanout(fanout))
    }

    pub fn from_config(config: TreeConfig<K, C>) -> Result<Self> {
        let config = TreeConfig {
            kind: TreeKind::BPlus,
            ..config
        };
        config.validate()?;
        Ok(Self::build(config.comparator, config.fanout, config.destructor))
    }

    fn build(key_cmp: C, fanout: usize, destructor: Option<Destructor<K>>) -> Self {
        debug_assert!(fanout >= MIN_FANOUT);
        Self {
            nodes: Slab::new(),
            root_: None,
            head_leaf_: None,
            tail_leaf_: None,
            stats_: TreeStats::new(fanout),
            fanout,
            key_cmp,
            destructor,
        }
    }

    pub fn key_comp(&self) -> &C {
        &self.key_cmp
    }

    pub fn fanout(&self) -> usize {
        self.fanout
    }

    /// Fewest keys a non-root node may hold.
    #[inline]
    pub(super) fn min_keys(&self) -> usize {
        self.fanout / 2
    }
}

/// node allocation and deallocation functions
impl<K, C> BPlusTree<K, C> {
    #[inline]
    pub(super) fn node(&self, id: NodeId) -> &Node<K> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(super) fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        &mut self.nodes[id.index()]
    }

    pub(super) fn new_leaf(&mut self) -> NodeId {
        self.stats_.leaves += 1;
        NodeId::from(self.nodes.insert(Node::new_leaf(self.fanout)))
    }

    pub(super) fn new_inner(&mut self, level: u16) -> NodeId {
        self.stats_.inner_nodes += 1;
        NodeId::from(self.nodes.insert(Node::new_inner(level, self.fanout)))
    }

    pub(super) fn free_node(&mut self, id: NodeId) -> Node<K> {
        let n = self.nodes.remove(id.index());
        if n.is_leafnode() {
            self.stats_.leaves -= 1;
        } else {
            self.stats_.inner_nodes -= 1;
        }
        n
    }
}

/// B+ Tree Node Binary Search Functions
impl<K, C: KeyComparator<K>> BPlusTree<K, C> {
    /// First slot whose key is not less than `key`.
    #[inline]
    pub(super) fn find_lower(cmp: &C, keys: &[K], key: &K) -> usize {
        keys.partition_point(|probe| cmp.less(probe, key))
    }

    /// First slot whose key is greater than `key`. On an inner node this is
    /// the child whose key range holds `key`.
    #[inline]
    pub(super) fn find_upper(cmp: &C, keys: &[K], key: &K) -> usize {
        keys.partition_point(|probe| !cmp.less(key, probe))
    }

    pub(super) fn find_leaf(&self, key: &K) -> Option<NodeId> {
        let mut n = self.root_?;
        loop {
            match self.node(n) {
                Node::Inner(inner) => {
                    n = inner.get_child(Self::find_upper(&self.key_cmp, &inner.slotkey, key));
                }
                Node::Leaf(_) => return Some(n),
            }
        }
    }

    /// Smallest key stored below `id`.
    pub(super) fn subtree_first(&self, mut id: NodeId) -> &K {
        loop {
            match self.node(id) {
                Node::Inner(inner) => id = inner.get_child(0),
                Node::Leaf(leaf) => match leaf.slotdata.first() {
                    Some(key) => return key,
                    None => unreachable!("empty leaf {:?} below the root", id),
                },
            }
        }
    }
}

/// Access Functions to the item count
impl<K, C> BPlusTree<K, C> {
    pub fn len(&self) -> usize {
        self.stats_.size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of levels, leaves included.
    pub fn height(&self) -> usize {
        match self.root_ {
            Some(root) => self.node(root).level() as usize + 1,
            None => 0,
        }
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            height: self.height(),
            ..self.stats_.clone()
        }
    }
}

/// Access function querying the tree by descending to a leaf
impl<K, C: KeyComparator<K>> BPlusTree<K, C> {
    pub fn key_exists(&self, key: &K) -> bool {
        self.search(key).is_ok()
    }

    /// Returns the stored record comparing equal to `key`.
    pub fn search(&self, key: &K) -> Result<&K> {
        let leaf = self.find_leaf(key).ok_or(TreeError::KeyNotFound)?;
        let data = &self.node(leaf).as_leaf().slotdata;
        let slot = Self::find_lower(&self.key_cmp, data, key);
        match data.get(slot) {
            Some(found) if self.key_cmp.equal(key, found) => Ok(found),
            _ => Err(TreeError::KeyNotFound),
        }
    }

    pub fn min(&self) -> Result<&K> {
        self.head_leaf_
            .and_then(|id| self.node(id).as_leaf().slotdata.first())
            .ok_or(TreeError::EmptyTree)
    }

    pub fn max(&self) -> Result<&K> {
        self.tail_leaf_
            .and_then(|id| self.node(id).as_leaf().slotdata.last())
            .ok_or(TreeError::EmptyTree)
    }

    /// Cursor on `key`, or an end cursor if it is absent.
    pub fn find(&self, key: &K) -> BPlusCursor<'_, K, C> {
        let leaf = match self.find_leaf(key) {
            Some(leaf) => leaf,
            None => return BPlusCursor::end(self),
        };
        let data = &self.node(leaf).as_leaf().slotdata;
        let slot = Self::find_lower(&self.key_cmp, data, key);
        match data.get(slot) {
            Some(found) if self.key_cmp.equal(key, found) => BPlusCursor::new(self, leaf, slot),
            _ => BPlusCursor::end(self),
        }
    }

    /// Cursor on the first key not less than `key`.
    pub fn lower_bound(&self, key: &K) -> BPlusCursor<'_, K, C> {
        match self.find_leaf(key) {
            Some(leaf) => {
                let data = &self.node(leaf).as_leaf().slotdata;
                BPlusCursor::at_or_after(self, leaf, Self::find_lower(&self.key_cmp, data, key))
            }
            None => BPlusCursor::end(self),
        }
    }

    /// Cursor on the first key greater than `key`.
    pub fn upper_bound(&self, key: &K) -> BPlusCursor<'_, K, C> {
        match self.find_leaf(key) {
            Some(leaf) => {
                let data = &self.node(leaf).as_leaf().slotdata;
                BPlusCursor::at_or_after(self, leaf, Self::find_upper(&self.key_cmp, data, key))
            }
            None => BPlusCursor::end(self),
        }
    }

    /// `Begin` and `End` start on the first and last leaf of the chain. A B+
    /// tree has no record at its root, so `Root` is rejected.
    pub fn cursor(&self, mode: IterMode) -> Result<BPlusCursor<'_, K, C>> {
        match mode {
            IterMode::Begin => Ok(match self.head_leaf_ {
                Some(head) => BPlusCursor::new(self, head, 0),
                None => BPlusCursor::end(self),
            }),
            IterMode::End => Ok(match self.tail_leaf_ {
                Some(tail) => {
                    let last = self.node(tail).as_leaf().slotdata.len() - 1;
                    BPlusCursor::new(self, tail, last)
                }
                None => BPlusCursor::end(self),
            }),
            IterMode::Root => Err(TreeError::InvalidArgument(
                "B+ tree cursors cannot start at the root",
            )),
        }
    }

    pub fn iter(&self) -> Iter<'_, K, BPlusCursor<'_, K, C>> {
        let front = self.cursor(IterMode::Begin).unwrap_or_else(|_| BPlusCursor::end(self));
        let back = self.cursor(IterMode::End).unwrap_or_else(|_| BPlusCursor::end(self));
        Iter::new(front, back, self.len())
    }

    /// Copies every record by walking the leaf chain.
    pub fn to_array(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut out = Vec::with_capacity(self.len());
        let mut n = self.head_leaf_;
        while let Some(id) = n {
            let leaf = self.node(id).as_leaf();
            out.extend(leaf.slotdata.iter().cloned());
            n = leaf.next_leaf;
        }
        out
    }
}

/// Insertion
impl<K: Clone + Debug, C: KeyComparator<K>> BPlusTree<K, C> {
    /// Inserts `key`, failing with `DuplicateKey` if an equal key exists.
    pub fn insert(&mut self, key: K) -> Result<()> {
        let root = match self.root_ {
            Some(root) => root,
            None => {
                let leaf = self.new_leaf();
                self.root_ = Some(leaf);
                self.head_leaf_ = Some(leaf);
                self.tail_leaf_ = Some(leaf);
                leaf
            }
        };

        if let Some((newkey, newchild)) = self.insert_descend(root, key)? {
            let level = self.node(root).level() + 1;
            let newroot = self.new_inner(level);
            let inner = self.node_mut(newroot).as_inner_mut();
            inner.slotkey.push(newkey);
            inner.childid.push(root);
            inner.childid.push(newchild);
            self.root_ = Some(newroot);
            log::debug!("BPlusTree::insert grew new root {:?} at level {}", newroot, level);
        }

        self.stats_.size += 1;
        Ok(())
    }

    /// Descends to the leaf owning `key` and inserts it there. A node that
    /// overflows is split after the insert and the new sibling with its
    /// separator key is handed back to the caller, up to the root.
    fn insert_descend(&mut self, n: NodeId, key: K) -> Result<Option<(K, NodeId)>> {
        if self.node(n).is_leafnode() {
            let leaf = self.nodes[n.index()].as_leaf_mut();
            let slot = Self::find_lower(&self.key_cmp, &leaf.slotdata, &key);
            if slot < leaf.slotdata.len() && self.key_cmp.equal(&key, &leaf.slotdata[slot]) {
                log::trace!("BPlusTree::insert duplicate {:?}", key);
                return Err(TreeError::DuplicateKey);
            }
            leaf.slotdata.insert(slot, key);
            if leaf.is_overflow(self.fanout) {
                return Ok(Some(self.split_leaf_node(n)));
            }
            return Ok(None);
        }

        let (slot, child) = {
            let inner = self.node(n).as_inner();
            let slot = Self::find_upper(&self.key_cmp, &inner.slotkey, &key);
            (slot, inner.get_child(slot))
        };

        if let Some((newkey, newchild)) = self.insert_descend(child, key)? {
            log::debug!(
                "BPlusTree::insert_descend newchild with key {:?} node {:?} at slot {}",
                newkey,
                newchild,
                slot
            );
            let inner = self.nodes[n.index()].as_inner_mut();
            inner.slotkey.insert(slot, newkey);
            inner.childid.insert(slot + 1, newchild);
            if inner.is_overflow(self.fanout) {
                return Ok(Some(self.split_inner_node(n)));
            }
        }
        Ok(None)
    }

    /// Moves the upper half of an overflowing leaf into a new sibling linked
    /// right after it in the leaf chain. Returns the sibling and its first
    /// key.
    fn split_leaf_node(&mut self, n: NodeId) -> (K, NodeId) {
        let fanout = self.fanout;
        let newleaf = self.new_leaf();

        let leaf = self.node_mut(n).as_leaf_mut();
        let mid = leaf.slotdata.len() >> 1;
        let mut upper = Vec::with_capacity(fanout + 1);
        upper.extend(leaf.slotdata.drain(mid..));
        let next = leaf.next_leaf;
        leaf.next_leaf = Some(newleaf);
        log::debug!(
            "BPlusTree::split_leaf_node {:?} into {} and {}",
            n,
            mid,
            upper.len()
        );

        let upkey = upper[0].clone();
        *self.node_mut(newleaf).as_leaf_mut() = LeafNode {
            slotdata: upper,
            prev_leaf: Some(n),
            next_leaf: next,
        };

        match next {
            Some(next) => self.node_mut(next).as_leaf_mut().prev_leaf = Some(newleaf),
            None => {
                debug_assert!(self.tail_leaf_ == Some(n));
                self.tail_leaf_ = Some(newleaf);
            }
        }

        (upkey, newleaf)
    }

    /// Splits an overflowing inner node around its middle key, which moves
    /// up to the parent instead of staying in either half.
    fn split_inner_node(&mut self, n: NodeId) -> (K, NodeId) {
        let fanout = self.fanout;
        let level = self.node(n).level();
        let newinner = self.new_inner(level);

        let inner = self.node_mut(n).as_inner_mut();
        let mid = inner.slotkey.len() >> 1;
        let mut keys = Vec::with_capacity(fanout + 1);
        keys.extend(inner.slotkey.drain(mid + 1..));
        let mut children = Vec::with_capacity(fanout + 2);
        children.extend(inner.childid.drain(mid + 1..));
        let upkey = match inner.slotkey.pop() {
            Some(key) => key,
            None => unreachable!("split of inner node {:?} without keys", n),
        };
        log::debug!(
            "BPlusTree::split_inner_node {:?} into two nodes {} and {} sized",
            n,
            mid,
            keys.len()
        );

        let split = self.node_mut(newinner).as_inner_mut();
        split.slotkey = keys;
        split.childid = children;

        (upkey, newinner)
    }
}

/// Bulk loading
impl<K: Clone + Debug, C: KeyComparator<K>> BPlusTree<K, C> {
    /// Sizes for `total` items split into as few groups of at most `max` as
    /// possible, spread evenly so no group falls under half capacity.
    fn chunk_sizes(total: usize, max: usize) -> impl Iterator<Item = usize> {
        let count = (total + max - 1) / max;
        let base = total / count;
        let extra = total % count;
        (0..count).map(move |i| base + usize::from(i < extra))
    }

    /// Builds the tree bottom-up from strictly ascending keys, filling
    /// leaves left to right. Only valid on an empty tree.
    pub fn bulk_load<I: IntoIterator<Item = K>>(&mut self, keys: I) -> Result<()> {
        if !self.is_empty() {
            return Err(TreeError::InvalidArgument("bulk_load needs an empty tree"));
        }
        let keys: Vec<K> = keys.into_iter().collect();
        if keys.windows(2).any(|w| !self.key_cmp.less(&w[0], &w[1])) {
            return Err(TreeError::InvalidArgument(
                "bulk_load input must be strictly ascending",
            ));
        }
        if keys.is_empty() {
            return Ok(());
        }
        let total = keys.len();

        let mut level_nodes: Vec<(K, NodeId)> = Vec::new();
        let mut data = keys.into_iter();
        let mut prev: Option<NodeId> = None;
        for size in Self::chunk_sizes(total, self.fanout) {
            let id = self.new_leaf();
            let leaf = self.node_mut(id).as_leaf_mut();
            leaf.slotdata.extend(data.by_ref().take(size));
            leaf.prev_leaf = prev;
            let first = leaf.slotdata[0].clone();
            match prev {
                Some(p) => self.node_mut(p).as_leaf_mut().next_leaf = Some(id),
                None => self.head_leaf_ = Some(id),
            }
            prev = Some(id);
            level_nodes.push((first, id));
        }
        self.tail_leaf_ = prev;

        let mut level = 0;
        while level_nodes.len() > 1 {
            level += 1;
            let mut upper = Vec::new();
            let sizes: Vec<usize> = Self::chunk_sizes(level_nodes.len(), self.fanout + 1).collect();
            let mut below = level_nodes.into_iter();
            for size in sizes {
                let id = self.new_inner(level);
                let mut group = below.by_ref().take(size);
                let (first, child) = match group.next() {
                    Some(entry) => entry,
                    None => unreachable!("empty bulk load group"),
                };
                let inner = self.node_mut(id).as_inner_mut();
                inner.childid.push(child);
                for (key, child) in group {
                    inner.slotkey.push(key);
                    inner.childid.push(child);
                }
                upper.push((first, id));
            }
            level_nodes = upper;
        }

        self.root_ = level_nodes.pop().map(|(_, id)| id);
        self.stats_.size = total;
        log::debug!(
            "BPlusTree::bulk_load {} keys into {} leaves, height {}",
            total,
            self.stats_.leaves,
            self.height()
        );
        Ok(())
    }
}

/// Balancing and teardown
impl<K, C: KeyComparator<K>> BPlusTree<K, C> {
    /// AVL-style balancing has no meaning here; splits and merges keep the
    /// tree balanced. Only reports whether the tree is empty.
    pub fn balance(&mut self) -> Result<()> {
        if self.is_empty() {
            return Err(TreeError::EmptyTree);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.root_ = None;
        self.head_leaf_ = None;
        self.tail_leaf_ = None;
        self.stats_ = TreeStats::new(self.fanout);
    }

    /// Drops every record without calling the destructor.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.reset();
    }

    /// Empties the tree, handing each record to the destructor in key order.
    pub fn clear_with_entries(&mut self) {
        let mut n = self.head_leaf_;
        let mut records = Vec::with_capacity(self.len());
        while let Some(id) = n {
            let leaf = self.node_mut(id).as_leaf_mut();
            records.append(&mut leaf.slotdata);
            n = leaf.next_leaf;
        }
        self.clear();
        if let Some(destructor) = self.destructor.as_mut() {
            records.into_iter().for_each(destructor);
        }
    }
}

/// Debug
impl<K: Debug, C> BPlusTree<K, C> {
    fn print_leaves(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "leaves:")?;
        let mut n = self.head_leaf_;
        while let Some(id) = n {
            write!(f, " {:?}", id)?;
            n = self.node(id).as_leaf().next_leaf;
        }
        Ok(())
    }

    fn print_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            write!(f, "  ")?;
        }
        let n = self.node(id);
        writeln!(f, "node {:?} level {} slotuse {}", id, n.level(), n.slotuse())?;

        for _ in 0..depth {
            write!(f, "  ")?;
        }
        match n {
            Node::Leaf(leaf) => {
                write!(f, "  leaf prev {:?} next {:?} |", leaf.prev_leaf, leaf.next_leaf)?;
                for key in &leaf.slotdata {
                    write!(f, " {:?}", key)?;
                }
                writeln!(f)?;
            }
            Node::Inner(inner) => {
                for (child, key) in inner.childid.iter().zip(&inner.slotkey) {
                    write!(f, "({:?}) {:?} ", child, key)?;
                }
                writeln!(f, "({:?})", inner.childid[inner.slotkey.len()])?;
                for &child in &inner.childid {
                    self.print_node(f, child, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

impl<K: Debug, C> Debug for BPlusTree<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(root) = self.root_ {
            self.print_node(f, root, 0)?;
            self.print_leaves(f)?;
        }
        Ok(())
    }
}

impl<'a, K, C: KeyComparator<K>> IntoIterator for &'a BPlusTree<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K, BPlusCursor<'a, K, C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

crate::tree_base::impl_ordered_tree!(BPlusTree, TreeKind::BPlus);
