use std::iter::FusedIterator;
use std::marker::PhantomData;

use super::node_id::NodeId;

/// Where a freshly created cursor starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterMode {
    /// On the smallest key.
    Begin,
    /// On the largest key.
    End,
    /// On the root node. Only node-rooted (binary) trees support it.
    Root,
}

/// What a cursor currently points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorPos {
    /// A binary tree node.
    Node(NodeId),
    /// A slot inside a B+ tree leaf.
    Slot { leaf: NodeId, slot: usize },
}

/// Bidirectional cursor over a tree in key order. Stepping past either end
/// leaves the cursor at the end position, from which it never moves again.
///
/// A cursor holds a shared borrow of its tree, so the tree cannot be mutated
/// while the cursor is alive.
pub trait TreeCursor<'a, K: 'a> {
    fn get_data(&self) -> Option<&'a K>;
    fn get_node(&self) -> Option<CursorPos>;
    /// Move to the in-order successor.
    fn next(&mut self);
    /// Move to the in-order predecessor.
    fn prev(&mut self);

    #[inline]
    fn is_end(&self) -> bool {
        self.get_node().is_none()
    }
}

impl<'a, K: 'a, C: TreeCursor<'a, K> + ?Sized> TreeCursor<'a, K> for Box<C> {
    fn get_data(&self) -> Option<&'a K> {
        (**self).get_data()
    }

    fn get_node(&self) -> Option<CursorPos> {
        (**self).get_node()
    }

    fn next(&mut self) {
        (**self).next()
    }

    fn prev(&mut self) {
        (**self).prev()
    }
}

/// Double-ended iterator driven by a pair of cursors.
pub struct Iter<'a, K, C> {
    front: C,
    back: C,
    remaining: usize,
    _k: PhantomData<&'a K>,
}

impl<'a, K, C> Iter<'a, K, C> {
    pub(crate) fn new(front: C, back: C, remaining: usize) -> Self {
        Self {
            front,
            back,
            remaining,
            _k: PhantomData,
        }
    }
}

impl<'a, K: 'a, C: TreeCursor<'a, K>> Iterator for Iter<'a, K, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        let data = self.front.get_data();
        self.front.next();
        self.remaining -= 1;
        data
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, C: TreeCursor<'a, K>> DoubleEndedIterator for Iter<'a, K, C> {
    fn next_back(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        let data = self.back.get_data();
        self.back.prev();
        self.remaining -= 1;
        data
    }
}

impl<'a, K: 'a, C: TreeCursor<'a, K>> ExactSizeIterator for Iter<'a, K, C> {}

impl<'a, K: 'a, C: TreeCursor<'a, K>> FusedIterator for Iter<'a, K, C> {}
