use crate::tree_base::node_id::NodeId;

#[derive(Debug)]
pub struct InnerNode<K> {
    /// Distance to the leaf level; children of a level-1 node are leaves.
    pub level: u16,
    /// `slotkey[i]` is the smallest key below `childid[i + 1]`.
    pub slotkey: Vec<K>,
    pub childid: Vec<NodeId>,
}

#[derive(Debug)]
pub struct LeafNode<K> {
    pub slotdata: Vec<K>,
    pub prev_leaf: Option<NodeId>,
    pub next_leaf: Option<NodeId>,
}

#[derive(Debug)]
pub enum Node<K> {
    Inner(InnerNode<K>),
    Leaf(LeafNode<K>),
}

impl<K> Node<K> {
    /// Every node reserves one slot beyond `fanout` so an insert can land
    /// before the overflow split runs.
    pub fn new_leaf(fanout: usize) -> Self {
        Node::Leaf(LeafNode {
            slotdata: Vec::with_capacity(fanout + 1),
            prev_leaf: None,
            next_leaf: None,
        })
    }

    pub fn new_inner(level: u16, fanout: usize) -> Self {
        Node::Inner(InnerNode {
            level,
            slotkey: Vec::with_capacity(fanout + 1),
            childid: Vec::with_capacity(fanout + 2),
        })
    }

    #[inline]
    pub fn is_leafnode(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    #[inline]
    pub fn level(&self) -> u16 {
        match self {
            Node::Inner(inner) => inner.level,
            Node::Leaf(_) => 0,
        }
    }

    #[inline]
    pub fn slotuse(&self) -> usize {
        match self {
            Node::Inner(inner) => inner.slotkey.len(),
            Node::Leaf(leaf) => leaf.slotdata.len(),
        }
    }

    /// Whether the node is at its minimum fill and has nothing to lend.
    #[inline]
    pub fn is_few(&self, min: usize) -> bool {
        match self {
            Node::Inner(inner) => inner.is_few(min),
            Node::Leaf(leaf) => leaf.is_few(min),
        }
    }

    #[inline]
    pub fn as_leaf(&self) -> &LeafNode<K> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Inner(_) => unreachable!("expected a leaf node"),
        }
    }

    #[inline]
    pub fn as_leaf_mut(&mut self) -> &mut LeafNode<K> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Inner(_) => unreachable!("expected a leaf node"),
        }
    }

    #[inline]
    pub fn as_inner(&self) -> &InnerNode<K> {
        match self {
            Node::Inner(inner) => inner,
            Node::Leaf(_) => unreachable!("expected an inner node"),
        }
    }

    #[inline]
    pub fn as_inner_mut(&mut self) -> &mut InnerNode<K> {
        match self {
            Node::Inner(inner) => inner,
            Node::Leaf(_) => unreachable!("expected an inner node"),
        }
    }
}

impl<K> InnerNode<K> {
    #[inline]
    pub fn is_overflow(&self, fanout: usize) -> bool {
        self.slotkey.len() > fanout
    }

    #[inline]
    pub fn is_few(&self, min: usize) -> bool {
        self.slotkey.len() <= min
    }

    #[inline]
    pub fn is_underflow(&self, min: usize) -> bool {
        self.slotkey.len() < min
    }

    #[inline]
    pub fn get_child(&self, slot: usize) -> NodeId {
        self.childid[slot]
    }
}

impl<K> LeafNode<K> {
    #[inline]
    pub fn is_overflow(&self, fanout: usize) -> bool {
        self.slotdata.len() > fanout
    }

    #[inline]
    pub fn is_few(&self, min: usize) -> bool {
        self.slotdata.len() <= min
    }

    #[inline]
    pub fn is_underflow(&self, min: usize) -> bool {
        self.slotdata.len() < min
    }
}
