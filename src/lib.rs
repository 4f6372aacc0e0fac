//! A family of ordered containers behind one interface: an unbalanced
//! binary search tree with on-demand Day-Stout-Warren rebalancing, an AVL
//! tree, a red-black tree and a B+ tree.
//!
//! Each backend can be used directly, or picked at runtime through
//! [`create_tree`], which hands back a `Box<dyn OrderedTree<K>>`.
//!
//! ```
//! use ordtree::{create_tree, IterMode, TreeConfig, TreeCursor, TreeKind};
//!
//! let mut tree = create_tree(TreeConfig::<u32>::new(TreeKind::BPlus).fanout(4)).unwrap();
//! for k in [5, 1, 4, 2, 3] {
//!     tree.insert(k).unwrap();
//! }
//! assert_eq!(tree.to_array(), vec![1, 2, 3, 4, 5]);
//!
//! let mut cur = tree.cursor(IterMode::End).unwrap();
//! cur.prev();
//! assert_eq!(cur.get_data(), Some(&4));
//! ```

pub mod avl;
pub mod bplus;
pub mod bst;
pub mod ordered_map;
pub mod rbtree;
pub mod tree_base;

pub use self::{
    avl::AvlTree,
    bplus::{BPlusCursor, BPlusTree},
    bst::SearchTree,
    ordered_map::{create_tree, OrderedTree},
    rbtree::RbTree,
    tree_base::{
        comparator::{DefaultKeyComparator, Destructor, FnComparator, KeyComparator},
        config::{TreeConfig, TreeKind},
        error::{Result, TreeError},
        iter::{CursorPos, Iter, IterMode, TreeCursor},
        node::BinCursor,
        tree_stats::TreeStats,
    },
};
