//! Backend-agnostic interface over the four ordered trees.

use std::fmt::Debug;

use crate::{
    avl::AvlTree,
    bplus::BPlusTree,
    bst::SearchTree,
    rbtree::RbTree,
    tree_base::{
        comparator::KeyComparator,
        config::{TreeConfig, TreeKind},
        error::Result,
        iter::{IterMode, TreeCursor},
        tree_stats::TreeStats,
    },
};

/// Operations every backend provides. Object safe, so callers that pick the
/// backend at runtime can hold a `Box<dyn OrderedTree<K>>`.
pub trait OrderedTree<K: Clone + Debug> {
    fn kind(&self) -> TreeKind;

    /// Number of records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn height(&self) -> usize;

    fn stats(&self) -> TreeStats;

    /// Fails with `DuplicateKey` if an equal key is already stored.
    fn insert(&mut self, key: K) -> Result<()>;

    /// Removes the record equal to `key` and returns it.
    fn delete(&mut self, key: &K) -> Result<K>;

    /// Removes the record equal to `key` and passes it to the destructor.
    fn delete_entry(&mut self, key: &K) -> Result<()>;

    fn min(&self) -> Result<&K>;

    fn max(&self) -> Result<&K>;

    /// Returns the stored record equal to `key`.
    fn search(&self, key: &K) -> Result<&K>;

    fn key_exists(&self, key: &K) -> bool;

    /// Global rebalance for the search tree; the self-balancing backends
    /// only check that the tree is not empty.
    fn balance(&mut self) -> Result<()>;

    /// Copies of every record in ascending order.
    fn to_array(&self) -> Vec<K>;

    /// Cursor positioned per `mode`. B+ trees reject `IterMode::Root`.
    fn cursor<'a>(&'a self, mode: IterMode) -> Result<Box<dyn TreeCursor<'a, K> + 'a>>
    where
        K: 'a;

    /// Tears the tree down without calling the destructor.
    fn destroy(self: Box<Self>);

    /// Tears the tree down, passing every record to the destructor.
    fn destroy_with_entries(self: Box<Self>);
}

/// Builds the backend named by `config.kind`.
pub fn create_tree<K, C>(config: TreeConfig<K, C>) -> Result<Box<dyn OrderedTree<K>>>
where
    K: Clone + Debug + 'static,
    C: KeyComparator<K> + 'static,
{
    config.validate()?;
    log::debug!("create_tree: {:?} fanout {}", config.kind, config.fanout);
    Ok(match config.kind {
        TreeKind::Bst => Box::new(SearchTree::from_config(config)?),
        TreeKind::Avl => Box::new(AvlTree::from_config(config)?),
        TreeKind::RedBlack => Box::new(RbTree::from_config(config)?),
        TreeKind::BPlus => Box::new(BPlusTree::from_config(config)?),
    })
}
