/// Forwards `OrderedTree` to a backend's inherent methods of the same names.
macro_rules! impl_ordered_tree {
    ($tree:ident, $kind:expr) => {
        impl<K, C> $crate::ordered_map::OrderedTree<K> for $tree<K, C>
        where
            K: Clone + std::fmt::Debug,
            C: $crate::tree_base::comparator::KeyComparator<K>,
        {
            fn kind(&self) -> $crate::tree_base::config::TreeKind {
                $kind
            }

            fn len(&self) -> usize {
                $tree::len(self)
            }

            fn height(&self) -> usize {
                $tree::height(self)
            }

            fn stats(&self) -> $crate::tree_base::tree_stats::TreeStats {
                $tree::stats(self)
            }

            fn insert(&mut self, key: K) -> $crate::tree_base::error::Result<()> {
                $tree::insert(self, key)
            }

            fn delete(&mut self, key: &K) -> $crate::tree_base::error::Result<K> {
                $tree::delete(self, key)
            }

            fn delete_entry(&mut self, key: &K) -> $crate::tree_base::error::Result<()> {
                $tree::delete_entry(self, key)
            }

            fn min(&self) -> $crate::tree_base::error::Result<&K> {
                $tree::min(self)
            }

            fn max(&self) -> $crate::tree_base::error::Result<&K> {
                $tree::max(self)
            }

            fn search(&self, key: &K) -> $crate::tree_base::error::Result<&K> {
                $tree::search(self, key)
            }

            fn key_exists(&self, key: &K) -> bool {
                $tree::key_exists(self, key)
            }

            fn balance(&mut self) -> $crate::tree_base::error::Result<()> {
                $tree::balance(self)
            }

            fn to_array(&self) -> Vec<K> {
                $tree::to_array(self)
            }

            fn cursor<'a>(
                &'a self,
                mode: $crate::tree_base::iter::IterMode,
            ) -> $crate::tree_base::error::Result<
                Box<dyn $crate::tree_base::iter::TreeCursor<'a, K> + 'a>,
            >
            where
                K: 'a,
            {
                Ok(Box::new($tree::cursor(self, mode)?))
            }

            fn destroy(self: Box<Self>) {
                log::debug!("{}::destroy with {} entries", stringify!($tree), $tree::len(&*self));
            }

            fn destroy_with_entries(mut self: Box<Self>) {
                $tree::clear_with_entries(&mut *self);
            }
        }
    };
}

pub(crate) use impl_ordered_tree;

/// Constructors, queries and teardown shared by the binary backends. The
/// backend struct must have `tree: BinaryTree<K, $tag>`, `key_cmp: C` and
/// `destructor: Option<Destructor<K>>` fields and a `delete` method.
macro_rules! impl_binary_common {
    ($tree:ident, $tag:ty, $kind:expr) => {
        impl<K: Ord> $tree<K> {
            pub fn new() -> Self {
                Self::with_comparator($crate::tree_base::comparator::DefaultKeyComparator::new())
            }
        }

        impl<K: Ord> Default for $tree<K> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<K, C: $crate::tree_base::comparator::KeyComparator<K>> $tree<K, C> {
            pub fn with_comparator(key_cmp: C) -> Self {
                Self {
                    tree: $crate::tree_base::node::BinaryTree::new(),
                    key_cmp,
                    destructor: None,
                }
            }

            pub fn from_config(
                config: $crate::tree_base::config::TreeConfig<K, C>,
            ) -> $crate::tree_base::error::Result<Self> {
                let config = $crate::tree_base::config::TreeConfig {
                    kind: $kind,
                    ..config
                };
                config.validate()?;
                Ok(Self {
                    tree: $crate::tree_base::node::BinaryTree::new(),
                    key_cmp: config.comparator,
                    destructor: config.destructor,
                })
            }

            pub fn key_comp(&self) -> &C {
                &self.key_cmp
            }

            pub fn len(&self) -> usize {
                self.tree.len()
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            pub fn height(&self) -> usize {
                self.tree.height()
            }

            pub fn stats(&self) -> $crate::tree_base::tree_stats::TreeStats {
                self.tree.stats()
            }

            pub fn min(&self) -> $crate::tree_base::error::Result<&K> {
                self.tree
                    .first()
                    .map(|id| self.tree.key(id))
                    .ok_or($crate::tree_base::error::TreeError::EmptyTree)
            }

            pub fn max(&self) -> $crate::tree_base::error::Result<&K> {
                self.tree
                    .last()
                    .map(|id| self.tree.key(id))
                    .ok_or($crate::tree_base::error::TreeError::EmptyTree)
            }

            /// Returns the stored record comparing equal to `key`.
            pub fn search(&self, key: &K) -> $crate::tree_base::error::Result<&K> {
                self.tree
                    .find(&self.key_cmp, key)
                    .map(|id| self.tree.key(id))
                    .ok_or($crate::tree_base::error::TreeError::KeyNotFound)
            }

            pub fn key_exists(&self, key: &K) -> bool {
                self.tree.find(&self.key_cmp, key).is_some()
            }

            pub fn cursor(
                &self,
                mode: $crate::tree_base::iter::IterMode,
            ) -> $crate::tree_base::error::Result<$crate::tree_base::node::BinCursor<'_, K, $tag>>
            {
                Ok(self.tree.cursor(mode))
            }

            pub fn iter(
                &self,
            ) -> $crate::tree_base::iter::Iter<'_, K, $crate::tree_base::node::BinCursor<'_, K, $tag>>
            {
                $crate::tree_base::iter::Iter::new(
                    self.tree.cursor($crate::tree_base::iter::IterMode::Begin),
                    self.tree.cursor($crate::tree_base::iter::IterMode::End),
                    self.len(),
                )
            }

            pub fn to_array(&self) -> Vec<K>
            where
                K: Clone,
            {
                self.tree.to_vec()
            }

            /// Drops every record without calling the destructor.
            pub fn clear(&mut self) {
                self.tree.clear();
            }

            /// Empties the tree, handing each record to the destructor.
            pub fn clear_with_entries(&mut self) {
                let keys = self.tree.drain_keys();
                if let Some(destructor) = self.destructor.as_mut() {
                    keys.into_iter().for_each(destructor);
                }
            }
        }

        impl<K: std::fmt::Debug, C: $crate::tree_base::comparator::KeyComparator<K>> $tree<K, C> {
            /// Removes `key` and passes the record to the destructor.
            pub fn delete_entry(&mut self, key: &K) -> $crate::tree_base::error::Result<()> {
                let record = self.delete(key)?;
                if let Some(destructor) = self.destructor.as_mut() {
                    destructor(record);
                }
                Ok(())
            }
        }

        impl<'a, K, C: $crate::tree_base::comparator::KeyComparator<K>> IntoIterator
            for &'a $tree<K, C>
        {
            type Item = &'a K;
            type IntoIter =
                $crate::tree_base::iter::Iter<'a, K, $crate::tree_base::node::BinCursor<'a, K, $tag>>;

            fn into_iter(self) -> Self::IntoIter {
                self.iter()
            }
        }

        impl<K: std::fmt::Debug, C> std::fmt::Debug for $tree<K, C> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Debug::fmt(&self.tree, f)
            }
        }
    };
}

pub(crate) use impl_binary_common;
