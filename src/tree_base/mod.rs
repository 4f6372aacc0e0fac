pub mod comparator;
pub mod config;
pub mod error;
pub mod iter;
pub mod node;
pub mod node_id;
pub mod tree_stats;
mod macros;
pub(crate) use macros::impl_ordered_tree;
pub(crate) use macros::impl_binary_common;
