pub mod btree;
mod deletion;
pub mod iter;
mod node;

#[cfg(test)]
mod tests;

pub use self::{btree::BPlusTree, iter::BPlusCursor};
