//! Error type shared by every tree backend.

use thiserror::Error;

/// Result type alias using TreeError.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors returned by tree operations. A failed operation never mutates the
/// tree it was called on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Duplicate key")]
    DuplicateKey,

    #[error("Key not found")]
    KeyNotFound,

    #[error("Tree is empty")]
    EmptyTree,
}
