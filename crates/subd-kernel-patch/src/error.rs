//! Error types for the tessellation cache.

use thiserror::Error;

/// Errors that can occur while reserving cache storage for a grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The grid can never fit, even into an empty cache.
    #[error("grid needs {requested} blocks but the cache holds only {capacity}")]
    Oversized {
        /// Blocks requested by the builder.
        requested: usize,
        /// Total capacity of the cache.
        capacity: usize,
    },

    /// A zero-block reservation was requested.
    #[error("cannot reserve an empty grid")]
    EmptyGrid,
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
