//! Error types for lazy grid intersection.

use subd_kernel_patch::CacheError;
use thiserror::Error;

/// Errors that can occur while preparing a patch grid for intersection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RaytraceError {
    /// The grid could not be reserved in the tessellation cache.
    #[error("tessellation cache: {0}")]
    Cache(#[from] CacheError),

    /// A motion-blurred patch was given fewer descriptors than time steps.
    #[error("expected {expected} time steps, got {actual}")]
    TimeSteps {
        /// Time steps reported by the mesh.
        expected: usize,
        /// Patch descriptors supplied.
        actual: usize,
    },
}

/// Result type for intersection entry points.
pub type Result<T> = std::result::Result<T, RaytraceError>;
