//! Tessellation configuration.

use serde::{Deserialize, Serialize};
use subd_kernel_math::VFLOAT_LANES;

use crate::grid_range::DEFAULT_LEAF_BLOCKS;

/// Parameters shared by patch construction and the tessellation cache.
///
/// Missing fields take their [`Default`] values when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationConfig {
    /// Batch width used to size padded sample arrays.
    pub simd_width: usize,
    /// Blocks charged per quad-tree leaf by the size estimator.
    pub leaf_blocks: u32,
    /// Total number of 64-byte blocks the shared cache may hand out
    /// before it evicts everything.
    pub cache_capacity_blocks: usize,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            simd_width: VFLOAT_LANES,
            leaf_blocks: DEFAULT_LEAF_BLOCKS,
            // 64 MiB
            cache_capacity_blocks: 1 << 20,
        }
    }
}

impl TessellationConfig {
    /// Set the batch width.
    pub fn with_simd_width(mut self, simd_width: usize) -> Self {
        debug_assert!(simd_width > 0);
        self.simd_width = simd_width;
        self
    }

    /// Set the per-leaf block charge. A leaf record needs at least
    /// [`DEFAULT_LEAF_BLOCKS`] blocks.
    pub fn with_leaf_blocks(mut self, leaf_blocks: u32) -> Self {
        debug_assert!(leaf_blocks >= DEFAULT_LEAF_BLOCKS);
        self.leaf_blocks = leaf_blocks;
        self
    }

    /// Set the cache capacity in blocks.
    pub fn with_cache_capacity_blocks(mut self, blocks: usize) -> Self {
        self.cache_capacity_blocks = blocks;
        self
    }
}
