#![warn(missing_docs)]

//! Subdivision patch evaluation and lazy grid tessellation.
//!
//! A [`PatchDescriptor`] describes one finalized subdivision sub-patch: its
//! evaluation basis, quantized parametric domain, per-edge tessellation
//! levels and the per-patch cache slot that holds its tessellated grid.
//!
//! # Architecture
//!
//! - [`descriptor`] - patch record, kind dispatch, edge-level bookkeeping
//! - [`eval`] - closed-form evaluators (Bezier, B-spline, Gregory, triangle)
//! - [`tessellate`] - UV sample grids and crack-free edge stitching
//! - [`grid_range`] - quad-tree partition shared by sizing and building
//! - [`eval_grid`] - batched grid and bounds evaluation
//! - [`cache`] - per-patch lock, cache tag and shared block allocator
//! - [`mesh`] - traits for the mesh owner, displacement and adaptive evaluation
//!
//! # Example
//!
//! ```ignore
//! use subd_kernel_patch::{eval_grid, GridBuffers, PatchDescriptor, SubRect};
//!
//! let patch = PatchDescriptor::new(kind, 0, 7, uv, [4.0; 4], &config);
//! let rect = SubRect::full(patch.grid_u_res, patch.grid_v_res);
//! let mut grid = GridBuffers::new(&rect);
//! eval_grid(&patch, &rect, &mesh, 0, &mut grid);
//! ```

pub mod cache;
pub mod config;
pub mod descriptor;
mod error;
pub mod eval;
pub mod eval_grid;
pub mod grid_range;
pub mod mesh;
pub mod tessellate;

pub use cache::{Block, BLOCK_BYTES, CacheRead, CacheState, CacheStorage, CacheTag, PatchCache, TessellationCache};
pub use config::TessellationConfig;
pub use descriptor::{
    clamp_edge_level, dequantize_uv, quantize_uv, PatchDescriptor, PatchFlags, PatchKind, PatchType, MAX_EDGE_LEVEL,
};
pub use error::{CacheError, Result};
pub use eval::{BSplinePatch, BezierPatch, ControlGrid, GregoryPatch, GregoryTrianglePatch};
pub use eval_grid::{eval_grid, eval_grid_bounds, GridBuffers};
pub use grid_range::{BlockCounter, GridRange, GridRangeVisitor, DEFAULT_LEAF_BLOCKS, NODE_BLOCKS};
pub use mesh::{
    AdaptiveFillOutput, AdaptiveFillRequest, Displacement, DisplacementBatch, FeatureAdaptiveEval,
    HalfEdgeRef, SimpleMesh, SubdivMesh,
};
pub use tessellate::SubRect;
