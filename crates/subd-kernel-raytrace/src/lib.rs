#![warn(missing_docs)]

//! Ray intersection for lazily tessellated subdivision patches.
//!
//! A patch is tessellated into a structure-of-arrays vertex grid the first
//! time a ray reaches it. The grid is cached on the patch and shared by
//! every later ray until the tessellation cache evicts it.
//!
//! # Architecture
//!
//! - [`Ray`] - ray with a valid interval, a time and the closest hit
//! - [`grid_soa`] - grid storage layout, quad-tree builder and traversal
//! - [`gather`] - loading leaf triangles into SIMD lanes
//! - [`pluecker`] - batched watertight ray/triangle test
//! - [`epilogue`] - closest-hit and any-hit reporting
//! - [`intersector`] - static, motion-blurred and lazy patch intersectors
//!
//! # Example
//!
//! ```ignore
//! use subd_kernel_patch::{SimpleMesh, TessellationCache, TessellationConfig};
//! use subd_kernel_raytrace::{IntersectContext, Ray, SubdivPatchIntersector1};
//!
//! let config = TessellationConfig::default();
//! let cache = TessellationCache::from_config(&config);
//! let context = IntersectContext::new(&cache, &mesh, config);
//!
//! let mut ray = Ray::new(origin, direction);
//! let mut lazy = None;
//! SubdivPatchIntersector1::intersect(&mut ray, &context, &[patch], &mut lazy)?;
//! ```

mod error;
mod ray;

pub mod epilogue;
pub mod gather;
pub mod grid_soa;
pub mod intersector;
pub mod pluecker;

pub use error::{RaytraceError, Result};
pub use gather::GatherWidth;
pub use grid_soa::{GridHeader, GridLayout, GridLeaf, GridNode, GridSoa, NodeRef};
pub use intersector::{
    time_segment, GridSoaIntersector1, GridSoaMBlurIntersector1, IntersectContext, LazyNode, Precalculations,
    SubdivPatchIntersector1,
};
pub use ray::{Ray, RayHit};
