//! Per-patch record and evaluator dispatch.

use bitflags::bitflags;
use subd_kernel_math::{Real, Vec2f, Vec3x};

use crate::cache::PatchCache;
use crate::config::TessellationConfig;
use crate::eval::{BSplinePatch, BezierPatch, GregoryPatch, GregoryTrianglePatch};
use crate::grid_range::{BlockCounter, GridRange};
use crate::mesh::HalfEdgeRef;

/// Scale of the 16-bit fixed-point UV encoding.
pub const UV_SCALE: f32 = 65535.0;

/// Largest edge level. Keeps every grid size and offset within `u32`.
pub const MAX_EDGE_LEVEL: f32 = 16383.0;

/// Round an edge level to an integer in `[1, MAX_EDGE_LEVEL]`. NaN maps to 1.
#[inline]
pub fn clamp_edge_level(level: f32) -> f32 {
    level.round().max(1.0).min(MAX_EDGE_LEVEL)
}

/// Quantize a parametric coordinate in `[0, 1]` to 16 bits.
pub fn quantize_uv(x: f32) -> u16 {
    (x * UV_SCALE).round().clamp(0.0, UV_SCALE) as u16
}

/// Decode a 16-bit parametric coordinate.
pub fn dequantize_uv(code: u16) -> f32 {
    code as f32 / UV_SCALE
}

bitflags! {
    /// Per-patch flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PatchFlags: u8 {
        /// Some edge is tessellated coarser than the grid and needs stitching.
        const TRANSITION = 16;
    }
}

/// Type tag of a patch.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchType {
    /// No evaluable data.
    Invalid = 0,
    /// Uniform bicubic B-spline.
    BSpline = 1,
    /// Bicubic Bezier.
    Bezier = 2,
    /// Bicubic Gregory.
    Gregory = 3,
    /// Cubic Gregory triangle.
    GregoryTriangle = 4,
    /// Evaluated by the external feature-adaptive evaluator.
    AdaptiveEval = 5,
}

/// Evaluation data of a patch; exactly one variant is live.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatchKind {
    /// No evaluable data.
    Invalid,
    /// Bicubic Bezier control grid.
    Bezier(BezierPatch),
    /// Uniform B-spline control grid.
    BSpline(BSplinePatch),
    /// Gregory control grid and face points.
    Gregory(GregoryPatch),
    /// Gregory triangle control points.
    GregoryTriangle(GregoryTrianglePatch),
    /// Topology reference for the feature-adaptive evaluator.
    AdaptiveEval {
        /// Half-edge of the source face.
        edge: HalfEdgeRef,
        /// Sub-patch index within the face.
        sub_patch: u32,
    },
}

impl PatchKind {
    /// The type tag of this variant.
    pub fn patch_type(&self) -> PatchType {
        match self {
            PatchKind::Invalid => PatchType::Invalid,
            PatchKind::Bezier(_) => PatchType::Bezier,
            PatchKind::BSpline(_) => PatchType::BSpline,
            PatchKind::Gregory(_) => PatchType::Gregory,
            PatchKind::GregoryTriangle(_) => PatchType::GregoryTriangle,
            PatchKind::AdaptiveEval { .. } => PatchType::AdaptiveEval,
        }
    }

    /// Surface position; zero for kinds without a closed form.
    pub fn eval<T: Real>(&self, u: T, v: T) -> Vec3x<T> {
        match self {
            PatchKind::Bezier(p) => p.eval(u, v),
            PatchKind::BSpline(p) => p.eval(u, v),
            PatchKind::Gregory(p) => p.eval(u, v),
            PatchKind::GregoryTriangle(p) => p.eval(u, v),
            PatchKind::Invalid | PatchKind::AdaptiveEval { .. } => Vec3x::zero(),
        }
    }

    /// Unnormalized surface normal; zero for kinds without a closed form.
    pub fn normal<T: Real>(&self, u: T, v: T) -> Vec3x<T> {
        match self {
            PatchKind::Bezier(p) => p.normal(u, v),
            PatchKind::BSpline(p) => p.normal(u, v),
            PatchKind::Gregory(p) => p.normal(u, v),
            PatchKind::GregoryTriangle(p) => p.normal(u, v),
            PatchKind::Invalid | PatchKind::AdaptiveEval { .. } => Vec3x::zero(),
        }
    }
}

/// One finalized subdivision sub-patch.
///
/// Everything except the edge levels and the cache slot is fixed at
/// construction. Derived fields are recomputed by
/// [`update_edge_levels`](Self::update_edge_levels).
#[derive(Debug)]
pub struct PatchDescriptor {
    /// Evaluation data.
    pub kind: PatchKind,
    /// Patch flags.
    pub flags: PatchFlags,
    /// Quantized u of the four domain corners.
    pub u: [u16; 4],
    /// Quantized v of the four domain corners.
    pub v: [u16; 4],
    /// Integral per-edge tessellation levels in `[1, MAX_EDGE_LEVEL]`.
    pub level: [f32; 4],
    /// Geometry id.
    pub geom_id: u32,
    /// Primitive id.
    pub prim_id: u32,
    /// Grid vertices along u.
    pub grid_u_res: u32,
    /// Grid vertices along v.
    pub grid_v_res: u32,
    /// Grid vertex count in SIMD batches.
    pub grid_size_simd_blocks: u32,
    /// Estimated 64-byte blocks of the grid's quad-tree.
    pub grid_subtree_size_64b_blocks: u32,
    cache: PatchCache,
}

impl PatchDescriptor {
    /// Create a patch.
    ///
    /// `uv` holds the domain corners in order `(0,0)`, `(1,0)`, `(1,1)`,
    /// `(0,1)`; `edge_level` the requested level of edges `v = 0`, `u = 1`,
    /// `v = 1`, `u = 0`.
    pub fn new(
        kind: PatchKind,
        geom_id: u32,
        prim_id: u32,
        uv: [Vec2f; 4],
        edge_level: [f32; 4],
        config: &TessellationConfig,
    ) -> Self {
        let mut patch = Self {
            kind,
            flags: PatchFlags::empty(),
            u: uv.map(|c| quantize_uv(c.x)),
            v: uv.map(|c| quantize_uv(c.y)),
            level: [1.0; 4],
            geom_id,
            prim_id,
            grid_u_res: 2,
            grid_v_res: 2,
            grid_size_simd_blocks: 1,
            grid_subtree_size_64b_blocks: 0,
            cache: PatchCache::new(),
        };
        patch.update_edge_levels(edge_level, config);
        patch
    }

    /// Recompute levels, resolution, transition flag and sizes.
    ///
    /// Drops any cached grid.
    pub fn update_edge_levels(&mut self, edge_level: [f32; 4], config: &TessellationConfig) {
        self.level = edge_level.map(clamp_edge_level);
        let l = self.level.map(|l| l as u32);
        self.grid_u_res = l[0].max(l[2]) + 1;
        self.grid_v_res = l[1].max(l[3]) + 1;

        let transition = l[0] + 1 < self.grid_u_res
            || l[2] + 1 < self.grid_u_res
            || l[1] + 1 < self.grid_v_res
            || l[3] + 1 < self.grid_v_res;
        self.flags.set(PatchFlags::TRANSITION, transition);

        let vertices = self.grid_u_res as usize * self.grid_v_res as usize;
        self.grid_size_simd_blocks = vertices.div_ceil(config.simd_width) as u32;
        self.grid_subtree_size_64b_blocks = self.sub_tree_size_64b_blocks(config.leaf_blocks);
        self.cache.reset();
    }

    /// The type tag.
    pub fn patch_type(&self) -> PatchType {
        self.kind.patch_type()
    }

    /// `true` if boundary samples must be stitched.
    pub fn needs_stitching(&self) -> bool {
        self.flags.contains(PatchFlags::TRANSITION)
    }

    /// Dequantized domain corner `i`.
    pub fn get_uv(&self, i: usize) -> Vec2f {
        Vec2f::new(dequantize_uv(self.u[i]), dequantize_uv(self.v[i]))
    }

    /// Surface position at `(u, v)`, scalar or batched.
    pub fn eval<T: Real>(&self, u: T, v: T) -> Vec3x<T> {
        self.kind.eval(u, v)
    }

    /// Unnormalized surface normal at `(u, v)`, scalar or batched.
    pub fn normal<T: Real>(&self, u: T, v: T) -> Vec3x<T> {
        self.kind.normal(u, v)
    }

    /// Blocks needed by the grid's quad-tree when each leaf costs
    /// `leaf_blocks` blocks. Allocates nothing.
    pub fn sub_tree_size_64b_blocks(&self, leaf_blocks: u32) -> u32 {
        GridRange::full(self.grid_u_res, self.grid_v_res).visit(&mut BlockCounter { leaf_blocks })
    }

    /// The per-patch lock and cache tag.
    pub fn cache(&self) -> &PatchCache {
        &self.cache
    }

    /// Drop any cached grid. Requires exclusive access.
    pub fn reset_cache(&mut self) {
        self.cache.reset();
    }
}
