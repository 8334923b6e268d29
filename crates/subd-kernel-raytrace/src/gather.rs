//! Triangle gathering from grid leaves.
//!
//! Each grid quad `(x, y)` splits into two triangles:
//!
//! - tri0: `p00, p10, p01`
//! - tri1: `p11, p01, p10`
//!
//! A leaf holds up to 2×2 quads. [`Gather3x3`] loads all eight triangles in
//! one `f32x8` pass; [`Gather2x3`] loads one quad row (four triangles) per
//! `f32x4` pass. Vertex indices are clamped to the leaf, so a missing row or
//! column produces degenerate triangles that never report a hit.

use serde::{Deserialize, Serialize};
use subd_kernel_math::{f32x4, f32x8, Real, Vec3x};

use crate::grid_soa::{unpack_uv, GridLeaf};

/// Maximum lanes any gather produces.
pub const MAX_LANES: usize = 8;

/// Leaf-relative vertex offsets of one triangle per lane.
pub type LaneVertices = [[usize; 3]; MAX_LANES];

/// Which gather variant intersects a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatherWidth {
    /// Whole leaf per pass, 8 lanes.
    Wide,
    /// One quad row per pass, 4 lanes.
    Narrow,
}

impl Default for GatherWidth {
    fn default() -> Self {
        if cfg!(target_feature = "avx") {
            GatherWidth::Wide
        } else {
            GatherWidth::Narrow
        }
    }
}

/// A way of loading leaf triangles into lanes.
pub trait GridGather {
    /// Batch type of one pass.
    type Lanes: Real;

    /// Passes needed to cover a leaf.
    const PASSES: u32;

    /// Vertex offsets, relative to the leaf's first vertex, of the
    /// triangles tested in `pass`.
    fn triangle_vertices(leaf: &GridLeaf, pass: u32, width: usize) -> LaneVertices;
}

/// Offset of vertex `(x, y)` of a leaf, clamped to the leaf.
fn vertex_offset(leaf: &GridLeaf, x: u32, y: u32, width: usize) -> usize {
    x.min(leaf.nu - 1) as usize + y.min(leaf.nv - 1) as usize * width
}

/// Corner offsets `[p00, p10, p01, p11]` of quad `(qx, qy)`.
fn quad_corners(leaf: &GridLeaf, qx: u32, qy: u32, width: usize) -> [usize; 4] {
    [
        vertex_offset(leaf, qx, qy, width),
        vertex_offset(leaf, qx + 1, qy, width),
        vertex_offset(leaf, qx, qy + 1, width),
        vertex_offset(leaf, qx + 1, qy + 1, width),
    ]
}

/// Eight triangles per pass: lanes 0-3 are tri0 of quads
/// `(0,0) (1,0) (0,1) (1,1)`, lanes 4-7 their tri1.
#[derive(Debug, Clone, Copy)]
pub struct Gather3x3;

impl GridGather for Gather3x3 {
    type Lanes = f32x8;
    const PASSES: u32 = 1;

    fn triangle_vertices(leaf: &GridLeaf, _pass: u32, width: usize) -> LaneVertices {
        let mut out = [[0; 3]; MAX_LANES];
        for (q, (qx, qy)) in [(0, 0), (1, 0), (0, 1), (1, 1)].into_iter().enumerate() {
            let [p00, p10, p01, p11] = quad_corners(leaf, qx, qy, width);
            out[q] = [p00, p10, p01];
            out[q + 4] = [p11, p01, p10];
        }
        out
    }
}

/// Four triangles per pass, one quad row each: lanes 0-1 are tri0 of
/// quads `(0,row) (1,row)`, lanes 2-3 their tri1.
#[derive(Debug, Clone, Copy)]
pub struct Gather2x3;

impl GridGather for Gather2x3 {
    type Lanes = f32x4;
    const PASSES: u32 = 2;

    fn triangle_vertices(leaf: &GridLeaf, pass: u32, width: usize) -> LaneVertices {
        let mut out = [[0; 3]; MAX_LANES];
        for qx in 0..2 {
            let [p00, p10, p01, p11] = quad_corners(leaf, qx, pass, width);
            out[qx as usize] = [p00, p10, p01];
            out[qx as usize + 2] = [p11, p01, p10];
        }
        out
    }
}

/// Load the three triangle corners of every lane from the position planes.
///
/// `base` is the float offset of the leaf's first vertex in the x plane;
/// y and z follow `dim_offset` floats apart.
pub fn gather_triangles<T: Real>(
    floats: &[f32],
    base: usize,
    dim_offset: usize,
    vertices: &LaneVertices,
) -> [Vec3x<T>; 3] {
    let mut lanes = [[[0.0f32; MAX_LANES]; 3]; 3];
    for (lane, tri) in vertices.iter().take(T::LANES).enumerate() {
        for (corner, &offset) in tri.iter().enumerate() {
            let i = base + offset;
            lanes[corner][0][lane] = floats[i];
            lanes[corner][1][lane] = floats[i + dim_offset];
            lanes[corner][2][lane] = floats[i + 2 * dim_offset];
        }
    }
    lanes.map(|[x, y, z]| Vec3x::new(T::load(&x), T::load(&y), T::load(&z)))
}

/// Like [`gather_triangles`], blended between two time steps.
///
/// `next` is the float distance from one time step's planes to the next.
pub fn gather_triangles_lerp<T: Real>(
    floats: &[f32],
    base: usize,
    dim_offset: usize,
    next: usize,
    vertices: &LaneVertices,
    t: f32,
) -> [Vec3x<T>; 3] {
    let a = gather_triangles::<T>(floats, base, dim_offset, vertices);
    let b = gather_triangles::<T>(floats, base + next, dim_offset, vertices);
    let t = T::splat(t);
    [
        Vec3x::lerp(&a[0], &b[0], t),
        Vec3x::lerp(&a[1], &b[1], t),
        Vec3x::lerp(&a[2], &b[2], t),
    ]
}

/// Maps triangle barycentrics to patch-local uv through the packed uv plane.
#[derive(Debug, Clone, Copy)]
pub struct MapUv<'a> {
    words: &'a [u32],
    base: usize,
}

impl<'a> MapUv<'a> {
    /// `base` is the word offset of the leaf's first vertex in the uv plane.
    pub fn new(words: &'a [u32], base: usize) -> Self {
        Self { words, base }
    }

    /// Interpolate uv at barycentrics `(bu, bv)` of a triangle.
    pub fn map(&self, triangle: &[usize; 3], bu: f32, bv: f32) -> (f32, f32) {
        let [(u0, v0), (u1, v1), (u2, v2)] = triangle.map(|o| unpack_uv(self.words[self.base + o]));
        let w0 = 1.0 - bu - bv;
        (w0 * u0 + bu * u1 + bv * u2, w0 * v0 + bu * v1 + bv * v2)
    }
}
