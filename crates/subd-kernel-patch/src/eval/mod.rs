//! Closed-form patch evaluators.
//!
//! Every evaluator is generic over [`Real`], so the scalar and batched forms
//! are the same code and agree lane for lane.

mod bezier;
mod bspline;
mod gregory;
mod gregory_triangle;

pub use bezier::BezierPatch;
pub use bspline::BSplinePatch;
pub use gregory::GregoryPatch;
pub use gregory_triangle::GregoryTrianglePatch;

use subd_kernel_math::{Real, Vec3f, Vec3x};

/// A 4×4 control grid indexed `[row_v][column_u]`.
pub type ControlGrid = [[Vec3f; 4]; 4];

/// A 4×4 grid of batched control points.
pub(crate) type LaneGrid<T> = [[Vec3x<T>; 4]; 4];

/// Broadcast a scalar control grid to every lane.
pub(crate) fn splat_grid<T: Real>(grid: &ControlGrid) -> LaneGrid<T> {
    let mut out = [[Vec3x::zero(); 4]; 4];
    for (dst_row, src_row) in out.iter_mut().zip(grid.iter()) {
        for (dst, src) in dst_row.iter_mut().zip(src_row.iter()) {
            *dst = Vec3x::splat(src);
        }
    }
    out
}

/// Weighted sum `w[0]*p[0] + w[1]*p[1] + w[2]*p[2] + w[3]*p[3]`, summed left to right.
#[inline]
pub(crate) fn combine4<T: Real>(w: &[T; 4], p: &[Vec3x<T>; 4]) -> Vec3x<T> {
    p[0].scale(w[0]) + p[1].scale(w[1]) + p[2].scale(w[2]) + p[3].scale(w[3])
}

/// Evaluate a tensor-product cubic given basis weights in u and v.
///
/// Each row is reduced along u first, then the rows are blended along v.
/// Rows with zero weight contribute exact zeros, so a shared boundary row
/// evaluates identically in both patches that own it.
#[inline]
pub(crate) fn tensor_eval<T: Real>(grid: &LaneGrid<T>, bu: &[T; 4], bv: &[T; 4]) -> Vec3x<T> {
    let rows = [
        combine4(bu, &grid[0]),
        combine4(bu, &grid[1]),
        combine4(bu, &grid[2]),
        combine4(bu, &grid[3]),
    ];
    combine4(bv, &rows)
}

/// Normal `dP/du × dP/dv` from basis weights and their derivatives.
#[inline]
pub(crate) fn tensor_normal<T: Real>(
    grid: &LaneGrid<T>,
    bu: &[T; 4],
    bv: &[T; 4],
    du: &[T; 4],
    dv: &[T; 4],
) -> Vec3x<T> {
    let dpdu = tensor_eval(grid, du, bv);
    let dpdv = tensor_eval(grid, bu, dv);
    dpdu.cross(&dpdv)
}
