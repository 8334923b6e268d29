//! Bicubic Bezier patches.

use subd_kernel_math::{Real, Vec3x};

use super::{splat_grid, tensor_eval, tensor_normal, ControlGrid, LaneGrid};

/// A bicubic Bezier patch over its 4×4 control grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierPatch {
    /// Control points, `[row_v][column_u]`.
    pub points: ControlGrid,
}

/// Cubic Bernstein basis at `t`.
#[inline]
pub(crate) fn bernstein<T: Real>(t: T) -> [T; 4] {
    let s = T::splat(1.0) - t;
    let three = T::splat(3.0);
    [s * s * s, three * s * s * t, three * s * t * t, t * t * t]
}

/// Derivative of the cubic Bernstein basis at `t`.
#[inline]
pub(crate) fn bernstein_derivative<T: Real>(t: T) -> [T; 4] {
    let s = T::splat(1.0) - t;
    let three = T::splat(3.0);
    let two = T::splat(2.0);
    [
        -(three * s * s),
        three * (s * s - two * s * t),
        three * (two * s * t - t * t),
        three * t * t,
    ]
}

impl BezierPatch {
    /// Create a patch from its control grid.
    pub fn new(points: ControlGrid) -> Self {
        Self { points }
    }

    /// Evaluate the surface position.
    pub fn eval<T: Real>(&self, u: T, v: T) -> Vec3x<T> {
        Self::eval_grid(&splat_grid(&self.points), u, v)
    }

    /// Evaluate the unnormalized surface normal `dP/du × dP/dv`.
    pub fn normal<T: Real>(&self, u: T, v: T) -> Vec3x<T> {
        Self::normal_grid(&splat_grid(&self.points), u, v)
    }

    /// Evaluate a batched control grid; lanes may hold different points.
    pub(crate) fn eval_grid<T: Real>(grid: &LaneGrid<T>, u: T, v: T) -> Vec3x<T> {
        tensor_eval(grid, &bernstein(u), &bernstein(v))
    }

    pub(crate) fn normal_grid<T: Real>(grid: &LaneGrid<T>, u: T, v: T) -> Vec3x<T> {
        tensor_normal(
            grid,
            &bernstein(u),
            &bernstein(v),
            &bernstein_derivative(u),
            &bernstein_derivative(v),
        )
    }
}
