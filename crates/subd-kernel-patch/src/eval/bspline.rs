//! Uniform bicubic B-spline patches.

use subd_kernel_math::{Real, Vec3x};

use super::{splat_grid, tensor_eval, tensor_normal, ControlGrid};

/// A uniform bicubic B-spline patch over its 4×4 control grid.
///
/// Unlike Bezier patches the surface does not pass through the corner
/// control points; the grid is the one-ring of a regular quad face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSplinePatch {
    /// Control points, `[row_v][column_u]`.
    pub points: ControlGrid,
}

#[inline]
fn basis<T: Real>(t: T) -> [T; 4] {
    let one = T::splat(1.0);
    let three = T::splat(3.0);
    let sixth = T::splat(1.0 / 6.0);
    let s = one - t;
    let t2 = t * t;
    let t3 = t2 * t;
    [
        s * s * s * sixth,
        (three * t3 - T::splat(6.0) * t2 + T::splat(4.0)) * sixth,
        (-(three * t3) + three * t2 + three * t + one) * sixth,
        t3 * sixth,
    ]
}

#[inline]
fn basis_derivative<T: Real>(t: T) -> [T; 4] {
    let one = T::splat(1.0);
    let half = T::splat(0.5);
    let three = T::splat(3.0);
    let s = one - t;
    let t2 = t * t;
    [
        -(s * s * half),
        (three * t2 - T::splat(4.0) * t) * half,
        (-(three * t2) + T::splat(2.0) * t + one) * half,
        t2 * half,
    ]
}

impl BSplinePatch {
    /// Create a patch from its control grid.
    pub fn new(points: ControlGrid) -> Self {
        Self { points }
    }

    /// Evaluate the surface position.
    pub fn eval<T: Real>(&self, u: T, v: T) -> Vec3x<T> {
        tensor_eval(&splat_grid(&self.points), &basis(u), &basis(v))
    }

    /// Evaluate the unnormalized surface normal `dP/du × dP/dv`.
    pub fn normal<T: Real>(&self, u: T, v: T) -> Vec3x<T> {
        tensor_normal(
            &splat_grid(&self.points),
            &basis(u),
            &basis(v),
            &basis_derivative(u),
            &basis_derivative(v),
        )
    }
}
