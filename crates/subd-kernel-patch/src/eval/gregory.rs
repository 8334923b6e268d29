//! Bicubic Gregory patches.

use subd_kernel_math::{Real, Vec3f, Vec3x};

use super::bezier::BezierPatch;
use super::{splat_grid, ControlGrid, LaneGrid};

/// A bicubic Gregory patch.
///
/// The twelve boundary entries of `points` are ordinary Bezier control
/// points. Each inner corner has two candidates: the entry in `points`
/// (`[1][1]`, `[1][2]`, `[2][2]`, `[2][1]`) drives the cross derivative of
/// the adjacent `v = const` edge, and the matching `face` entry drives the
/// adjacent `u = const` edge. They are blended per parameter before the
/// patch is evaluated as a Bezier patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GregoryPatch {
    /// Control points, `[row_v][column_u]`.
    pub points: ControlGrid,
    /// Inner points paired with the `u = const` edges, in corner order
    /// `(0,0)`, `(1,0)`, `(1,1)`, `(0,1)`.
    pub face: [Vec3f; 4],
}

/// Grid slot of each inner corner, in corner order.
const INNER_SLOTS: [(usize, usize); 4] = [(1, 1), (1, 2), (2, 2), (2, 1)];

/// `(a * wa + b * wb) / (wa + wb)`, or the average where both weights vanish.
#[inline]
pub(crate) fn blend2<T: Real>(a: &Vec3x<T>, b: &Vec3x<T>, wa: T, wb: T) -> Vec3x<T> {
    let zero = T::splat(0.0);
    let half = T::splat(0.5);
    let den = wa + wb;
    let blended = a.scale(wa) + b.scale(wb);
    let avg = (*a + *b).scale(half);
    Vec3x::new(
        T::select_eq(den, zero, avg.x, blended.x / den),
        T::select_eq(den, zero, avg.y, blended.y / den),
        T::select_eq(den, zero, avg.z, blended.z / den),
    )
}

impl GregoryPatch {
    /// Create a patch from its control grid and face points.
    pub fn new(points: ControlGrid, face: [Vec3f; 4]) -> Self {
        Self { points, face }
    }

    /// Resolve the inner corners for the given parameters.
    fn resolve<T: Real>(&self, u: T, v: T) -> LaneGrid<T> {
        let one = T::splat(1.0);
        let mut grid = splat_grid(&self.points);
        let weights = [(u, v), (one - u, v), (one - u, one - v), (u, one - v)];
        for (corner, &(row, col)) in INNER_SLOTS.iter().enumerate() {
            let edge_v = Vec3x::splat(&self.points[row][col]);
            let edge_u = Vec3x::splat(&self.face[corner]);
            let (wv, wu) = weights[corner];
            grid[row][col] = blend2(&edge_v, &edge_u, wv, wu);
        }
        grid
    }

    /// Evaluate the surface position.
    pub fn eval<T: Real>(&self, u: T, v: T) -> Vec3x<T> {
        BezierPatch::eval_grid(&self.resolve(u, v), u, v)
    }

    /// Evaluate the unnormalized surface normal.
    ///
    /// The blended inner points are held fixed while differentiating.
    pub fn normal<T: Real>(&self, u: T, v: T) -> Vec3x<T> {
        BezierPatch::normal_grid(&self.resolve(u, v), u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::test_patches::wavy_grid;
    use subd_kernel_math::f32x8;

    fn make_patch() -> GregoryPatch {
        let points = wavy_grid();
        let face = [
            points[1][1] + Vec3f::new(0.1, 0.0, 0.3),
            points[1][2] + Vec3f::new(0.0, -0.1, 0.2),
            points[2][2] + Vec3f::new(-0.1, 0.1, -0.2),
            points[2][1] + Vec3f::new(0.05, 0.0, 0.1),
        ];
        GregoryPatch::new(points, face)
    }

    #[test]
    fn test_equal_candidates_reduce_to_bezier() {
        let points = wavy_grid();
        let face = [points[1][1], points[1][2], points[2][2], points[2][1]];
        let gregory = GregoryPatch::new(points, face);
        let bezier = BezierPatch::new(points);
        let g = gregory.eval(0.3f32, 0.7f32).to_vector();
        let b = bezier.eval(0.3f32, 0.7f32).to_vector();
        assert!((g - b).norm() < 1e-5);
    }

    #[test]
    fn test_corners_are_finite() {
        let patch = make_patch();
        for (u, v) in [(0.0f32, 0.0f32), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let p = patch.eval(u, v).to_vector();
            let n = patch.normal(u, v).to_vector();
            assert!(p.iter().all(|c| c.is_finite()));
            assert!(n.iter().all(|c| c.is_finite()));
        }
        assert_eq!(patch.eval(0.0f32, 0.0f32).to_vector(), patch.points[0][0]);
        assert_eq!(patch.eval(1.0f32, 1.0f32).to_vector(), patch.points[3][3]);
    }

    #[test]
    fn test_boundary_matches_bezier_neighbour() {
        // Along v = 0 only the boundary row contributes
        let patch = make_patch();
        let bezier = BezierPatch::new(patch.points);
        for i in 0..=8 {
            let u = i as f32 / 8.0;
            assert_eq!(
                patch.eval(u, 0.0f32).to_vector(),
                bezier.eval(u, 0.0f32).to_vector()
            );
        }
    }

    #[test]
    fn test_batch_matches_scalar_including_corners() {
        let patch = make_patch();
        let us = [0.0, 1.0, 1.0, 0.0, 0.5, 0.25, 0.8, 0.0];
        let vs = [0.0, 0.0, 1.0, 1.0, 0.5, 0.9, 0.1, 0.5];
        let p = patch.eval(f32x8::from(us), f32x8::from(vs));
        let n = patch.normal(f32x8::from(us), f32x8::from(vs));
        for i in 0..8 {
            assert_eq!(p.lane(i), patch.eval(us[i], vs[i]).to_vector());
            assert_eq!(n.lane(i), patch.normal(us[i], vs[i]).to_vector());
        }
    }
}
