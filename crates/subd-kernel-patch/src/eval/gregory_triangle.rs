//! Cubic Gregory triangles.

use subd_kernel_math::{Real, Vec3f, Vec3x};

/// A cubic Gregory triangle.
///
/// The boundary is a cubic Bezier triangle: three corners and two inner
/// points per edge. The center control point is a rational blend of three
/// face points, one per edge, so that each edge's cross derivative depends
/// on its own face point only.
///
/// Barycentric coordinates `(a, b, c)` put corner 0 at `a = 1`, corner 1 at
/// `b = 1` and corner 2 at `c = 1`. Edge `i` runs from corner `i` to corner
/// `(i + 1) % 3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GregoryTrianglePatch {
    /// Corner points.
    pub corners: [Vec3f; 3],
    /// Inner edge points, `[near start corner, near end corner]`.
    pub edges: [[Vec3f; 2]; 3],
    /// Face points, indexed by edge.
    pub faces: [Vec3f; 3],
}

/// Batched copies of the triangle's control points.
struct LaneTriangle<T> {
    b300: Vec3x<T>,
    b030: Vec3x<T>,
    b003: Vec3x<T>,
    b210: Vec3x<T>,
    b120: Vec3x<T>,
    b021: Vec3x<T>,
    b012: Vec3x<T>,
    b102: Vec3x<T>,
    b201: Vec3x<T>,
    b111: Vec3x<T>,
}

impl GregoryTrianglePatch {
    /// Create a triangle from its control points.
    pub fn new(corners: [Vec3f; 3], edges: [[Vec3f; 2]; 3], faces: [Vec3f; 3]) -> Self {
        Self {
            corners,
            edges,
            faces,
        }
    }

    /// Map square parameters onto the triangle as `(u * (1 - v), v)`.
    #[inline]
    pub fn square_to_triangle<T: Real>(u: T, v: T) -> (T, T) {
        (u * (T::splat(1.0) - v), v)
    }

    fn lanes<T: Real>(&self, a: T, b: T, c: T) -> LaneTriangle<T> {
        let zero = T::splat(0.0);
        let third = T::splat(1.0 / 3.0);
        let f0 = Vec3x::splat(&self.faces[0]);
        let f1 = Vec3x::splat(&self.faces[1]);
        let f2 = Vec3x::splat(&self.faces[2]);

        // Face i dominates as the barycentric opposite edge i vanishes
        let w0 = a * b;
        let w1 = b * c;
        let w2 = c * a;
        let den = w0 + w1 + w2;
        let blended = f0.scale(w0) + f1.scale(w1) + f2.scale(w2);
        let avg = (f0 + f1 + f2).scale(third);
        let b111 = Vec3x::new(
            T::select_eq(den, zero, avg.x, blended.x / den),
            T::select_eq(den, zero, avg.y, blended.y / den),
            T::select_eq(den, zero, avg.z, blended.z / den),
        );

        LaneTriangle {
            b300: Vec3x::splat(&self.corners[0]),
            b030: Vec3x::splat(&self.corners[1]),
            b003: Vec3x::splat(&self.corners[2]),
            b210: Vec3x::splat(&self.edges[0][0]),
            b120: Vec3x::splat(&self.edges[0][1]),
            b021: Vec3x::splat(&self.edges[1][0]),
            b012: Vec3x::splat(&self.edges[1][1]),
            b102: Vec3x::splat(&self.edges[2][0]),
            b201: Vec3x::splat(&self.edges[2][1]),
            b111,
        }
    }

    /// Evaluate at barycentric `(a, b)`; `c = 1 - a - b`.
    pub fn eval_barycentric<T: Real>(&self, a: T, b: T) -> Vec3x<T> {
        let c = T::splat(1.0) - a - b;
        let p = self.lanes(a, b, c);
        let three = T::splat(3.0);
        let six = T::splat(6.0);
        p.b300.scale(a * a * a)
            + p.b030.scale(b * b * b)
            + p.b003.scale(c * c * c)
            + p.b210.scale(three * a * a * b)
            + p.b120.scale(three * a * b * b)
            + p.b021.scale(three * b * b * c)
            + p.b012.scale(three * b * c * c)
            + p.b102.scale(three * a * c * c)
            + p.b201.scale(three * a * a * c)
            + p.b111.scale(six * a * b * c)
    }

    /// Unnormalized normal at barycentric `(a, b)`.
    ///
    /// The center point is held fixed while differentiating.
    pub fn normal_barycentric<T: Real>(&self, a: T, b: T) -> Vec3x<T> {
        let c = T::splat(1.0) - a - b;
        let p = self.lanes(a, b, c);
        let three = T::splat(3.0);
        let six = T::splat(6.0);

        let da = p.b300.scale(three * a * a)
            + p.b210.scale(six * a * b)
            + p.b120.scale(three * b * b)
            + p.b102.scale(three * c * c)
            + p.b201.scale(six * a * c)
            + p.b111.scale(six * b * c);
        let db = p.b030.scale(three * b * b)
            + p.b210.scale(three * a * a)
            + p.b120.scale(six * a * b)
            + p.b021.scale(six * b * c)
            + p.b012.scale(three * c * c)
            + p.b111.scale(six * a * c);
        let dc = p.b003.scale(three * c * c)
            + p.b021.scale(three * b * b)
            + p.b012.scale(six * b * c)
            + p.b102.scale(six * a * c)
            + p.b201.scale(three * a * a)
            + p.b111.scale(six * a * b);

        let dpda = da - dc;
        let dpdb = db - dc;
        dpda.cross(&dpdb)
    }

    /// Evaluate at square parameters `(u, v)`.
    pub fn eval<T: Real>(&self, u: T, v: T) -> Vec3x<T> {
        let (a, b) = Self::square_to_triangle(u, v);
        self.eval_barycentric(a, b)
    }

    /// Unnormalized normal at square parameters `(u, v)`.
    pub fn normal<T: Real>(&self, u: T, v: T) -> Vec3x<T> {
        let (a, b) = Self::square_to_triangle(u, v);
        self.normal_barycentric(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subd_kernel_math::f32x8;

    /// A flat triangle in the z = 0 plane with exact linear control points.
    fn flat_triangle() -> GregoryTrianglePatch {
        let c0 = Vec3f::new(3.0, 0.0, 0.0);
        let c1 = Vec3f::new(0.0, 3.0, 0.0);
        let c2 = Vec3f::new(0.0, 0.0, 0.0);
        let at = |a: f32, b: f32| c0 * a + c1 * b + c2 * (1.0 - a - b);
        GregoryTrianglePatch::new(
            [c0, c1, c2],
            [
                [at(2.0 / 3.0, 1.0 / 3.0), at(1.0 / 3.0, 2.0 / 3.0)],
                [at(0.0, 2.0 / 3.0), at(0.0, 1.0 / 3.0)],
                [at(1.0 / 3.0, 0.0), at(2.0 / 3.0, 0.0)],
            ],
            [at(1.0 / 3.0, 1.0 / 3.0); 3],
        )
    }

    fn bumpy_triangle() -> GregoryTrianglePatch {
        let mut t = flat_triangle();
        t.faces[0].z = 1.0;
        t.faces[1].z = -0.5;
        t.faces[2].z = 0.25;
        t.edges[1][0].z = 0.3;
        t
    }

    #[test]
    fn test_corners_interpolated() {
        let t = bumpy_triangle();
        assert!((t.eval_barycentric(1.0f32, 0.0f32).to_vector() - t.corners[0]).norm() < 1e-6);
        assert!((t.eval_barycentric(0.0f32, 1.0f32).to_vector() - t.corners[1]).norm() < 1e-6);
        assert!((t.eval_barycentric(0.0f32, 0.0f32).to_vector() - t.corners[2]).norm() < 1e-6);
    }

    #[test]
    fn test_linear_precision() {
        let t = flat_triangle();
        let p = t.eval_barycentric(0.2f32, 0.5f32).to_vector();
        assert!((p - Vec3f::new(0.6, 1.5, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_flat_normal_is_vertical() {
        let t = flat_triangle();
        let n = t.normal_barycentric(0.3f32, 0.3f32).to_vector();
        assert!(n.x.abs() < 1e-4 && n.y.abs() < 1e-4);
        assert!(n.z.abs() > 1.0);
    }

    #[test]
    fn test_square_mapping_stays_inside() {
        for i in 0..=4 {
            for j in 0..=4 {
                let (a, b) = GregoryTrianglePatch::square_to_triangle(i as f32 / 4.0, j as f32 / 4.0);
                assert!(a >= 0.0 && b >= 0.0 && a + b <= 1.0 + 1e-6);
            }
        }
    }

    #[test]
    fn test_batch_matches_scalar() {
        let t = bumpy_triangle();
        let us = [0.0, 1.0, 0.0, 1.0, 0.5, 0.2, 0.9, 0.33];
        let vs = [0.0, 0.0, 1.0, 1.0, 0.5, 0.7, 0.05, 0.33];
        let p = t.eval(f32x8::from(us), f32x8::from(vs));
        let n = t.normal(f32x8::from(us), f32x8::from(vs));
        for i in 0..8 {
            assert_eq!(p.lane(i), t.eval(us[i], vs[i]).to_vector());
            assert_eq!(n.lane(i), t.normal(us[i], vs[i]).to_vector());
        }
    }
}
