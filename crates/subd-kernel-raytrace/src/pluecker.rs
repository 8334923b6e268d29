//! Batched Pluecker ray/triangle test.
//!
//! Edge tests use the signed volumes `D · (b × c)`, `D · (c × a)` and
//! `D · (a × b)` of the origin-relative vertices. Their sum is the
//! determinant; a lane hits when all three share its sign within a
//! relative epsilon, the determinant is non-zero and the hit distance lies
//! in the ray's interval. Watertight across shared edges: both triangles of
//! an edge evaluate the same edge volume.

use subd_kernel_math::{Real, Vec3f, Vec3x};

use crate::gather::MAX_LANES;
use crate::ray::Ray;

/// Per-lane result of [`intersect_pluecker`].
#[derive(Debug, Clone, Copy)]
pub struct PlueckerHits {
    /// Lanes tested.
    pub lanes: usize,
    /// Lane hit the triangle inside `[tnear, tfar]`.
    pub valid: [bool; MAX_LANES],
    /// Hit distance.
    pub t: [f32; MAX_LANES],
    /// Barycentric weight of the second vertex.
    pub u: [f32; MAX_LANES],
    /// Barycentric weight of the third vertex.
    pub v: [f32; MAX_LANES],
    /// Unnormalized geometric normal `(v1 - v0) × (v2 - v0)`.
    pub ng: [Vec3f; MAX_LANES],
}

impl PlueckerHits {
    /// `true` if any lane hit.
    pub fn any(&self) -> bool {
        self.valid[..self.lanes].iter().any(|&v| v)
    }

    /// Valid lane with the smallest distance.
    pub fn closest(&self) -> Option<usize> {
        (0..self.lanes)
            .filter(|&i| self.valid[i])
            .min_by(|&a, &b| self.t[a].total_cmp(&self.t[b]))
    }
}

/// Intersect one ray with `T::LANES` triangles.
pub fn intersect_pluecker<T: Real>(ray: &Ray, v0: &Vec3x<T>, v1: &Vec3x<T>, v2: &Vec3x<T>) -> PlueckerHits {
    let origin = Vec3x::<T>::splat(&ray.origin);
    let dir = Vec3x::<T>::splat(&ray.direction);

    let a = *v0 - origin;
    let b = *v1 - origin;
    let c = *v2 - origin;

    let wa = dir.dot(&b.cross(&c));
    let wb = dir.dot(&c.cross(&a));
    let wc = dir.dot(&a.cross(&b));
    let sum = wa + wb + wc;

    let ng = (*v1 - *v0).cross(&(*v2 - *v0));
    let den = ng.dot(&dir);
    let num = ng.dot(&a);

    let mut lanes = [[0.0f32; MAX_LANES]; 6];
    for (dst, src) in lanes.iter_mut().zip([wa, wb, wc, sum, den, num]) {
        src.store(&mut dst[..]);
    }
    let [wa, wb, wc, sum, den, num] = lanes;

    let mut hits = PlueckerHits {
        lanes: T::LANES,
        valid: [false; MAX_LANES],
        t: [0.0; MAX_LANES],
        u: [0.0; MAX_LANES],
        v: [0.0; MAX_LANES],
        ng: [Vec3f::zeros(); MAX_LANES],
    };
    for i in 0..T::LANES {
        let eps = f32::EPSILON * sum[i].abs();
        let lo = wa[i].min(wb[i]).min(wc[i]);
        let hi = wa[i].max(wb[i]).max(wc[i]);
        if !(lo >= -eps || hi <= eps) || sum[i] == 0.0 || den[i] == 0.0 {
            continue;
        }
        let t = num[i] / den[i];
        if !(t >= ray.tnear && t <= ray.tfar) {
            continue;
        }
        hits.valid[i] = true;
        hits.t[i] = t;
        hits.u[i] = wb[i] / sum[i];
        hits.v[i] = wc[i] / sum[i];
        hits.ng[i] = ng.lane(i);
    }
    hits
}
