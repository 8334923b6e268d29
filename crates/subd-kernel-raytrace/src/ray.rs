//! Ray representation and ray/box tests.

use subd_kernel_math::{BBox3fa, Vec3f};

/// Closest hit recorded on a [`Ray`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Parameter along the ray.
    pub t: f32,
    /// Patch-local u at the hit.
    pub u: f32,
    /// Patch-local v at the hit.
    pub v: f32,
    /// Unnormalized geometric normal of the hit triangle.
    pub ng: Vec3f,
    /// Geometry id of the hit patch.
    pub geom_id: u32,
    /// Primitive id of the hit patch.
    pub prim_id: u32,
}

/// A ray with a valid parameter interval and a time for motion blur.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Vec3f,
    /// Unit direction of the ray.
    pub direction: Vec3f,
    /// Lower end of the valid interval.
    pub tnear: f32,
    /// Upper end of the valid interval; shrinks as hits are found.
    pub tfar: f32,
    /// Time in `[0, 1]`.
    pub time: f32,
    /// Closest hit found so far.
    pub hit: Option<RayHit>,
    /// Precomputed reciprocal of direction components for fast box tests.
    inv_direction: Vec3f,
    /// Sign of direction components (0 if positive, 1 if negative).
    sign: [usize; 3],
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction will be normalized. The interval is `[0, inf)` at time 0.
    pub fn new(origin: Vec3f, direction: Vec3f) -> Self {
        let dir = direction.normalize();
        let inv = Vec3f::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);
        let sign = [
            if inv.x < 0.0 { 1 } else { 0 },
            if inv.y < 0.0 { 1 } else { 0 },
            if inv.z < 0.0 { 1 } else { 0 },
        ];
        Self {
            origin,
            direction: dir,
            tnear: 0.0,
            tfar: f32::INFINITY,
            time: 0.0,
            hit: None,
            inv_direction: inv,
            sign,
        }
    }

    /// Set the ray time.
    pub fn with_time(mut self, time: f32) -> Self {
        self.time = time;
        self
    }

    /// Set the valid parameter interval.
    pub fn with_range(mut self, tnear: f32, tfar: f32) -> Self {
        self.tnear = tnear;
        self.tfar = tfar;
        self
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3f {
        self.origin + self.direction * t
    }

    /// Test ray-box intersection using the slab method.
    ///
    /// Returns the entry and exit parameters clipped to `[tnear, tfar]`, or
    /// `None` if the clipped interval is empty.
    #[inline]
    pub fn intersect_box(&self, bounds: &BBox3fa) -> Option<(f32, f32)> {
        let b = [bounds.lower_point(), bounds.upper_point()];

        let tx1 = (b[self.sign[0]].x - self.origin.x) * self.inv_direction.x;
        let tx2 = (b[1 - self.sign[0]].x - self.origin.x) * self.inv_direction.x;

        let mut t_min = tx1;
        let mut t_max = tx2;

        let ty1 = (b[self.sign[1]].y - self.origin.y) * self.inv_direction.y;
        let ty2 = (b[1 - self.sign[1]].y - self.origin.y) * self.inv_direction.y;

        t_min = t_min.max(ty1);
        t_max = t_max.min(ty2);

        let tz1 = (b[self.sign[2]].z - self.origin.z) * self.inv_direction.z;
        let tz2 = (b[1 - self.sign[2]].z - self.origin.z) * self.inv_direction.z;

        t_min = t_min.max(tz1).max(self.tnear);
        t_max = t_max.min(tz2).min(self.tfar);

        if t_max >= t_min {
            Some((t_min, t_max))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BBox3fa {
        BBox3fa::new(Vec3f::zeros(), Vec3f::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3f::zeros(), Vec3f::new(2.0, 0.0, 0.0));
        let p = ray.at(5.0);
        assert!((p.x - 5.0).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
        assert!(p.z.abs() < 1e-6);
    }

    #[test]
    fn test_ray_box_hit() {
        let ray = Ray::new(Vec3f::new(-5.0, 0.5, 0.5), Vec3f::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_box(&unit_box()).unwrap();
        assert!((t_min - 5.0).abs() < 1e-5);
        assert!((t_max - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_box_miss() {
        let ray = Ray::new(Vec3f::new(-5.0, 5.0, 5.0), Vec3f::new(1.0, 0.0, 0.0));
        assert!(ray.intersect_box(&unit_box()).is_none());
    }

    #[test]
    fn test_ray_box_behind() {
        let ray = Ray::new(Vec3f::new(-5.0, 0.5, 0.5), Vec3f::new(-1.0, 0.0, 0.0));
        assert!(ray.intersect_box(&unit_box()).is_none());
    }

    #[test]
    fn test_ray_box_respects_tfar() {
        let ray = Ray::new(Vec3f::new(-5.0, 0.5, 0.5), Vec3f::new(1.0, 0.0, 0.0)).with_range(0.0, 4.0);
        assert!(ray.intersect_box(&unit_box()).is_none());
    }

    #[test]
    fn test_ray_box_diagonal() {
        let ray = Ray::new(Vec3f::new(-1.0, -1.0, -1.0), Vec3f::new(1.0, 1.0, 1.0));
        assert!(ray.intersect_box(&unit_box()).is_some());
    }
}
