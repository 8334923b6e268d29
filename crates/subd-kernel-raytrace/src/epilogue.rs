//! Hit reporting after a batched triangle test.

use crate::gather::{LaneVertices, MapUv};
use crate::pluecker::PlueckerHits;
use crate::ray::{Ray, RayHit};

/// Consumes the lane results of one gather pass.
pub trait Epilogue {
    /// Stop traversal as soon as [`report`](Self::report) returns `true`.
    const TERMINATES: bool;

    /// Record valid lanes on the ray; `true` if any lane was accepted.
    fn report(&mut self, ray: &mut Ray, hits: &PlueckerHits, vertices: &LaneVertices, map_uv: &MapUv<'_>) -> bool;
}

/// Closest-hit reporting: shrinks `tfar` and stores the hit.
#[derive(Debug, Clone, Copy)]
pub struct Intersect1Epilogue {
    /// Geometry id written into hits.
    pub geom_id: u32,
    /// Primitive id written into hits.
    pub prim_id: u32,
}

impl Epilogue for Intersect1Epilogue {
    const TERMINATES: bool = false;

    fn report(&mut self, ray: &mut Ray, hits: &PlueckerHits, vertices: &LaneVertices, map_uv: &MapUv<'_>) -> bool {
        let Some(i) = hits.closest() else {
            return false;
        };
        let t = hits.t[i];
        if t > ray.tfar {
            return false;
        }
        let (u, v) = map_uv.map(&vertices[i], hits.u[i], hits.v[i]);
        ray.tfar = t;
        ray.hit = Some(RayHit {
            t,
            u,
            v,
            ng: hits.ng[i],
            geom_id: self.geom_id,
            prim_id: self.prim_id,
        });
        true
    }
}

/// Any-hit reporting for shadow rays.
#[derive(Debug, Clone, Copy, Default)]
pub struct Occluded1Epilogue;

impl Epilogue for Occluded1Epilogue {
    const TERMINATES: bool = true;

    fn report(&mut self, _ray: &mut Ray, hits: &PlueckerHits, _vertices: &LaneVertices, _map_uv: &MapUv<'_>) -> bool {
        hits.any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gather::MAX_LANES;
    use crate::grid_soa::pack_uv;
    use subd_kernel_math::Vec3f;

    fn hits(valid: [bool; 4], t: [f32; 4]) -> PlueckerHits {
        let mut h = PlueckerHits {
            lanes: 4,
            valid: [false; MAX_LANES],
            t: [0.0; MAX_LANES],
            u: [0.5; MAX_LANES],
            v: [0.0; MAX_LANES],
            ng: [Vec3f::new(0.0, 0.0, 1.0); MAX_LANES],
        };
        h.valid[..4].copy_from_slice(&valid);
        h.t[..4].copy_from_slice(&t);
        h
    }

    #[test]
    fn test_intersect_keeps_closest() {
        let words = [pack_uv(0.0, 0.0), pack_uv(1.0, 0.0), pack_uv(0.0, 1.0)];
        let map = MapUv::new(&words, 0);
        let vertices = [[0, 1, 2]; MAX_LANES];
        let mut ray = Ray::new(Vec3f::zeros(), Vec3f::new(0.0, 0.0, -1.0));
        let mut epilogue = Intersect1Epilogue { geom_id: 3, prim_id: 9 };

        assert!(epilogue.report(&mut ray, &hits([true, true, false, true], [4.0, 2.0, 1.0, 3.0]), &vertices, &map));
        assert_eq!(ray.tfar, 2.0);
        let hit = ray.hit.unwrap();
        assert_eq!((hit.geom_id, hit.prim_id), (3, 9));
        assert_eq!(hit.u, 0.5);

        // A farther batch leaves the hit alone
        assert!(!epilogue.report(&mut ray, &hits([true, false, false, false], [5.0, 0.0, 0.0, 0.0]), &vertices, &map));
        assert_eq!(ray.tfar, 2.0);
    }

    #[test]
    fn test_occluded_any() {
        let words = [0u32; 3];
        let map = MapUv::new(&words, 0);
        let vertices = [[0, 1, 2]; MAX_LANES];
        let mut ray = Ray::new(Vec3f::zeros(), Vec3f::new(0.0, 0.0, -1.0));
        assert!(!Occluded1Epilogue.report(&mut ray, &hits([false; 4], [0.0; 4]), &vertices, &map));
        assert!(Occluded1Epilogue.report(&mut ray, &hits([false, false, true, false], [1.0; 4]), &vertices, &map));
        assert!(ray.hit.is_none());
    }
}
