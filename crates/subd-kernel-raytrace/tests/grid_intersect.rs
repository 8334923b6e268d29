//! End-to-end lazy tessellation and intersection.

use approx::assert_relative_eq;
use subd_kernel_math::{Vec2f, Vec3f};
use subd_kernel_patch::{
    BezierPatch, ControlGrid, PatchDescriptor, PatchKind, SimpleMesh, TessellationCache, TessellationConfig,
};
use subd_kernel_raytrace::{
    GatherWidth, GridSoa, IntersectContext, Ray, RaytraceError, SubdivPatchIntersector1,
};

fn unit_uv() -> [Vec2f; 4] {
    [
        Vec2f::new(0.0, 0.0),
        Vec2f::new(1.0, 0.0),
        Vec2f::new(1.0, 1.0),
        Vec2f::new(0.0, 1.0),
    ]
}

/// Control grid spanning `[0, 3]²` with height `z(i, j)`.
fn grid(z: impl Fn(usize, usize) -> f32) -> ControlGrid {
    let mut g = [[Vec3f::zeros(); 4]; 4];
    for (j, row) in g.iter_mut().enumerate() {
        for (i, p) in row.iter_mut().enumerate() {
            *p = Vec3f::new(i as f32, j as f32, z(i, j));
        }
    }
    g
}

fn patch(g: ControlGrid, levels: [f32; 4]) -> PatchDescriptor {
    PatchDescriptor::new(
        PatchKind::Bezier(BezierPatch::new(g)),
        2,
        17,
        unit_uv(),
        levels,
        &TessellationConfig::default(),
    )
}

fn down(x: f32, y: f32) -> Ray {
    Ray::new(Vec3f::new(x, y, 5.0), Vec3f::new(0.0, 0.0, -1.0))
}

#[test]
fn test_flat_patch_hit() {
    let config = TessellationConfig::default();
    let cache = TessellationCache::from_config(&config);
    let mesh = SimpleMesh::default();
    let patches = [patch(grid(|_, _| 0.0), [8.0; 4])];

    for gather in [GatherWidth::Wide, GatherWidth::Narrow] {
        let context = IntersectContext::new(&cache, &mesh, config).with_gather(gather);
        let mut ray = down(1.5, 0.75);
        let mut lazy = None;
        let found = SubdivPatchIntersector1::intersect(&mut ray, &context, &patches, &mut lazy).unwrap();
        assert!(found, "{:?}", gather);

        let hit = ray.hit.unwrap();
        assert_relative_eq!(hit.t, 5.0, epsilon = 1e-5);
        assert_relative_eq!(ray.tfar, 5.0, epsilon = 1e-5);
        assert_relative_eq!(hit.u, 0.5, epsilon = 1e-3);
        assert_relative_eq!(hit.v, 0.25, epsilon = 1e-3);
        assert!(hit.ng.z > 0.0);
        assert_eq!((hit.geom_id, hit.prim_id), (2, 17));
        assert!(lazy.is_some());
    }
}

#[test]
fn test_miss_leaves_ray_untouched() {
    let config = TessellationConfig::default();
    let cache = TessellationCache::from_config(&config);
    let mesh = SimpleMesh::default();
    let context = IntersectContext::new(&cache, &mesh, config);
    let patches = [patch(grid(|_, _| 0.0), [4.0; 4])];

    let mut ray = down(4.0, 4.0);
    let found = SubdivPatchIntersector1::intersect(&mut ray, &context, &patches, &mut None).unwrap();
    assert!(!found);
    assert!(ray.hit.is_none());
    assert_eq!(ray.tfar, f32::INFINITY);
}

#[test]
fn test_occluded_respects_interval() {
    let config = TessellationConfig::default();
    let cache = TessellationCache::from_config(&config);
    let mesh = SimpleMesh::default();
    let patches = [patch(grid(|_, _| 0.0), [6.0; 4])];

    for gather in [GatherWidth::Wide, GatherWidth::Narrow] {
        let context = IntersectContext::new(&cache, &mesh, config).with_gather(gather);
        let mut ray = down(1.0, 2.0);
        assert!(SubdivPatchIntersector1::occluded(&mut ray, &context, &patches, &mut None).unwrap());
        assert!(ray.hit.is_none());

        let mut short = down(1.0, 2.0).with_range(0.0, 4.0);
        assert!(!SubdivPatchIntersector1::occluded(&mut short, &context, &patches, &mut None).unwrap());
    }
}

#[test]
fn test_closest_of_stacked_hits() {
    // A fold: the patch crosses the same vertical line twice
    let config = TessellationConfig::default();
    let cache = TessellationCache::from_config(&config);
    let mesh = SimpleMesh::default();
    let context = IntersectContext::new(&cache, &mesh, config);
    let g = grid(|i, _| [0.0, 2.0, -2.0, 0.0][i]);
    let patches = [patch(g, [32.0; 4])];

    let mut ray = Ray::new(Vec3f::new(-1.0, 1.4, 0.3), Vec3f::new(1.0, 0.0, 0.0));
    assert!(SubdivPatchIntersector1::intersect(&mut ray, &context, &patches, &mut None).unwrap());
    let first = ray.hit.unwrap().t;

    let mut all = Vec::new();
    let mut probe = ray;
    probe.tfar = f32::INFINITY;
    probe.hit = None;
    while SubdivPatchIntersector1::intersect(&mut probe, &context, &patches, &mut None).unwrap() {
        all.push(probe.hit.unwrap().t);
        let t = probe.tfar;
        probe = Ray::new(ray.origin, ray.direction).with_range(t + 1e-3, f32::INFINITY);
    }
    assert_eq!(all.len(), 2);
    assert_relative_eq!(first, all[0]);
    assert!(all.iter().all(|&t| t >= first));
}

#[test]
fn test_hit_lies_on_surface() {
    let config = TessellationConfig::default();
    let cache = TessellationCache::from_config(&config);
    let mesh = SimpleMesh::default();
    let context = IntersectContext::new(&cache, &mesh, config);
    let g = grid(|i, j| 0.2 * ((i as f32 - 1.5).powi(2) + (j as f32 - 1.5).powi(2)));
    let patches = [patch(g, [32.0; 4])];

    let mut ray = down(1.2, 1.3);
    assert!(SubdivPatchIntersector1::intersect(&mut ray, &context, &patches, &mut None).unwrap());
    let hit = ray.hit.unwrap();
    let surface = patches[0].eval(hit.u, hit.v).to_vector();
    let p = ray.at(hit.t);
    assert!((p - surface).norm() < 5e-3, "{:?} vs {:?}", p, surface);
}

#[test]
fn test_grid_built_once_and_rebuilt_after_eviction() {
    let config = TessellationConfig::default();
    let cache = TessellationCache::from_config(&config);
    let mesh = SimpleMesh::default();
    let context = IntersectContext::new(&cache, &mesh, config);
    let patches = [patch(grid(|_, _| 0.0), [5.0; 4])];

    let mut lazy = None;
    for _ in 0..3 {
        let mut ray = down(0.5, 0.5);
        SubdivPatchIntersector1::intersect(&mut ray, &context, &patches, &mut lazy).unwrap();
    }
    assert_eq!(patches[0].cache().builds(), 1);
    let first = lazy.take().unwrap();

    cache.evict_all();
    let mut ray = down(0.5, 0.5);
    assert!(SubdivPatchIntersector1::intersect(&mut ray, &context, &patches, &mut lazy).unwrap());
    assert_eq!(patches[0].cache().builds(), 2);
    let second = lazy.unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first.storage, &second.storage));
    assert_eq!(first.root, second.root);
}

#[test]
fn test_concurrent_rays_share_one_build() {
    let config = TessellationConfig::default();
    let cache = TessellationCache::from_config(&config);
    let mesh = SimpleMesh::default();
    let context = IntersectContext::new(&cache, &mesh, config);
    let patches = [patch(grid(|_, _| 1.0), [16.0; 4])];

    std::thread::scope(|s| {
        for k in 0..8 {
            let patches = &patches;
            s.spawn(move || {
                let mut ray = down(0.3 + 0.3 * k as f32, 1.1);
                assert!(SubdivPatchIntersector1::intersect(&mut ray, &context, patches, &mut None).unwrap());
                assert_relative_eq!(ray.tfar, 4.0, epsilon = 1e-5);
            });
        }
    });
    assert_eq!(patches[0].cache().builds(), 1);
}

#[test]
fn test_estimate_fits_every_grid() {
    let config = TessellationConfig::default();
    let cache = TessellationCache::from_config(&config);
    let mesh = SimpleMesh::default();
    let context = IntersectContext::new(&cache, &mesh, config);

    for a in [1.0f32, 2.0, 3.0, 4.0, 7.0, 9.0, 15.0] {
        for b in [1.0f32, 2.0, 5.0, 8.0, 13.0] {
            let patches = [patch(grid(|_, _| 0.0), [a, b, a.min(3.0), b])];
            let mut ray = down(2.9, 2.9);
            assert!(
                SubdivPatchIntersector1::intersect(&mut ray, &context, &patches, &mut None).unwrap(),
                "levels {} {}",
                a,
                b
            );
            let storage = patches[0].cache().try_read().unwrap().storage().unwrap().clone();
            let grid = GridSoa::new(&storage);
            assert_eq!(grid.header().tree_blocks, patches[0].sub_tree_size_64b_blocks(config.leaf_blocks));
            assert_eq!(storage.len_blocks(), GridSoa::size_in_blocks(&patches[0], 1, config.leaf_blocks));
        }
    }
}

#[test]
fn test_motion_blur_matches_static_steps() {
    let config = TessellationConfig::default();
    let cache = TessellationCache::from_config(&config);
    let static_mesh = SimpleMesh::default();
    let blur_mesh = SimpleMesh::with_time_steps(vec![Vec::new(), Vec::new()]);

    let low = grid(|i, j| 0.1 * (i + j) as f32);
    let high = grid(|i, j| 1.0 + 0.1 * (i + j) as f32);
    let blurred = [patch(low, [8.0; 4]), patch(high, [8.0; 4])];
    let static_low = [patch(low, [8.0; 4])];
    let static_high = [patch(high, [8.0; 4])];

    for gather in [GatherWidth::Wide, GatherWidth::Narrow] {
        let blur = IntersectContext::new(&cache, &blur_mesh, config).with_gather(gather);
        let fixed = IntersectContext::new(&cache, &static_mesh, config).with_gather(gather);

        // Times outside [0, 1] hold the end steps
        for (time, reference) in [(0.0f32, &static_low), (1.0, &static_high), (-0.5, &static_low), (1.5, &static_high)] {
            let mut moving = down(1.4, 0.7).with_time(time);
            assert!(SubdivPatchIntersector1::intersect(&mut moving, &blur, &blurred, &mut None).unwrap());
            let mut still = down(1.4, 0.7);
            assert!(SubdivPatchIntersector1::intersect(&mut still, &fixed, reference, &mut None).unwrap());
            assert_eq!(moving.hit.unwrap().t, still.hit.unwrap().t, "time {}", time);
        }

        let mut mid = down(1.4, 0.7).with_time(0.5);
        assert!(SubdivPatchIntersector1::intersect(&mut mid, &blur, &blurred, &mut None).unwrap());
        let z = mid.at(mid.tfar).z;
        assert_relative_eq!(z, 0.5 + 0.1 * (1.4 + 0.7), epsilon = 1e-4);
    }
}

#[test]
fn test_missing_time_steps_is_an_error() {
    let config = TessellationConfig::default();
    let cache = TessellationCache::from_config(&config);
    let mesh = SimpleMesh::with_time_steps(vec![Vec::new(), Vec::new()]);
    let context = IntersectContext::new(&cache, &mesh, config);
    let patches = [patch(grid(|_, _| 0.0), [2.0; 4])];

    let err = SubdivPatchIntersector1::intersect(&mut down(1.0, 1.0), &context, &patches, &mut None).unwrap_err();
    assert_eq!(err, RaytraceError::TimeSteps { expected: 2, actual: 1 });
}
