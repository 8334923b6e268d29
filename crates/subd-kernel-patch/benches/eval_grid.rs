//! Grid evaluation throughput per patch kind and resolution.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use subd_kernel_math::{Vec2f, Vec3f};
use subd_kernel_patch::{
    eval_grid, eval_grid_bounds, BSplinePatch, BezierPatch, ControlGrid, GridBuffers, PatchDescriptor,
    PatchKind, SimpleMesh, SubRect, TessellationConfig,
};

fn control_grid() -> ControlGrid {
    let mut g = [[Vec3f::zeros(); 4]; 4];
    for (j, row) in g.iter_mut().enumerate() {
        for (i, p) in row.iter_mut().enumerate() {
            *p = Vec3f::new(i as f32, j as f32, ((i + 2 * j) as f32 * 0.7).sin());
        }
    }
    g
}

fn make_patch(kind: PatchKind, level: f32) -> PatchDescriptor {
    let uv = [
        Vec2f::new(0.0, 0.0),
        Vec2f::new(1.0, 0.0),
        Vec2f::new(1.0, 1.0),
        Vec2f::new(0.0, 1.0),
    ];
    PatchDescriptor::new(kind, 0, 0, uv, [level; 4], &TessellationConfig::default())
}

fn bench_eval_grid(c: &mut Criterion) {
    let mesh = SimpleMesh::default();
    let mut group = c.benchmark_group("eval_grid");
    for level in [4.0f32, 16.0, 64.0] {
        for (name, kind) in [
            ("bezier", PatchKind::Bezier(BezierPatch::new(control_grid()))),
            ("bspline", PatchKind::BSpline(BSplinePatch::new(control_grid()))),
        ] {
            let patch = make_patch(kind, level);
            let rect = SubRect::full(patch.grid_u_res, patch.grid_v_res);
            let mut grid = GridBuffers::new(&rect);
            group.bench_with_input(BenchmarkId::new(name, level as u32), &rect, |b, rect| {
                b.iter(|| eval_grid(black_box(&patch), rect, &mesh, 0, &mut grid))
            });
        }
    }
    group.finish();
}

fn bench_eval_grid_bounds(c: &mut Criterion) {
    let mesh = SimpleMesh::default();
    let mut group = c.benchmark_group("eval_grid_bounds");
    for level in [4.0f32, 16.0, 64.0] {
        let patch = make_patch(PatchKind::Bezier(BezierPatch::new(control_grid())), level);
        let rect = SubRect::full(patch.grid_u_res, patch.grid_v_res);
        group.bench_with_input(BenchmarkId::from_parameter(level as u32), &rect, |b, rect| {
            b.iter(|| eval_grid_bounds(black_box(&patch), rect, &mesh, 0))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_eval_grid, bench_eval_grid_bounds);
criterion_main!(benches);
