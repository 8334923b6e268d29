//! Batched grid evaluation.
//!
//! [`eval_grid`] fills dense position and UV planes for a window of a
//! patch's grid; [`eval_grid_bounds`] folds the same positions into a
//! bounding box without storing them. Both go through the same sampling,
//! stitching, evaluation and displacement path, so the bounds always match
//! the dense output.

use subd_kernel_math::{lerp2, BBox3fa, Real, VFloat, Vec3f, Vec3fa, Vec3x, VFLOAT_LANES};

use crate::descriptor::{PatchDescriptor, PatchKind};
use crate::mesh::{AdaptiveFillOutput, AdaptiveFillRequest, DisplacementBatch, SubdivMesh};
use crate::tessellate::{grid_uv_tessellator, pad_tail, stitch_uv_grid, tessellate_uv, SubRect};

/// Dense planar output of [`eval_grid`].
///
/// Every plane holds `rect.padded_len(VFLOAT_LANES)` values; lanes past
/// `rect.samples()` repeat the last valid sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridBuffers {
    /// Position x.
    pub x: Vec<f32>,
    /// Position y.
    pub y: Vec<f32>,
    /// Position z.
    pub z: Vec<f32>,
    /// Fine-grid u.
    pub u: Vec<f32>,
    /// Fine-grid v.
    pub v: Vec<f32>,
}

impl GridBuffers {
    /// Buffers sized for a window.
    pub fn new(rect: &SubRect) -> Self {
        let mut grid = Self::default();
        grid.resize(rect.padded_len(VFLOAT_LANES));
        grid
    }

    /// Number of stored values per plane, padding included.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// `true` if the buffers are empty.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Position of sample `i`.
    pub fn position(&self, i: usize) -> Vec3f {
        Vec3f::new(self.x[i], self.y[i], self.z[i])
    }

    fn resize(&mut self, len: usize) {
        for plane in [&mut self.x, &mut self.y, &mut self.z, &mut self.u, &mut self.v] {
            plane.resize(len, 0.0);
        }
    }
}

/// Evaluate a window of the patch's grid into dense planes.
///
/// `time_step` selects the vertex buffer handed to the feature-adaptive
/// evaluator; closed-form kinds carry their own control points.
pub fn eval_grid<M: SubdivMesh + ?Sized>(
    patch: &PatchDescriptor,
    rect: &SubRect,
    mesh: &M,
    time_step: usize,
    out: &mut GridBuffers,
) {
    debug_assert!(rect.samples() >= 1, "empty sub-rectangle");
    out.resize(rect.padded_len(VFLOAT_LANES));

    if let PatchKind::AdaptiveEval { .. } = patch.kind {
        eval_adaptive(patch, rect, mesh, time_step, out);
        return;
    }

    let n = rect.samples();
    grid_uv_tessellator(rect, &mut out.u, &mut out.v);
    if patch.needs_stitching() {
        stitch_uv_grid(&patch.level, rect, &mut out.u, &mut out.v);
    }
    pad_tail(n, &mut out.u);
    pad_tail(n, &mut out.v);

    let GridBuffers { x, y, z, u, v } = out;
    for_each_batch(patch, mesh, u, v, |offset, p| {
        let end = offset + VFLOAT_LANES;
        Real::store(p.x, &mut x[offset..end]);
        Real::store(p.y, &mut y[offset..end]);
        Real::store(p.z, &mut z[offset..end]);
    });
}

/// Bounding box of the positions [`eval_grid`] would produce.
///
/// The auxiliary lanes of the result are zero.
pub fn eval_grid_bounds<M: SubdivMesh + ?Sized>(
    patch: &PatchDescriptor,
    rect: &SubRect,
    mesh: &M,
    time_step: usize,
) -> BBox3fa {
    debug_assert!(rect.samples() >= 1, "empty sub-rectangle");

    let (lower, upper) = if let PatchKind::AdaptiveEval { .. } = patch.kind {
        let mut grid = GridBuffers::new(rect);
        eval_adaptive(patch, rect, mesh, time_step, &mut grid);
        let mut lower = Vec3x::splat(&Vec3f::repeat(f32::INFINITY));
        let mut upper = Vec3x::splat(&Vec3f::repeat(f32::NEG_INFINITY));
        for offset in (0..grid.len()).step_by(VFLOAT_LANES) {
            let p = Vec3x::new(
                <VFloat as Real>::load(&grid.x[offset..]),
                <VFloat as Real>::load(&grid.y[offset..]),
                <VFloat as Real>::load(&grid.z[offset..]),
            );
            lower = lower.min(&p);
            upper = upper.max(&p);
        }
        (lower, upper)
    } else {
        let stitch = patch.needs_stitching().then_some(&patch.level);
        let (u, v) = tessellate_uv(rect, stitch, VFLOAT_LANES);
        let mut lower = Vec3x::splat(&Vec3f::repeat(f32::INFINITY));
        let mut upper = Vec3x::splat(&Vec3f::repeat(f32::NEG_INFINITY));
        for_each_batch(patch, mesh, &u, &v, |_, p| {
            lower = lower.min(&p);
            upper = upper.max(&p);
        });
        (lower, upper)
    };

    let bounds = BBox3fa {
        lower: Vec3fa::new(
            Real::reduce_min(lower.x),
            Real::reduce_min(lower.y),
            Real::reduce_min(lower.z),
            0.0,
        ),
        upper: Vec3fa::new(
            Real::reduce_max(upper.x),
            Real::reduce_max(upper.y),
            Real::reduce_max(upper.z),
            0.0,
        ),
    };
    debug_assert!(bounds.is_finite(), "non-finite grid bounds");
    debug_assert!(bounds.is_ordered(), "inverted grid bounds");
    bounds
}

/// Evaluate every batch of padded `u`/`v` samples, displacing if the mesh
/// has a displacement, and hand each batch's positions to `emit`.
fn for_each_batch<M, F>(patch: &PatchDescriptor, mesh: &M, u: &[f32], v: &[f32], mut emit: F)
where
    M: SubdivMesh + ?Sized,
    F: FnMut(usize, Vec3x<VFloat>),
{
    debug_assert_eq!(u.len() % VFLOAT_LANES, 0);
    let displacement = mesh.displacement();
    let corners = [patch.get_uv(0), patch.get_uv(1), patch.get_uv(2), patch.get_uv(3)];

    for offset in (0..u.len()).step_by(VFLOAT_LANES) {
        let uu = <VFloat as Real>::load(&u[offset..]);
        let vv = <VFloat as Real>::load(&v[offset..]);
        let mut p = patch.eval(uu, vv);

        if let Some(displacement) = displacement {
            let n = patch.normal(uu, vv).normalize();
            // Displacement sees the coarse-patch parameterization
            let pu = lerp2(corners[0].x, corners[1].x, corners[3].x, corners[2].x, uu, vv);
            let pv = lerp2(corners[0].y, corners[1].y, corners[3].y, corners[2].y, uu, vv);

            let lanes = |a: VFloat| a.to_array();
            let (cu, cv) = (lanes(pu), lanes(pv));
            let (nx, ny, nz) = (lanes(n.x), lanes(n.y), lanes(n.z));
            let (mut x, mut y, mut z) = (lanes(p.x), lanes(p.y), lanes(p.z));
            displacement.displace(
                patch.geom_id,
                patch.prim_id,
                &mut DisplacementBatch {
                    u: &cu,
                    v: &cv,
                    nx: &nx,
                    ny: &ny,
                    nz: &nz,
                    x: &mut x,
                    y: &mut y,
                    z: &mut z,
                },
            );
            p = Vec3x::new(VFloat::from(x), VFloat::from(y), VFloat::from(z));
        }

        emit(offset, p);
    }
}

/// Delegate a feature-adaptive patch to the mesh's evaluator.
fn eval_adaptive<M: SubdivMesh + ?Sized>(
    patch: &PatchDescriptor,
    rect: &SubRect,
    mesh: &M,
    time_step: usize,
    out: &mut GridBuffers,
) {
    let PatchKind::AdaptiveEval { edge, sub_patch } = patch.kind else {
        return;
    };
    let n = rect.samples();

    let Some(evaluator) = mesh.adaptive_evaluator() else {
        log::warn!(
            "patch {}/{} needs feature-adaptive evaluation but none is registered",
            patch.geom_id,
            patch.prim_id
        );
        grid_uv_tessellator(rect, &mut out.u, &mut out.v);
        for plane in [&mut out.x, &mut out.y, &mut out.z] {
            plane.fill(0.0);
        }
        pad_tail(n, &mut out.u);
        pad_tail(n, &mut out.v);
        return;
    };

    let displacement = mesh.displacement();
    let mut normals = displacement.map(|_| [vec![0.0f32; n], vec![0.0f32; n], vec![0.0f32; n]]);

    let request = AdaptiveFillRequest {
        edge,
        sub_patch,
        stitch_levels: patch.needs_stitching().then_some(patch.level),
        vertices: mesh.vertex_buffer(time_step),
        rect: *rect,
    };
    {
        let GridBuffers { x, y, z, u, v } = &mut *out;
        let mut fill = AdaptiveFillOutput {
            x: &mut x[..n],
            y: &mut y[..n],
            z: &mut z[..n],
            u: &mut u[..n],
            v: &mut v[..n],
            normals: normals
                .as_mut()
                .map(|[nx, ny, nz]| [nx.as_mut_slice(), ny.as_mut_slice(), nz.as_mut_slice()]),
        };
        evaluator.fill(&request, &mut fill);
    }

    if let (Some(displacement), Some([nx, ny, nz])) = (displacement, normals.as_ref()) {
        let GridBuffers { x, y, z, u, v } = &mut *out;
        displacement.displace(
            patch.geom_id,
            patch.prim_id,
            &mut DisplacementBatch {
                u: &u[..n],
                v: &v[..n],
                nx,
                ny,
                nz,
                x: &mut x[..n],
                y: &mut y[..n],
                z: &mut z[..n],
            },
        );
    }

    for plane in [&mut out.x, &mut out.y, &mut out.z, &mut out.u, &mut out.v] {
        pad_tail(n, plane);
    }
}
