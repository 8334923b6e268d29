//! Collaborator traits implemented by the mesh owner.
//!
//! The patch crate never owns topology or vertex data. It reads vertices,
//! calls the displacement and delegates feature-adaptive patches through the
//! traits in this module.

use std::fmt;

use subd_kernel_math::Vec3f;

use crate::tessellate::SubRect;

/// Reference to a half-edge in the mesh owner's topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HalfEdgeRef(pub u32);

/// In/out buffers handed to a [`Displacement`].
///
/// Parametric coordinates and unit normals are read-only. Positions are
/// displaced in place. All slices have the same length.
#[derive(Debug)]
pub struct DisplacementBatch<'a> {
    /// Coarse-patch u coordinates.
    pub u: &'a [f32],
    /// Coarse-patch v coordinates.
    pub v: &'a [f32],
    /// Normal x components.
    pub nx: &'a [f32],
    /// Normal y components.
    pub ny: &'a [f32],
    /// Normal z components.
    pub nz: &'a [f32],
    /// Position x components.
    pub x: &'a mut [f32],
    /// Position y components.
    pub y: &'a mut [f32],
    /// Position z components.
    pub z: &'a mut [f32],
}

impl DisplacementBatch<'_> {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// `true` if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// User displacement applied to tessellated positions.
pub trait Displacement: Send + Sync {
    /// Displace the positions in `batch`.
    fn displace(&self, geom_id: u32, prim_id: u32, batch: &mut DisplacementBatch<'_>);
}

impl<F> Displacement for F
where
    F: Fn(u32, u32, &mut DisplacementBatch<'_>) + Send + Sync,
{
    fn displace(&self, geom_id: u32, prim_id: u32, batch: &mut DisplacementBatch<'_>) {
        self(geom_id, prim_id, batch)
    }
}

/// Input to [`FeatureAdaptiveEval::fill`].
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveFillRequest<'a> {
    /// Half-edge of the face the patch was subdivided from.
    pub edge: HalfEdgeRef,
    /// Sub-patch index within that face.
    pub sub_patch: u32,
    /// Edge levels to stitch against, for transition patches.
    pub stitch_levels: Option<[f32; 4]>,
    /// Control vertices for the requested time step.
    pub vertices: &'a [Vec3f],
    /// Sub-rectangle to fill.
    pub rect: SubRect,
}

/// Output of [`FeatureAdaptiveEval::fill`], `rect.samples()` values per plane.
#[derive(Debug)]
pub struct AdaptiveFillOutput<'a> {
    /// Position x components.
    pub x: &'a mut [f32],
    /// Position y components.
    pub y: &'a mut [f32],
    /// Position z components.
    pub z: &'a mut [f32],
    /// Fine-grid u coordinates.
    pub u: &'a mut [f32],
    /// Fine-grid v coordinates.
    pub v: &'a mut [f32],
    /// Unnormalized geometric normals, requested only when displacing.
    pub normals: Option<[&'a mut [f32]; 3]>,
}

/// External evaluator for patches that have no closed form.
pub trait FeatureAdaptiveEval: Send + Sync {
    /// Fill positions and UVs for a sub-rectangle of a patch.
    fn fill(&self, request: &AdaptiveFillRequest<'_>, out: &mut AdaptiveFillOutput<'_>);
}

/// Mesh data consumed during tessellation.
pub trait SubdivMesh: Send + Sync {
    /// Control vertices for a time step.
    fn vertex_buffer(&self, time_step: usize) -> &[Vec3f];

    /// Number of time steps (1 without motion blur).
    fn time_steps(&self) -> usize {
        1
    }

    /// Registered displacement, if any.
    fn displacement(&self) -> Option<&dyn Displacement> {
        None
    }

    /// Registered feature-adaptive evaluator, if any.
    fn adaptive_evaluator(&self) -> Option<&dyn FeatureAdaptiveEval> {
        None
    }
}

/// A plain in-memory [`SubdivMesh`].
#[derive(Default)]
pub struct SimpleMesh {
    /// Vertex buffers, one per time step.
    pub vertices: Vec<Vec<Vec3f>>,
    /// Optional displacement.
    pub displacement: Option<Box<dyn Displacement>>,
    /// Optional feature-adaptive evaluator.
    pub adaptive: Option<Box<dyn FeatureAdaptiveEval>>,
}

impl SimpleMesh {
    /// Create a mesh with a single time step.
    pub fn new(vertices: Vec<Vec3f>) -> Self {
        Self::with_time_steps(vec![vertices])
    }

    /// Create a mesh with one vertex buffer per time step.
    pub fn with_time_steps(vertices: Vec<Vec<Vec3f>>) -> Self {
        Self {
            vertices,
            displacement: None,
            adaptive: None,
        }
    }

    /// Register a displacement.
    pub fn with_displacement(mut self, displacement: impl Displacement + 'static) -> Self {
        self.displacement = Some(Box::new(displacement));
        self
    }

    /// Register a feature-adaptive evaluator.
    pub fn with_adaptive_evaluator(mut self, eval: impl FeatureAdaptiveEval + 'static) -> Self {
        self.adaptive = Some(Box::new(eval));
        self
    }
}

impl SubdivMesh for SimpleMesh {
    fn vertex_buffer(&self, time_step: usize) -> &[Vec3f] {
        self.vertices.get(time_step).map(Vec::as_slice).unwrap_or(&[])
    }

    fn time_steps(&self) -> usize {
        self.vertices.len().max(1)
    }

    fn displacement(&self) -> Option<&dyn Displacement> {
        self.displacement.as_deref()
    }

    fn adaptive_evaluator(&self) -> Option<&dyn FeatureAdaptiveEval> {
        self.adaptive.as_deref()
    }
}

impl fmt::Debug for SimpleMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleMesh")
            .field("time_steps", &self.vertices.len())
            .field("displacement", &self.displacement.is_some())
            .field("adaptive", &self.adaptive.is_some())
            .finish()
    }
}
