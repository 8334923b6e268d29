//! Ray intersection against lazily tessellated patch grids.

use std::sync::Arc;

use subd_kernel_patch::{CacheRead, CacheStorage, PatchDescriptor, SubdivMesh, TessellationCache, TessellationConfig};

use crate::epilogue::{Epilogue, Intersect1Epilogue, Occluded1Epilogue};
use crate::error::{RaytraceError, Result};
use crate::gather::{gather_triangles, gather_triangles_lerp, Gather2x3, Gather3x3, GatherWidth, GridGather, MapUv};
use crate::grid_soa::{GridLeaf, GridSoa, NodeRef};
use crate::pluecker::intersect_pluecker;
use crate::ray::Ray;

/// Split a time in `[0, 1]` into a segment index and a fraction within it.
///
/// Times outside `[0, 1]` are clamped first, so the fraction never leaves
/// `[0, 1]` and `time = 1` lands at the end of the last segment.
pub fn time_segment(time: f32, segments: usize) -> (usize, f32) {
    let scaled = time.clamp(0.0, 1.0) * segments as f32;
    let index = scaled.floor().clamp(0.0, (segments.max(1) - 1) as f32);
    (index as usize, scaled - index)
}

/// Per-grid state shared by every leaf test of one traversal.
#[derive(Debug, Clone, Copy)]
pub struct Precalculations<'a> {
    /// The grid being traversed.
    pub grid: GridSoa<'a>,
    /// Gather variant for leaf tests.
    pub gather: GatherWidth,
}

impl<'a> Precalculations<'a> {
    /// Prepare a grid for traversal.
    pub fn new(grid: GridSoa<'a>, gather: GatherWidth) -> Self {
        Self { grid, gather }
    }
}

/// Test every triangle of `leaf` at a time step, or between two.
fn intersect_leaf<G: GridGather, E: Epilogue>(
    grid: &GridSoa<'_>,
    ray: &mut Ray,
    leaf: &GridLeaf,
    itime: usize,
    ftime: Option<f32>,
    epilogue: &mut E,
) -> bool {
    let base = grid.decode_leaf(itime, leaf);
    let dim = grid.dim_offset();
    let map_uv = MapUv::new(grid.words(), base + 3 * dim);
    let mut accepted = false;
    for pass in 0..G::PASSES {
        let vertices = G::triangle_vertices(leaf, pass, grid.width());
        let [v0, v1, v2] = match ftime {
            Some(t) => gather_triangles_lerp::<G::Lanes>(grid.floats(), base, dim, grid.grid_floats(), &vertices, t),
            None => gather_triangles::<G::Lanes>(grid.floats(), base, dim, &vertices),
        };
        let hits = intersect_pluecker(ray, &v0, &v1, &v2);
        if epilogue.report(ray, &hits, &vertices, &map_uv) {
            accepted = true;
            if E::TERMINATES {
                return true;
            }
        }
    }
    accepted
}

fn dispatch<E: Epilogue>(
    pre: &Precalculations<'_>,
    ray: &mut Ray,
    leaf: &GridLeaf,
    itime: usize,
    ftime: Option<f32>,
    epilogue: &mut E,
) -> bool {
    match pre.gather {
        GatherWidth::Wide => intersect_leaf::<Gather3x3, E>(&pre.grid, ray, leaf, itime, ftime, epilogue),
        GatherWidth::Narrow => intersect_leaf::<Gather2x3, E>(&pre.grid, ray, leaf, itime, ftime, epilogue),
    }
}

fn intersect_epilogue(grid: &GridSoa<'_>) -> Intersect1Epilogue {
    Intersect1Epilogue {
        geom_id: grid.header().geom_id,
        prim_id: grid.header().prim_id,
    }
}

// =============================================================================
// Static grids
// =============================================================================

/// Single-ray intersector for grids with one time step.
#[derive(Debug, Clone, Copy)]
pub struct GridSoaIntersector1;

impl GridSoaIntersector1 {
    /// Closest-hit test against the triangles of one leaf.
    pub fn intersect(pre: &Precalculations<'_>, ray: &mut Ray, leaf: &GridLeaf) -> bool {
        let mut epilogue = intersect_epilogue(&pre.grid);
        dispatch(pre, ray, leaf, 0, None, &mut epilogue)
    }

    /// Any-hit test against the triangles of one leaf.
    pub fn occluded(pre: &Precalculations<'_>, ray: &mut Ray, leaf: &GridLeaf) -> bool {
        dispatch(pre, ray, leaf, 0, None, &mut Occluded1Epilogue)
    }

    /// Closest hit over the whole grid.
    pub fn intersect_grid(pre: &Precalculations<'_>, ray: &mut Ray) -> bool {
        let mut found = false;
        pre.grid.traverse(ray, |ray, leaf| {
            found |= Self::intersect(pre, ray, leaf);
            false
        });
        found
    }

    /// Any hit over the whole grid.
    pub fn occluded_grid(pre: &Precalculations<'_>, ray: &mut Ray) -> bool {
        pre.grid.traverse(ray, |ray, leaf| Self::occluded(pre, ray, leaf))
    }
}

/// Single-ray intersector for motion-blurred grids.
///
/// Vertices are blended linearly between the two time steps that bracket
/// the ray time; leaf bounds enclose every time step. A grid with a single
/// time step is tested as a static grid.
#[derive(Debug, Clone, Copy)]
pub struct GridSoaMBlurIntersector1;

impl GridSoaMBlurIntersector1 {
    /// Time step and blend fraction for the ray, `None` fraction when the
    /// grid has no second step to blend towards.
    fn segment(pre: &Precalculations<'_>, ray: &Ray) -> (usize, Option<f32>) {
        match pre.grid.time_steps() {
            0 | 1 => (0, None),
            steps => {
                let (itime, ftime) = time_segment(ray.time, steps - 1);
                (itime, Some(ftime))
            }
        }
    }

    /// Closest-hit test against the triangles of one leaf at the ray time.
    pub fn intersect(pre: &Precalculations<'_>, ray: &mut Ray, leaf: &GridLeaf) -> bool {
        let (itime, ftime) = Self::segment(pre, ray);
        let mut epilogue = intersect_epilogue(&pre.grid);
        dispatch(pre, ray, leaf, itime, ftime, &mut epilogue)
    }

    /// Any-hit test against the triangles of one leaf at the ray time.
    pub fn occluded(pre: &Precalculations<'_>, ray: &mut Ray, leaf: &GridLeaf) -> bool {
        let (itime, ftime) = Self::segment(pre, ray);
        dispatch(pre, ray, leaf, itime, ftime, &mut Occluded1Epilogue)
    }

    /// Closest hit over the whole grid.
    pub fn intersect_grid(pre: &Precalculations<'_>, ray: &mut Ray) -> bool {
        let mut found = false;
        pre.grid.traverse(ray, |ray, leaf| {
            found |= Self::intersect(pre, ray, leaf);
            false
        });
        found
    }

    /// Any hit over the whole grid.
    pub fn occluded_grid(pre: &Precalculations<'_>, ray: &mut Ray) -> bool {
        pre.grid.traverse(ray, |ray, leaf| Self::occluded(pre, ray, leaf))
    }
}

// =============================================================================
// Lazy patches
// =============================================================================

/// Everything a lazy patch intersection needs besides the ray.
#[derive(Clone, Copy)]
pub struct IntersectContext<'a> {
    /// Shared tessellation cache.
    pub cache: &'a TessellationCache,
    /// Mesh owning the patches.
    pub mesh: &'a dyn SubdivMesh,
    /// Tessellation parameters.
    pub config: TessellationConfig,
    /// Gather variant for leaf tests.
    pub gather: GatherWidth,
}

impl<'a> IntersectContext<'a> {
    /// Context with the default gather width.
    pub fn new(cache: &'a TessellationCache, mesh: &'a dyn SubdivMesh, config: TessellationConfig) -> Self {
        Self {
            cache,
            mesh,
            config,
            gather: GatherWidth::default(),
        }
    }

    /// Override the gather width.
    pub fn with_gather(mut self, gather: GatherWidth) -> Self {
        self.gather = gather;
        self
    }
}

impl std::fmt::Debug for IntersectContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntersectContext")
            .field("cache", &self.cache)
            .field("time_steps", &self.mesh.time_steps())
            .field("config", &self.config)
            .field("gather", &self.gather)
            .finish()
    }
}

/// Handle to the grid a lazy intersection last used.
///
/// Keeps the storage alive after the patch lock is released.
#[derive(Debug, Clone)]
pub struct LazyNode {
    /// Grid storage.
    pub storage: Arc<CacheStorage>,
    /// Root of the grid's quad-tree.
    pub root: NodeRef,
}

/// Intersector for patches whose grid is built on first use.
#[derive(Debug, Clone, Copy)]
pub struct SubdivPatchIntersector1;

impl SubdivPatchIntersector1 {
    /// Fetch or build the patch grid. `patches` holds one descriptor per
    /// time step of the mesh.
    fn lookup<'p>(context: &IntersectContext<'_>, patches: &'p [PatchDescriptor]) -> Result<CacheRead<'p>> {
        let time_steps = context.mesh.time_steps();
        if patches.len() < time_steps || patches.is_empty() {
            return Err(RaytraceError::TimeSteps {
                expected: time_steps,
                actual: patches.len(),
            });
        }
        let patches = &patches[..time_steps];
        let leaf_blocks = context.config.leaf_blocks;
        let blocks = GridSoa::size_in_blocks(&patches[0], time_steps, leaf_blocks);
        let grid = patches[0].cache().lookup_or_build(context.cache, blocks, |storage| {
            GridSoa::build(storage, patches, context.mesh, leaf_blocks)
        })?;
        Ok(grid)
    }

    fn prepare<'g>(
        context: &IntersectContext<'_>,
        grid: &'g CacheRead<'_>,
        lazy_node: &mut Option<LazyNode>,
    ) -> Precalculations<'g> {
        let view = GridSoa::new(grid);
        *lazy_node = Some(LazyNode {
            storage: Arc::clone(grid.storage()),
            root: view.root(),
        });
        Precalculations::new(view, context.gather)
    }

    /// Closest hit against a patch, tessellating it first if needed.
    ///
    /// Returns whether the ray's hit was updated.
    pub fn intersect(
        ray: &mut Ray,
        context: &IntersectContext<'_>,
        patches: &[PatchDescriptor],
        lazy_node: &mut Option<LazyNode>,
    ) -> Result<bool> {
        let grid = Self::lookup(context, patches)?;
        let pre = Self::prepare(context, &grid, lazy_node);
        let found = if pre.grid.time_steps() > 1 {
            GridSoaMBlurIntersector1::intersect_grid(&pre, ray)
        } else {
            GridSoaIntersector1::intersect_grid(&pre, ray)
        };
        log::trace!("patch {}/{} intersect: {}", patches[0].geom_id, patches[0].prim_id, found);
        Ok(found)
    }

    /// Any hit against a patch, tessellating it first if needed.
    pub fn occluded(
        ray: &mut Ray,
        context: &IntersectContext<'_>,
        patches: &[PatchDescriptor],
        lazy_node: &mut Option<LazyNode>,
    ) -> Result<bool> {
        let grid = Self::lookup(context, patches)?;
        let pre = Self::prepare(context, &grid, lazy_node);
        let occluded = if pre.grid.time_steps() > 1 {
            GridSoaMBlurIntersector1::occluded_grid(&pre, ray)
        } else {
            GridSoaIntersector1::occluded_grid(&pre, ray)
        };
        log::trace!("patch {}/{} occluded: {}", patches[0].geom_id, patches[0].prim_id, occluded);
        Ok(occluded)
    }
}
