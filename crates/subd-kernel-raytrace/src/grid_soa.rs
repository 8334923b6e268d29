//! Structure-of-arrays grid storage.
//!
//! A grid lives in one block of cache storage:
//!
//! - block 0: [`GridHeader`]
//! - blocks `1..1 + tree_blocks`: quad-tree of [`GridNode`] and [`GridLeaf`] records
//! - then, per time step, four planes (x, y, z, packed uv) of `dim_offset`
//!   floats each, rows `width` floats apart
//!
//! The quad-tree is emitted by the same [`GridRange`] recursion that the
//! patch uses to size the allocation, so the tree always fits.

use bytemuck::{Pod, Zeroable};
use subd_kernel_math::{BBox3fa, Vec3f};
use subd_kernel_patch::{
    eval_grid, quantize_uv, dequantize_uv, CacheStorage, GridBuffers, GridRange, GridRangeVisitor,
    PatchDescriptor, SubRect, SubdivMesh, BLOCK_BYTES, DEFAULT_LEAF_BLOCKS, NODE_BLOCKS,
};

use crate::ray::Ray;

// =============================================================================
// Records
// =============================================================================

/// Reference to a tree record: block index, with the top bit marking leaves.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct NodeRef(pub u32);

impl NodeRef {
    const LEAF_BIT: u32 = 1 << 31;

    /// Unused child slot.
    pub const EMPTY: NodeRef = NodeRef(u32::MAX);

    /// Reference to an internal node at `block`.
    pub fn node(block: u32) -> Self {
        NodeRef(block)
    }

    /// Reference to a leaf at `block`.
    pub fn leaf(block: u32) -> Self {
        NodeRef(block | Self::LEAF_BIT)
    }

    /// `true` for unused child slots.
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    /// `true` if this references a leaf.
    pub fn is_leaf(self) -> bool {
        !self.is_empty() && self.0 & Self::LEAF_BIT != 0
    }

    /// Block index of the record.
    pub fn block(self) -> usize {
        (self.0 & !Self::LEAF_BIT) as usize
    }
}

/// Grid-wide parameters, stored in the first block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct GridHeader {
    /// Vertices per row.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Floats per plane (plane stride), a multiple of 16.
    pub dim_offset: u32,
    /// Number of time steps.
    pub time_steps: u32,
    /// Blocks used by the quad-tree.
    pub tree_blocks: u32,
    /// Blocks used by the planes of one time step.
    pub grid_blocks: u32,
    /// Root record.
    pub root: NodeRef,
    /// Geometry id of the patch.
    pub geom_id: u32,
    /// Primitive id of the patch.
    pub prim_id: u32,
    /// Padding to one block.
    pub _pad: [u32; 7],
}

/// Internal quad-tree node: bounds of up to four children, stored per axis.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GridNode {
    /// Child minimum x.
    pub lower_x: [f32; 4],
    /// Child maximum x.
    pub upper_x: [f32; 4],
    /// Child minimum y.
    pub lower_y: [f32; 4],
    /// Child maximum y.
    pub upper_y: [f32; 4],
    /// Child minimum z.
    pub lower_z: [f32; 4],
    /// Child maximum z.
    pub upper_z: [f32; 4],
    /// Child references.
    pub children: [NodeRef; 4],
    /// Padding to two blocks.
    pub _pad: [u32; 4],
}

impl GridNode {
    /// Bounds of child slot `i`.
    pub fn child_bounds(&self, i: usize) -> BBox3fa {
        BBox3fa::new(
            Vec3f::new(self.lower_x[i], self.lower_y[i], self.lower_z[i]),
            Vec3f::new(self.upper_x[i], self.upper_y[i], self.upper_z[i]),
        )
    }
}

/// Quad-tree leaf: a window of at most 3×3 grid vertices.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GridLeaf {
    /// Minimum corner over all time steps (`w` unused).
    pub lower: [f32; 4],
    /// Maximum corner over all time steps (`w` unused).
    pub upper: [f32; 4],
    /// First column.
    pub x0: u32,
    /// First row.
    pub y0: u32,
    /// Vertex columns (2 or 3).
    pub nu: u32,
    /// Vertex rows (2 or 3).
    pub nv: u32,
    /// Padding to two blocks.
    pub _pad: [u32; 20],
}

impl GridLeaf {
    /// Leaf bounds.
    pub fn bounds(&self) -> BBox3fa {
        BBox3fa::new(
            Vec3f::new(self.lower[0], self.lower[1], self.lower[2]),
            Vec3f::new(self.upper[0], self.upper[1], self.upper[2]),
        )
    }
}

const _: () = assert!(std::mem::size_of::<GridHeader>() == BLOCK_BYTES);
const _: () = assert!(std::mem::size_of::<GridNode>() == NODE_BLOCKS as usize * BLOCK_BYTES);
const _: () = assert!(std::mem::size_of::<GridLeaf>() == DEFAULT_LEAF_BLOCKS as usize * BLOCK_BYTES);

/// Pack a patch-local uv pair into 16 + 16 bits.
pub fn pack_uv(u: f32, v: f32) -> u32 {
    quantize_uv(u) as u32 | (quantize_uv(v) as u32) << 16
}

/// Unpack a uv pair produced by [`pack_uv`].
pub fn unpack_uv(bits: u32) -> (f32, f32) {
    (dequantize_uv(bits as u16), dequantize_uv((bits >> 16) as u16))
}

// =============================================================================
// Layout
// =============================================================================

/// Storage layout of a patch grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    /// Vertices per row.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Floats per plane.
    pub dim_offset: u32,
    /// Blocks per time step.
    pub grid_blocks: u32,
    /// Quad-tree blocks.
    pub tree_blocks: u32,
    /// Number of time steps.
    pub time_steps: u32,
}

impl GridLayout {
    /// Layout for a patch evaluated at `time_steps` time steps.
    pub fn new(patch: &PatchDescriptor, time_steps: usize, leaf_blocks: u32) -> Self {
        debug_assert!(leaf_blocks >= DEFAULT_LEAF_BLOCKS, "leaf record needs two blocks");
        let width = patch.grid_u_res;
        let height = patch.grid_v_res;
        let floats_per_block = (BLOCK_BYTES / 4) as u32;
        let dim_offset = (width * height).div_ceil(floats_per_block) * floats_per_block;
        Self {
            width,
            height,
            dim_offset,
            grid_blocks: 4 * dim_offset / floats_per_block,
            tree_blocks: patch.sub_tree_size_64b_blocks(leaf_blocks),
            time_steps: time_steps as u32,
        }
    }

    /// Total blocks: header, tree and every time step's planes.
    pub fn size_in_blocks(&self) -> usize {
        1 + self.tree_blocks as usize + self.time_steps as usize * self.grid_blocks as usize
    }

    /// Float offset of the x plane of `time_step`.
    pub fn plane_base(&self, time_step: usize) -> usize {
        (1 + self.tree_blocks as usize + time_step * self.grid_blocks as usize) * (BLOCK_BYTES / 4)
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Emits tree records while walking the grid's [`GridRange`] tree.
struct TreeBuilder<'a> {
    bytes: &'a mut [u8],
    next_block: u32,
    leaf_blocks: u32,
    grids: &'a [GridBuffers],
    width: u32,
}

impl TreeBuilder<'_> {
    fn alloc(&mut self, blocks: u32) -> u32 {
        let block = self.next_block;
        self.next_block += blocks;
        block
    }

    fn record_mut<T: Pod>(&mut self, block: u32) -> &mut T {
        let start = block as usize * BLOCK_BYTES;
        bytemuck::from_bytes_mut(&mut self.bytes[start..start + std::mem::size_of::<T>()])
    }
}

impl GridRangeVisitor for TreeBuilder<'_> {
    type Output = (NodeRef, BBox3fa);

    fn leaf(&mut self, range: &GridRange) -> (NodeRef, BBox3fa) {
        let mut bounds = BBox3fa::empty();
        for grid in self.grids {
            for y in range.v_start..=range.v_end {
                for x in range.u_start..=range.u_end {
                    bounds.include_point(&grid.position((y * self.width + x) as usize));
                }
            }
        }
        let block = self.alloc(self.leaf_blocks);
        *self.record_mut::<GridLeaf>(block) = GridLeaf {
            lower: [bounds.lower.x, bounds.lower.y, bounds.lower.z, 0.0],
            upper: [bounds.upper.x, bounds.upper.y, bounds.upper.z, 0.0],
            x0: range.u_start,
            y0: range.v_start,
            nu: range.u_size(),
            nv: range.v_size(),
            _pad: [0; 20],
        };
        (NodeRef::leaf(block), bounds)
    }

    fn node(&mut self, _range: &GridRange, children: Vec<(NodeRef, BBox3fa)>) -> (NodeRef, BBox3fa) {
        debug_assert!(children.len() >= 2 && children.len() <= 4);
        let mut node = GridNode {
            lower_x: [f32::INFINITY; 4],
            upper_x: [f32::NEG_INFINITY; 4],
            lower_y: [f32::INFINITY; 4],
            upper_y: [f32::NEG_INFINITY; 4],
            lower_z: [f32::INFINITY; 4],
            upper_z: [f32::NEG_INFINITY; 4],
            children: [NodeRef::EMPTY; 4],
            _pad: [0; 4],
        };
        let mut bounds = BBox3fa::empty();
        for (i, (child, b)) in children.iter().enumerate() {
            node.lower_x[i] = b.lower.x;
            node.upper_x[i] = b.upper.x;
            node.lower_y[i] = b.lower.y;
            node.upper_y[i] = b.upper.y;
            node.lower_z[i] = b.lower.z;
            node.upper_z[i] = b.upper.z;
            node.children[i] = *child;
            bounds.merge(b);
        }
        let block = self.alloc(NODE_BLOCKS);
        *self.record_mut::<GridNode>(block) = node;
        (NodeRef::node(block), bounds)
    }
}

// =============================================================================
// Grid view
// =============================================================================

/// Read-only view of a built grid.
#[derive(Debug, Clone, Copy)]
pub struct GridSoa<'a> {
    header: GridHeader,
    bytes: &'a [u8],
    floats: &'a [f32],
}

impl<'a> GridSoa<'a> {
    /// Blocks needed for a patch grid with `time_steps` time steps.
    pub fn size_in_blocks(patch: &PatchDescriptor, time_steps: usize, leaf_blocks: u32) -> usize {
        GridLayout::new(patch, time_steps, leaf_blocks).size_in_blocks()
    }

    /// Tessellate one descriptor per time step into `storage`.
    ///
    /// All descriptors must share the same grid resolution. Node and leaf
    /// bounds enclose every time step.
    pub fn build<M: SubdivMesh + ?Sized>(
        storage: &mut CacheStorage,
        patches: &[PatchDescriptor],
        mesh: &M,
        leaf_blocks: u32,
    ) {
        let first = &patches[0];
        debug_assert!(patches
            .iter()
            .all(|p| p.grid_u_res == first.grid_u_res && p.grid_v_res == first.grid_v_res));
        let layout = GridLayout::new(first, patches.len(), leaf_blocks);
        debug_assert!(storage.len_blocks() >= layout.size_in_blocks());

        let rect = SubRect::full(layout.width, layout.height);
        let grids: Vec<GridBuffers> = patches
            .iter()
            .enumerate()
            .map(|(time_step, patch)| {
                let mut grid = GridBuffers::new(&rect);
                eval_grid(patch, &rect, mesh, time_step, &mut grid);
                grid
            })
            .collect();

        let n = rect.samples();
        let dim = layout.dim_offset as usize;
        {
            let floats = storage.floats_mut();
            for (time_step, grid) in grids.iter().enumerate() {
                let base = layout.plane_base(time_step);
                floats[base..base + n].copy_from_slice(&grid.x[..n]);
                floats[base + dim..base + dim + n].copy_from_slice(&grid.y[..n]);
                floats[base + 2 * dim..base + 2 * dim + n].copy_from_slice(&grid.z[..n]);
                let uv: &mut [u32] = bytemuck::cast_slice_mut(&mut floats[base + 3 * dim..base + 3 * dim + n]);
                for (i, packed) in uv.iter_mut().enumerate() {
                    *packed = pack_uv(grid.u[i], grid.v[i]);
                }
            }
        }

        let mut builder = TreeBuilder {
            bytes: storage.bytes_mut(),
            next_block: 1,
            leaf_blocks,
            grids: &grids,
            width: layout.width,
        };
        let (root, _) = GridRange::full(layout.width, layout.height).visit(&mut builder);
        debug_assert_eq!(builder.next_block, 1 + layout.tree_blocks);

        *bytemuck::from_bytes_mut::<GridHeader>(&mut storage.bytes_mut()[..BLOCK_BYTES]) = GridHeader {
            width: layout.width,
            height: layout.height,
            dim_offset: layout.dim_offset,
            time_steps: layout.time_steps,
            tree_blocks: layout.tree_blocks,
            grid_blocks: layout.grid_blocks,
            root,
            geom_id: first.geom_id,
            prim_id: first.prim_id,
            _pad: [0; 7],
        };
        log::debug!(
            "built {}x{} grid for patch {}/{} ({} time steps, {} tree blocks)",
            layout.width,
            layout.height,
            first.geom_id,
            first.prim_id,
            layout.time_steps,
            layout.tree_blocks
        );
    }

    /// View a built grid.
    pub fn new(storage: &'a CacheStorage) -> Self {
        let bytes = storage.bytes();
        Self {
            header: *bytemuck::from_bytes::<GridHeader>(&bytes[..BLOCK_BYTES]),
            bytes,
            floats: storage.floats(),
        }
    }

    /// The grid header.
    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    /// Root record.
    pub fn root(&self) -> NodeRef {
        self.header.root
    }

    /// Vertices per row (row stride).
    pub fn width(&self) -> usize {
        self.header.width as usize
    }

    /// Floats per plane (plane stride).
    pub fn dim_offset(&self) -> usize {
        self.header.dim_offset as usize
    }

    /// Floats between consecutive time steps.
    pub fn grid_floats(&self) -> usize {
        self.header.grid_blocks as usize * (BLOCK_BYTES / 4)
    }

    /// Number of time steps.
    pub fn time_steps(&self) -> usize {
        self.header.time_steps as usize
    }

    /// All storage as floats.
    pub fn floats(&self) -> &'a [f32] {
        self.floats
    }

    /// All storage as raw 32-bit words, for the packed uv plane.
    pub fn words(&self) -> &'a [u32] {
        bytemuck::cast_slice(self.floats)
    }

    /// Internal node record.
    pub fn node(&self, r: NodeRef) -> &'a GridNode {
        debug_assert!(!r.is_leaf() && !r.is_empty());
        let start = r.block() * BLOCK_BYTES;
        bytemuck::from_bytes(&self.bytes[start..start + std::mem::size_of::<GridNode>()])
    }

    /// Leaf record.
    pub fn leaf(&self, r: NodeRef) -> &'a GridLeaf {
        debug_assert!(r.is_leaf());
        let start = r.block() * BLOCK_BYTES;
        bytemuck::from_bytes(&self.bytes[start..start + std::mem::size_of::<GridLeaf>()])
    }

    /// Float offset of the leaf's first vertex in the x plane of `time_step`.
    pub fn decode_leaf(&self, time_step: usize, leaf: &GridLeaf) -> usize {
        let plane = (1 + self.header.tree_blocks as usize) * (BLOCK_BYTES / 4);
        plane + time_step * self.grid_floats() + leaf.y0 as usize * self.width() + leaf.x0 as usize
    }

    /// Vertex position at `(x, y)` of `time_step`.
    pub fn vertex(&self, time_step: usize, x: u32, y: u32) -> Vec3f {
        let plane = (1 + self.header.tree_blocks as usize) * (BLOCK_BYTES / 4) + time_step * self.grid_floats();
        let i = plane + (y * self.header.width + x) as usize;
        let dim = self.dim_offset();
        Vec3f::new(self.floats[i], self.floats[i + dim], self.floats[i + 2 * dim])
    }

    /// Walk leaves the ray enters, nearest first.
    ///
    /// `visit` is called per leaf and returns `true` to stop the walk;
    /// the walk itself returns whether it was stopped.
    pub fn traverse<F>(&self, ray: &mut Ray, mut visit: F) -> bool
    where
        F: FnMut(&mut Ray, &GridLeaf) -> bool,
    {
        let mut stack: Vec<(NodeRef, f32)> = Vec::with_capacity(32);
        stack.push((self.root(), ray.tnear));

        while let Some((r, entry)) = stack.pop() {
            // Skip subtrees that start beyond the closest hit so far
            if entry > ray.tfar {
                continue;
            }
            if r.is_leaf() {
                let leaf = self.leaf(r);
                if ray.intersect_box(&leaf.bounds()).is_some() && visit(ray, leaf) {
                    return true;
                }
                continue;
            }

            let node = self.node(r);
            let mut hits = [(NodeRef::EMPTY, 0.0f32); 4];
            let mut count = 0;
            for (i, &child) in node.children.iter().enumerate() {
                if child.is_empty() {
                    continue;
                }
                if let Some((t_min, _)) = ray.intersect_box(&node.child_bounds(i)) {
                    hits[count] = (child, t_min);
                    count += 1;
                }
            }
            // Far children first so the nearest is popped next
            hits[..count].sort_unstable_by(|a, b| b.1.total_cmp(&a.1));
            stack.extend_from_slice(&hits[..count]);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subd_kernel_math::Vec2f;
    use subd_kernel_patch::{
        BezierPatch, PatchKind, SimpleMesh, TessellationCache, TessellationConfig,
    };

    fn flat_patch(level: f32) -> PatchDescriptor {
        let mut grid = [[Vec3f::zeros(); 4]; 4];
        for (j, row) in grid.iter_mut().enumerate() {
            for (i, p) in row.iter_mut().enumerate() {
                *p = Vec3f::new(i as f32, j as f32, 0.0);
            }
        }
        let uv = [
            Vec2f::new(0.0, 0.0),
            Vec2f::new(1.0, 0.0),
            Vec2f::new(1.0, 1.0),
            Vec2f::new(0.0, 1.0),
        ];
        PatchDescriptor::new(
            PatchKind::Bezier(BezierPatch::new(grid)),
            5,
            11,
            uv,
            [level; 4],
            &TessellationConfig::default(),
        )
    }

    fn build(patch: PatchDescriptor) -> (CacheStorage, GridLayout) {
        let cache = TessellationCache::new(1 << 16);
        let layout = GridLayout::new(&patch, 1, DEFAULT_LEAF_BLOCKS);
        let mut storage = cache.allocate(layout.size_in_blocks()).unwrap();
        GridSoa::build(&mut storage, &[patch], &SimpleMesh::default(), DEFAULT_LEAF_BLOCKS);
        (storage, layout)
    }

    #[test]
    fn test_record_sizes() {
        assert_eq!(std::mem::size_of::<GridNode>(), 128);
        assert_eq!(std::mem::size_of::<GridLeaf>(), 128);
        assert_eq!(std::mem::size_of::<GridHeader>(), 64);
    }

    #[test]
    fn test_node_ref_tags() {
        assert!(NodeRef::leaf(7).is_leaf());
        assert_eq!(NodeRef::leaf(7).block(), 7);
        assert!(!NodeRef::node(7).is_leaf());
        assert!(NodeRef::EMPTY.is_empty());
        assert!(!NodeRef::EMPTY.is_leaf());
    }

    #[test]
    fn test_uv_packing() {
        let (u, v) = unpack_uv(pack_uv(0.25, 1.0));
        assert!((u - 0.25).abs() < 1e-4);
        assert_eq!(v, 1.0);
        assert_eq!(unpack_uv(pack_uv(0.0, 0.0)), (0.0, 0.0));
    }

    #[test]
    fn test_layout_strides() {
        let layout = GridLayout::new(&flat_patch(4.0), 2, DEFAULT_LEAF_BLOCKS);
        assert_eq!((layout.width, layout.height), (5, 5));
        assert_eq!(layout.dim_offset, 32);
        assert_eq!(layout.grid_blocks, 8);
        assert_eq!(layout.size_in_blocks(), 1 + layout.tree_blocks as usize + 16);
    }

    #[test]
    fn test_build_fills_planes_and_header() {
        let (storage, layout) = build(flat_patch(4.0));
        let grid = GridSoa::new(&storage);
        assert_eq!(grid.header().width, 5);
        assert_eq!(grid.header().geom_id, 5);
        assert_eq!(grid.header().prim_id, 11);
        assert_eq!(grid.header().tree_blocks, layout.tree_blocks);
        assert_eq!(grid.vertex(0, 0, 0), Vec3f::new(0.0, 0.0, 0.0));
        assert_eq!(grid.vertex(0, 4, 4), Vec3f::new(3.0, 3.0, 0.0));
        let mid = grid.vertex(0, 2, 2);
        assert!((mid - Vec3f::new(1.5, 1.5, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_tree_covers_every_quad_once() {
        for level in [1.0, 2.0, 3.0, 5.0, 8.0, 13.0] {
            let (storage, layout) = build(flat_patch(level));
            let grid = GridSoa::new(&storage);
            let mut quads = vec![0u32; ((layout.width - 1) * (layout.height - 1)) as usize];
            let mut stack = vec![grid.root()];
            while let Some(r) = stack.pop() {
                if r.is_leaf() {
                    let leaf = grid.leaf(r);
                    assert!(leaf.nu >= 2 && leaf.nu <= 3 && leaf.nv >= 2 && leaf.nv <= 3);
                    for y in leaf.y0..leaf.y0 + leaf.nv - 1 {
                        for x in leaf.x0..leaf.x0 + leaf.nu - 1 {
                            quads[(y * (layout.width - 1) + x) as usize] += 1;
                        }
                    }
                } else {
                    let node = grid.node(r);
                    stack.extend(node.children.iter().copied().filter(|c| !c.is_empty()));
                }
            }
            assert!(quads.iter().all(|&c| c == 1), "level {}", level);
        }
    }

    #[test]
    fn test_traverse_finds_leaf_under_ray() {
        let (storage, _) = build(flat_patch(8.0));
        let grid = GridSoa::new(&storage);
        let mut ray = Ray::new(Vec3f::new(0.1, 0.1, 1.0), Vec3f::new(0.0, 0.0, -1.0));
        let mut visited = Vec::new();
        grid.traverse(&mut ray, |_, leaf| {
            visited.push((leaf.x0, leaf.y0));
            false
        });
        assert!(visited.contains(&(0, 0)));
        assert!(visited.len() < 16);
    }

    #[test]
    fn test_traverse_visits_every_leaf_the_ray_enters() {
        let (storage, _) = build(flat_patch(16.0));
        let grid = GridSoa::new(&storage);
        let ray = Ray::new(Vec3f::new(1.23, 0.77, 1.0), Vec3f::new(0.0, 0.0, -1.0));

        let mut expected = Vec::new();
        let mut stack = vec![grid.root()];
        while let Some(r) = stack.pop() {
            if r.is_leaf() {
                let leaf = grid.leaf(r);
                if ray.intersect_box(&leaf.bounds()).is_some() {
                    expected.push((leaf.x0, leaf.y0));
                }
            } else {
                stack.extend(grid.node(r).children.iter().copied().filter(|c| !c.is_empty()));
            }
        }

        let mut visited = Vec::new();
        let mut traced = ray;
        grid.traverse(&mut traced, |_, leaf| {
            visited.push((leaf.x0, leaf.y0));
            false
        });
        expected.sort_unstable();
        visited.sort_unstable();
        assert!(!visited.is_empty());
        assert_eq!(visited, expected);
    }

    #[test]
    fn test_traverse_stops_when_visit_accepts() {
        let (storage, _) = build(flat_patch(16.0));
        let grid = GridSoa::new(&storage);
        let mut ray = Ray::new(Vec3f::new(1.23, 0.77, 1.0), Vec3f::new(0.0, 0.0, -1.0));
        let mut visits = 0;
        assert!(grid.traverse(&mut ray, |_, _| {
            visits += 1;
            true
        }));
        assert_eq!(visits, 1);
    }
}
