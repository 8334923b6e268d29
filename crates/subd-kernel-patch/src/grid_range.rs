//! Quad-tree partition of a tessellation grid.
//!
//! A [`GridRange`] is an inclusive rectangle of grid vertices. Ranges that
//! span more than 3×3 vertices split into up to four children that share
//! their boundary vertices. The same recursion drives both the storage
//! estimator ([`BlockCounter`]) and the grid builder, through
//! [`GridRange::visit`], so the two cannot disagree about the tree shape.

/// Blocks occupied by one internal quad-tree node (128 bytes).
pub const NODE_BLOCKS: u32 = 2;

/// Default block charge per leaf.
pub const DEFAULT_LEAF_BLOCKS: u32 = 2;

/// Inclusive vertex rectangle `[u_start, u_end] × [v_start, v_end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridRange {
    /// First vertex column.
    pub u_start: u32,
    /// Last vertex column (inclusive).
    pub u_end: u32,
    /// First vertex row.
    pub v_start: u32,
    /// Last vertex row (inclusive).
    pub v_end: u32,
}

/// Callbacks for a depth-first walk over a [`GridRange`] tree.
///
/// Children are visited in split order before their parent's
/// [`node`](Self::node) callback runs.
pub trait GridRangeVisitor {
    /// Value produced per subtree.
    type Output;

    /// Called for a range that satisfies [`GridRange::has_leaf_size`].
    fn leaf(&mut self, range: &GridRange) -> Self::Output;

    /// Called for an internal range after all of its children.
    fn node(&mut self, range: &GridRange, children: Vec<Self::Output>) -> Self::Output;
}

impl GridRange {
    /// Create a range from inclusive bounds.
    pub fn new(u_start: u32, u_end: u32, v_start: u32, v_end: u32) -> Self {
        debug_assert!(u_start <= u_end && v_start <= v_end);
        Self {
            u_start,
            u_end,
            v_start,
            v_end,
        }
    }

    /// Range covering a whole `u_res × v_res` vertex grid.
    pub fn full(u_res: u32, v_res: u32) -> Self {
        debug_assert!(u_res >= 1 && v_res >= 1);
        Self::new(0, u_res - 1, 0, v_res - 1)
    }

    /// Vertex count along u.
    pub fn u_size(&self) -> u32 {
        self.u_end - self.u_start + 1
    }

    /// Vertex count along v.
    pub fn v_size(&self) -> u32 {
        self.v_end - self.v_start + 1
    }

    /// `true` if the range fits in a single 3×3 leaf.
    pub fn has_leaf_size(&self) -> bool {
        self.u_size() <= 3 && self.v_size() <= 3
    }

    fn split_index(start: u32, end: u32) -> u32 {
        let center = (start + end) / 2;
        debug_assert!(center > start && center < end);
        center
    }

    /// Split along the longer side; the children share the center vertex.
    pub fn split(&self) -> (GridRange, GridRange) {
        debug_assert!(!self.has_leaf_size());
        let mut r0 = *self;
        let mut r1 = *self;
        if self.u_size() >= self.v_size() {
            let mid = Self::split_index(self.u_start, self.u_end);
            r0.u_end = mid;
            r1.u_start = mid;
        } else {
            let mid = Self::split_index(self.v_start, self.v_end);
            r0.v_end = mid;
            r1.v_start = mid;
        }
        (r0, r1)
    }

    /// Split into two or four sub-ranges (at most four children per node).
    pub fn split_into_sub_ranges(&self) -> Vec<GridRange> {
        let (first, second) = self.split();
        let mut children = Vec::with_capacity(4);
        for half in [first, second] {
            if half.has_leaf_size() {
                children.push(half);
            } else {
                let (a, b) = half.split();
                children.push(a);
                children.push(b);
            }
        }
        children
    }

    /// Walk the quad-tree rooted at this range.
    pub fn visit<V: GridRangeVisitor>(&self, visitor: &mut V) -> V::Output {
        if self.has_leaf_size() {
            return visitor.leaf(self);
        }
        let children = self
            .split_into_sub_ranges()
            .iter()
            .map(|child| child.visit(visitor))
            .collect();
        visitor.node(self, children)
    }
}

/// Visitor that counts 64-byte blocks without allocating anything.
#[derive(Debug, Clone, Copy)]
pub struct BlockCounter {
    /// Blocks charged per leaf.
    pub leaf_blocks: u32,
}

impl GridRangeVisitor for BlockCounter {
    type Output = u32;

    fn leaf(&mut self, _range: &GridRange) -> u32 {
        self.leaf_blocks
    }

    fn node(&mut self, _range: &GridRange, children: Vec<u32>) -> u32 {
        NODE_BLOCKS + children.iter().sum::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_size() {
        assert!(GridRange::new(0, 2, 0, 2).has_leaf_size());
        assert!(GridRange::new(0, 1, 0, 0).has_leaf_size());
        assert!(!GridRange::new(0, 3, 0, 2).has_leaf_size());
    }

    #[test]
    fn test_split_shares_boundary() {
        let (a, b) = GridRange::new(0, 8, 0, 4).split();
        assert_eq!(a.u_end, 4);
        assert_eq!(b.u_start, 4);
        assert_eq!(a.v_start, 0);
        assert_eq!(b.v_end, 4);
    }

    #[test]
    fn test_sub_ranges_cover_parent() {
        let r = GridRange::new(0, 9, 0, 6);
        let children = r.split_into_sub_ranges();
        assert!(children.len() >= 2 && children.len() <= 4);
        let u_min = children.iter().map(|c| c.u_start).min();
        let u_max = children.iter().map(|c| c.u_end).max();
        let v_min = children.iter().map(|c| c.v_start).min();
        let v_max = children.iter().map(|c| c.v_end).max();
        assert_eq!((u_min, u_max, v_min, v_max), (Some(0), Some(9), Some(0), Some(6)));
    }

    #[test]
    fn test_block_counter_single_leaf() {
        let mut counter = BlockCounter { leaf_blocks: 2 };
        assert_eq!(GridRange::full(3, 3).visit(&mut counter), 2);
    }

    #[test]
    fn test_block_counter_5x5() {
        // 5x5 vertices: one node with four 3x3 leaves
        let mut counter = BlockCounter { leaf_blocks: 2 };
        assert_eq!(GridRange::full(5, 5).visit(&mut counter), NODE_BLOCKS + 4 * 2);
    }

    #[test]
    fn test_block_counter_deterministic() {
        for (u, v) in [(2, 2), (7, 3), (17, 9), (33, 33), (65, 5)] {
            let a = GridRange::full(u, v).visit(&mut BlockCounter { leaf_blocks: 2 });
            let b = GridRange::full(u, v).visit(&mut BlockCounter { leaf_blocks: 2 });
            assert_eq!(a, b);
        }
    }
}
