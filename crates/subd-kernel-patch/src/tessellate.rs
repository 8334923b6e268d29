//! UV sample grids and crack-free edge stitching.
//!
//! A patch is tessellated over a logical `swidth × sheight` vertex grid. A
//! [`SubRect`] selects an inclusive window of that grid, so large grids can
//! be evaluated piecewise. Sample arrays are row-major over the window.
//!
//! Edges are numbered `v = 0`, `u = 1`, `v = 1`, `u = 0`. An edge whose
//! tessellation level is coarser than the grid along it gets its boundary
//! samples snapped onto the coarse parameter values, so that it lines up
//! with a neighbour tessellated at that level.

/// Inclusive window `[x0, x1] × [y0, y1]` of a `swidth × sheight` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubRect {
    /// First column.
    pub x0: u32,
    /// Last column (inclusive).
    pub x1: u32,
    /// First row.
    pub y0: u32,
    /// Last row (inclusive).
    pub y1: u32,
    /// Columns in the full grid.
    pub swidth: u32,
    /// Rows in the full grid.
    pub sheight: u32,
}

impl SubRect {
    /// Create a window. Both grid dimensions must be at least 2.
    pub fn new(x0: u32, x1: u32, y0: u32, y1: u32, swidth: u32, sheight: u32) -> Self {
        debug_assert!(swidth >= 2 && sheight >= 2, "grid must be at least 2x2");
        debug_assert!(x0 <= x1 && x1 < swidth, "column window out of range");
        debug_assert!(y0 <= y1 && y1 < sheight, "row window out of range");
        Self {
            x0,
            x1,
            y0,
            y1,
            swidth,
            sheight,
        }
    }

    /// Window covering the whole grid.
    pub fn full(swidth: u32, sheight: u32) -> Self {
        Self::new(0, swidth - 1, 0, sheight - 1, swidth, sheight)
    }

    /// Columns in the window.
    pub fn dwidth(&self) -> u32 {
        self.x1 - self.x0 + 1
    }

    /// Rows in the window.
    pub fn dheight(&self) -> u32 {
        self.y1 - self.y0 + 1
    }

    /// Number of valid samples.
    pub fn samples(&self) -> usize {
        self.dwidth() as usize * self.dheight() as usize
    }

    /// Sample count rounded up to a multiple of `simd_width`.
    pub fn padded_len(&self, simd_width: usize) -> usize {
        self.samples().div_ceil(simd_width) * simd_width
    }
}

/// Fill row-major u and v samples for the window.
///
/// Writes the first `rect.samples()` entries of each slice.
pub fn grid_uv_tessellator(rect: &SubRect, u: &mut [f32], v: &mut [f32]) {
    let dwidth = rect.dwidth() as usize;
    let u_scale = (rect.swidth - 1) as f32;
    let v_scale = (rect.sheight - 1) as f32;
    for y in 0..rect.dheight() {
        let row = y as usize * dwidth;
        let vv = (rect.y0 + y) as f32 / v_scale;
        for x in 0..rect.dwidth() {
            let i = row + x as usize;
            u[i] = (rect.x0 + x) as f32 / u_scale;
            v[i] = vv;
        }
    }
}

/// Replicate `values[valid - 1]` into the rest of the slice.
pub fn pad_tail(valid: usize, values: &mut [f32]) {
    debug_assert!(valid >= 1 && valid <= values.len());
    let last = values[valid - 1];
    values[valid..].fill(last);
}

/// Parameter of fine sample `x` snapped onto an edge with `low_points` points.
///
/// The result uses the same expression a neighbour at the coarse level uses
/// for its own samples, so shared vertices agree bit for bit.
#[inline]
pub fn stitch(x: u32, low_points: u32, high_points: u32) -> f32 {
    let low = u64::from(low_points - 1);
    let high = u64::from(high_points - 1);
    let i = (2 * u64::from(x) * low + high) / (2 * high);
    i as f32 / low as f32
}

/// Snap boundary samples of coarse edges onto their edge's level.
///
/// `levels` are the integral per-edge levels of the patch. Edges whose
/// level matches the grid resolution, or whose boundary is outside the
/// window, are left untouched.
pub fn stitch_uv_grid(levels: &[f32; 4], rect: &SubRect, u: &mut [f32], v: &mut [f32]) {
    let dwidth = rect.dwidth() as usize;
    let dheight = rect.dheight() as usize;
    let points = levels.map(|l| l as u32 + 1);

    // Edge 0: v = 0
    if rect.y0 == 0 && points[0] < rect.swidth {
        for x in 0..dwidth {
            u[x] = stitch(rect.x0 + x as u32, points[0], rect.swidth);
        }
    }
    // Edge 2: v = 1
    if rect.y1 == rect.sheight - 1 && points[2] < rect.swidth {
        let row = (dheight - 1) * dwidth;
        for x in 0..dwidth {
            u[row + x] = stitch(rect.x0 + x as u32, points[2], rect.swidth);
        }
    }
    // Edge 3: u = 0
    if rect.x0 == 0 && points[3] < rect.sheight {
        for y in 0..dheight {
            v[y * dwidth] = stitch(rect.y0 + y as u32, points[3], rect.sheight);
        }
    }
    // Edge 1: u = 1
    if rect.x1 == rect.swidth - 1 && points[1] < rect.sheight {
        for y in 0..dheight {
            v[y * dwidth + dwidth - 1] = stitch(rect.y0 + y as u32, points[1], rect.sheight);
        }
    }
}

/// Tessellate a window into padded u and v arrays.
///
/// Samples are stitched first when `stitch_levels` is given, then the tail
/// is padded to a multiple of `simd_width`.
pub fn tessellate_uv(
    rect: &SubRect,
    stitch_levels: Option<&[f32; 4]>,
    simd_width: usize,
) -> (Vec<f32>, Vec<f32>) {
    let n = rect.samples();
    let len = rect.padded_len(simd_width);
    let mut u = vec![0.0; len];
    let mut v = vec![0.0; len];
    grid_uv_tessellator(rect, &mut u, &mut v);
    if let Some(levels) = stitch_levels {
        stitch_uv_grid(levels, rect, &mut u, &mut v);
    }
    pad_tail(n, &mut u);
    pad_tail(n, &mut v);
    (u, v)
}
