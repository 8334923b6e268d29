#![warn(missing_docs)]

//! Math types for the subdivision kernel.
//!
//! Thin wrappers around nalgebra for the scalar `f32` vector types used at
//! the kernel boundary, plus a lane-batched layer over `wide` so that patch
//! evaluation can be written once and run on `f32`, `f32x4` or `f32x8`.
//!
//! # Key types
//!
//! - [`Real`] - scalar-or-SIMD float abstraction
//! - [`Vec3x`] - 3-component vector over any [`Real`]
//! - [`BBox3fa`] - axis-aligned box with an auxiliary lane

mod lanes;

pub use lanes::{lerp2, Real, Vec3x};
pub use wide::{f32x4, f32x8};

use nalgebra::{Vector2, Vector3, Vector4};

/// A 3D vector (position or direction) in single precision.
pub type Vec3f = Vector3<f32>;

/// A 2D vector in single precision (parametric coordinates).
pub type Vec2f = Vector2<f32>;

/// A 3D vector padded with an auxiliary fourth lane.
pub type Vec3fa = Vector4<f32>;

/// The batch type used for grid evaluation.
pub type VFloat = f32x8;

/// Number of lanes in [`VFloat`].
pub const VFLOAT_LANES: usize = 8;

/// Axis-aligned bounding box with an auxiliary channel in the fourth lane.
///
/// Only `x`, `y` and `z` carry bounds; the `w` lanes are kept at zero by
/// every producer in this workspace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox3fa {
    /// Minimum corner.
    pub lower: Vec3fa,
    /// Maximum corner.
    pub upper: Vec3fa,
}

impl BBox3fa {
    /// Create a box from min and max corners.
    pub fn new(lower: Vec3f, upper: Vec3f) -> Self {
        Self {
            lower: Vec3fa::new(lower.x, lower.y, lower.z, 0.0),
            upper: Vec3fa::new(upper.x, upper.y, upper.z, 0.0),
        }
    }

    /// Create an empty (inverted) box suitable for expansion.
    pub fn empty() -> Self {
        Self {
            lower: Vec3fa::new(f32::INFINITY, f32::INFINITY, f32::INFINITY, 0.0),
            upper: Vec3fa::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY, 0.0),
        }
    }

    /// Expand this box to include a point.
    pub fn include_point(&mut self, p: &Vec3f) {
        self.lower.x = self.lower.x.min(p.x);
        self.lower.y = self.lower.y.min(p.y);
        self.lower.z = self.lower.z.min(p.z);
        self.upper.x = self.upper.x.max(p.x);
        self.upper.y = self.upper.y.max(p.y);
        self.upper.z = self.upper.z.max(p.z);
    }

    /// Expand this box to include another box.
    pub fn merge(&mut self, other: &BBox3fa) {
        self.include_point(&other.lower_point());
        self.include_point(&other.upper_point());
    }

    /// Minimum corner without the auxiliary lane.
    pub fn lower_point(&self) -> Vec3f {
        self.lower.xyz()
    }

    /// Maximum corner without the auxiliary lane.
    pub fn upper_point(&self) -> Vec3f {
        self.upper.xyz()
    }

    /// `true` if all six bound values are finite.
    pub fn is_finite(&self) -> bool {
        self.lower.xyz().iter().chain(self.upper.xyz().iter()).all(|v| v.is_finite())
    }

    /// `true` if `lower <= upper` on every axis.
    pub fn is_ordered(&self) -> bool {
        self.lower.x <= self.upper.x && self.lower.y <= self.upper.y && self.lower.z <= self.upper.z
    }

    /// Test if two boxes overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &BBox3fa) -> bool {
        self.lower.x <= other.upper.x
            && self.upper.x >= other.lower.x
            && self.lower.y <= other.upper.y
            && self.upper.y >= other.lower.y
            && self.lower.z <= other.upper.z
            && self.upper.z >= other.lower.z
    }
}

impl Default for BBox3fa {
    fn default() -> Self {
        Self::empty()
    }
}
