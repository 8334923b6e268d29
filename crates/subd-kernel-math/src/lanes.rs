//! Lane-batched float abstraction.
//!
//! [`Real`] is implemented for `f32` and for the `wide` SIMD types. Code
//! written against it performs the same IEEE operations in the same order
//! on every lane, so a batched result is bit-identical to running the scalar
//! version once per lane. No fused multiply-add is used anywhere.

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

use wide::{f32x4, f32x8, CmpEq};

use crate::Vec3f;

/// A scalar or SIMD batch of `f32` values.
pub trait Real:
    Copy
    + Debug
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Number of lanes.
    const LANES: usize;

    /// Broadcast a scalar to every lane.
    fn splat(v: f32) -> Self;

    /// Load the first `LANES` values of `src`.
    fn load(src: &[f32]) -> Self;

    /// Store every lane into the first `LANES` slots of `dst`.
    fn store(self, dst: &mut [f32]);

    /// Extract lane `i`.
    fn lane(self, i: usize) -> f32;

    /// Lane-wise minimum.
    fn min(self, other: Self) -> Self;

    /// Lane-wise maximum.
    fn max(self, other: Self) -> Self;

    /// Lane-wise absolute value.
    fn abs(self) -> Self;

    /// Lane-wise square root.
    fn sqrt(self) -> Self;

    /// Lane-wise `if a == b { if_eq } else { otherwise }`.
    fn select_eq(a: Self, b: Self, if_eq: Self, otherwise: Self) -> Self;

    /// Horizontal minimum over all lanes.
    fn reduce_min(self) -> f32 {
        (0..Self::LANES).map(|i| self.lane(i)).fold(f32::INFINITY, f32::min)
    }

    /// Horizontal maximum over all lanes.
    fn reduce_max(self) -> f32 {
        (0..Self::LANES).map(|i| self.lane(i)).fold(f32::NEG_INFINITY, f32::max)
    }
}

impl Real for f32 {
    const LANES: usize = 1;

    #[inline]
    fn splat(v: f32) -> Self {
        v
    }

    #[inline]
    fn load(src: &[f32]) -> Self {
        src[0]
    }

    #[inline]
    fn store(self, dst: &mut [f32]) {
        dst[0] = self;
    }

    #[inline]
    fn lane(self, _i: usize) -> f32 {
        self
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        f32::min(self, other)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        f32::max(self, other)
    }

    #[inline]
    fn abs(self) -> Self {
        f32::abs(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }

    #[inline]
    fn select_eq(a: Self, b: Self, if_eq: Self, otherwise: Self) -> Self {
        if a == b {
            if_eq
        } else {
            otherwise
        }
    }
}

macro_rules! impl_real_for_wide {
    ($t:ty, $n:expr) => {
        impl Real for $t {
            const LANES: usize = $n;

            #[inline]
            fn splat(v: f32) -> Self {
                <$t>::splat(v)
            }

            #[inline]
            fn load(src: &[f32]) -> Self {
                let mut a = [0.0f32; $n];
                a.copy_from_slice(&src[..$n]);
                <$t>::from(a)
            }

            #[inline]
            fn store(self, dst: &mut [f32]) {
                dst[..$n].copy_from_slice(&self.to_array());
            }

            #[inline]
            fn lane(self, i: usize) -> f32 {
                self.to_array()[i]
            }

            #[inline]
            fn min(self, other: Self) -> Self {
                <$t>::min(self, other)
            }

            #[inline]
            fn max(self, other: Self) -> Self {
                <$t>::max(self, other)
            }

            #[inline]
            fn abs(self) -> Self {
                <$t>::abs(self)
            }

            #[inline]
            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }

            #[inline]
            fn select_eq(a: Self, b: Self, if_eq: Self, otherwise: Self) -> Self {
                a.cmp_eq(b).blend(if_eq, otherwise)
            }
        }
    };
}

impl_real_for_wide!(f32x4, 4);
impl_real_for_wide!(f32x8, 8);

/// Bilinear blend of four corner values.
///
/// Corner order is `(0,0)`, `(1,0)`, `(0,1)`, `(1,1)`.
#[inline]
pub fn lerp2<T: Real>(x0: f32, x1: f32, x2: f32, x3: f32, u: T, v: T) -> T {
    let one = T::splat(1.0);
    (one - u) * (one - v) * T::splat(x0)
        + u * (one - v) * T::splat(x1)
        + (one - u) * v * T::splat(x2)
        + u * v * T::splat(x3)
}

// =============================================================================
// Vec3x
// =============================================================================

/// A 3-component vector whose components are [`Real`] batches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3x<T> {
    /// X component.
    pub x: T,
    /// Y component.
    pub y: T,
    /// Z component.
    pub z: T,
}

impl<T: Real> Vec3x<T> {
    /// Create a vector from components.
    #[inline]
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    #[inline]
    pub fn zero() -> Self {
        Self::new(T::splat(0.0), T::splat(0.0), T::splat(0.0))
    }

    /// Broadcast a scalar vector to every lane.
    #[inline]
    pub fn splat(v: &Vec3f) -> Self {
        Self::new(T::splat(v.x), T::splat(v.y), T::splat(v.z))
    }

    /// Extract lane `i` as a scalar vector.
    #[inline]
    pub fn lane(&self, i: usize) -> Vec3f {
        Vec3f::new(self.x.lane(i), self.y.lane(i), self.z.lane(i))
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Self) -> T {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Euclidean length.
    #[inline]
    pub fn length(&self) -> T {
        self.dot(self).sqrt()
    }

    /// Unit-length copy. Zero-length input yields non-finite lanes.
    #[inline]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        Self::new(self.x / len, self.y / len, self.z / len)
    }

    /// Scale every component by `s`.
    #[inline]
    pub fn scale(&self, s: T) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Linear interpolation `(1 - t) * a + t * b`.
    ///
    /// Exact at `t = 0` and `t = 1` for finite inputs.
    #[inline]
    pub fn lerp(a: &Self, b: &Self, t: T) -> Self {
        let s = T::splat(1.0) - t;
        Self::new(
            a.x * s + b.x * t,
            a.y * s + b.y * t,
            a.z * s + b.z * t,
        )
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(&self, other: &Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(&self, other: &Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }
}

impl Vec3x<f32> {
    /// Convert to the nalgebra vector type.
    #[inline]
    pub fn to_vector(self) -> Vec3f {
        Vec3f::new(self.x, self.y, self.z)
    }
}

impl From<Vec3f> for Vec3x<f32> {
    #[inline]
    fn from(v: Vec3f) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl<T: Real> Add for Vec3x<T> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T: Real> Sub for Vec3x<T> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<T: Real> Neg for Vec3x<T> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl<T: Real> Mul<T> for Vec3x<T> {
    type Output = Self;

    #[inline]
    fn mul(self, s: T) -> Self {
        self.scale(s)
    }
}
