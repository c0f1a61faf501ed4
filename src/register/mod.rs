//! SIMD register capabilities.
//!
//! Every fast vector and fast matrix is generic over a single register type
//! `R: SimdRegister`. The register type fixes both the element type and the
//! physical register width, so mixing widths or element types between two
//! operands is rejected by the type checker instead of at runtime.

mod element;
pub mod layout;
pub mod shuffle;

use std::{
    fmt::Debug,
    ops::{Add, AddAssign, Div, Mul, MulAssign, Rem, Sub, SubAssign},
    simd::{
        Simd, StdFloat,
        cmp::SimdOrd,
        num::{SimdFloat, SimdInt, SimdUint},
    },
};

use serde::Serialize;

pub use element::{Element, ElementKind};
pub use layout::RegisterLayout;
pub use std::simd::{
    f32x4, f32x8, f32x16, f64x2, f64x4, f64x8, i8x16, i8x32, i8x64, i16x8, i16x16, i16x32, i32x4,
    i32x8, i32x16, i64x2, i64x4, i64x8, u8x16, u8x32, u8x64, u16x8, u16x16, u16x32, u32x4, u32x8,
    u32x16, u64x2, u64x4, u64x8,
};

/// Physical width of a SIMD register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegisterWidth {
    #[serde(rename = "128")]
    W128,
    #[serde(rename = "256")]
    W256,
    #[serde(rename = "512")]
    W512,
}

impl RegisterWidth {
    pub const fn bits(self) -> usize {
        match self {
            RegisterWidth::W128 => 128,
            RegisterWidth::W256 => 256,
            RegisterWidth::W512 => 512,
        }
    }
}

/// A fixed-width SIMD register holding `LANES` elements of one [`Element`] type.
///
/// Implemented for every `std::simd::Simd<T, LANES>` whose total width is 128,
/// 256 or 512 bits. Operations that differ between floats and integers
/// (rounding, `abs`, fused multiply-add) have a single meaning here: rounding
/// is the identity on integer lanes, `abs` is the identity on unsigned lanes,
/// and `mul_add` on integer lanes is an unfused `a * b + c`.
pub trait SimdRegister:
    Copy
    + Debug
    + PartialEq
    + Default
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Rem<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
{
    type Element: Element;

    const LANES: usize;
    const WIDTH: RegisterWidth;

    fn splat(value: Self::Element) -> Self;

    #[inline]
    fn zero() -> Self {
        Self::splat(<Self::Element as num_traits::Zero>::zero())
    }

    #[inline]
    fn one() -> Self {
        Self::splat(<Self::Element as num_traits::One>::one())
    }

    /// Loads `LANES` elements from the front of `src`.
    ///
    /// # Panics
    /// Panics if `src` holds fewer than `LANES` elements.
    fn from_slice(src: &[Self::Element]) -> Self;

    /// Loads up to `LANES` elements from the front of `src`, zero-filling the
    /// lanes `src` does not cover.
    fn from_slice_or_zero(src: &[Self::Element]) -> Self;

    /// Writes all `LANES` elements to the front of `dst`.
    ///
    /// # Panics
    /// Panics if `dst` holds fewer than `LANES` elements.
    fn write_to_slice(self, dst: &mut [Self::Element]);

    /// Reads a single lane.
    ///
    /// # Panics
    /// Panics if `lane >= LANES`.
    fn lane(self, lane: usize) -> Self::Element;

    /// Returns a copy with one lane replaced.
    ///
    /// # Panics
    /// Panics if `lane >= LANES`.
    fn with_lane(self, lane: usize, value: Self::Element) -> Self;

    /// Keeps the first `valid` lanes and takes every other lane from `fill`.
    fn keep_lanes(self, valid: usize, fill: Self) -> Self;

    /// `self * a + b`, fused where the hardware supports it.
    fn mul_add(self, a: Self, b: Self) -> Self;

    /// Lane-wise negation; wraps on unsigned lanes.
    fn negate(self) -> Self;

    fn simd_min(self, other: Self) -> Self;
    fn simd_max(self, other: Self) -> Self;
    fn abs(self) -> Self;
    fn floor(self) -> Self;
    fn ceil(self) -> Self;
    fn trunc(self) -> Self;
    fn round(self) -> Self;

    fn reduce_sum(self) -> Self::Element;
    fn reduce_min(self) -> Self::Element;
    fn reduce_max(self) -> Self::Element;
}

macro_rules! impl_register_common {
    ($t:ty, $lanes:literal, $width:ident) => {
        type Element = $t;

        const LANES: usize = $lanes;
        const WIDTH: RegisterWidth = RegisterWidth::$width;

        #[inline]
        fn splat(value: $t) -> Self {
            Simd::splat(value)
        }

        #[inline]
        fn from_slice(src: &[$t]) -> Self {
            Simd::from_slice(src)
        }

        #[inline]
        fn from_slice_or_zero(src: &[$t]) -> Self {
            Simd::load_or_default(src)
        }

        #[inline]
        fn write_to_slice(self, dst: &mut [$t]) {
            self.copy_to_slice(dst)
        }

        #[inline]
        fn lane(self, lane: usize) -> $t {
            self[lane]
        }

        #[inline]
        fn with_lane(mut self, lane: usize, value: $t) -> Self {
            self[lane] = value;
            self
        }

        #[inline]
        fn keep_lanes(self, valid: usize, fill: Self) -> Self {
            if valid >= $lanes {
                return self;
            }
            let mut lanes = fill.to_array();
            lanes[..valid].copy_from_slice(&self.as_array()[..valid]);
            Simd::from_array(lanes)
        }
    };
}

macro_rules! impl_float_register {
    ($t:ty; $($lanes:literal => $width:ident),*) => {
        $(
            impl SimdRegister for Simd<$t, $lanes> {
                impl_register_common!($t, $lanes, $width);

                #[inline]
                fn mul_add(self, a: Self, b: Self) -> Self {
                    StdFloat::mul_add(self, a, b)
                }

                #[inline]
                fn negate(self) -> Self {
                    -self
                }

                #[inline]
                fn simd_min(self, other: Self) -> Self {
                    SimdFloat::simd_min(self, other)
                }

                #[inline]
                fn simd_max(self, other: Self) -> Self {
                    SimdFloat::simd_max(self, other)
                }

                #[inline]
                fn abs(self) -> Self {
                    SimdFloat::abs(self)
                }

                #[inline]
                fn floor(self) -> Self {
                    StdFloat::floor(self)
                }

                #[inline]
                fn ceil(self) -> Self {
                    StdFloat::ceil(self)
                }

                #[inline]
                fn trunc(self) -> Self {
                    StdFloat::trunc(self)
                }

                #[inline]
                fn round(self) -> Self {
                    StdFloat::round(self)
                }

                #[inline]
                fn reduce_sum(self) -> $t {
                    SimdFloat::reduce_sum(self)
                }

                #[inline]
                fn reduce_min(self) -> $t {
                    SimdFloat::reduce_min(self)
                }

                #[inline]
                fn reduce_max(self) -> $t {
                    SimdFloat::reduce_max(self)
                }
            }
        )*
    };
}

macro_rules! impl_integer_register {
    ($t:ty, $num:ident, $abs:expr, $neg:expr; $($lanes:literal => $width:ident),*) => {
        $(
            impl SimdRegister for Simd<$t, $lanes> {
                impl_register_common!($t, $lanes, $width);

                #[inline]
                fn mul_add(self, a: Self, b: Self) -> Self {
                    self * a + b
                }

                #[inline]
                fn negate(self) -> Self {
                    let neg: fn(Self) -> Self = $neg;
                    neg(self)
                }

                #[inline]
                fn simd_min(self, other: Self) -> Self {
                    SimdOrd::simd_min(self, other)
                }

                #[inline]
                fn simd_max(self, other: Self) -> Self {
                    SimdOrd::simd_max(self, other)
                }

                #[inline]
                fn abs(self) -> Self {
                    let abs: fn(Self) -> Self = $abs;
                    abs(self)
                }

                #[inline]
                fn floor(self) -> Self {
                    self
                }

                #[inline]
                fn ceil(self) -> Self {
                    self
                }

                #[inline]
                fn trunc(self) -> Self {
                    self
                }

                #[inline]
                fn round(self) -> Self {
                    self
                }

                #[inline]
                fn reduce_sum(self) -> $t {
                    $num::reduce_sum(self)
                }

                #[inline]
                fn reduce_min(self) -> $t {
                    $num::reduce_min(self)
                }

                #[inline]
                fn reduce_max(self) -> $t {
                    $num::reduce_max(self)
                }
            }
        )*
    };
}

impl_float_register!(f32; 4 => W128, 8 => W256, 16 => W512);
impl_float_register!(f64; 2 => W128, 4 => W256, 8 => W512);

impl_integer_register!(i8, SimdInt, SimdInt::abs, |v| -v; 16 => W128, 32 => W256, 64 => W512);
impl_integer_register!(i16, SimdInt, SimdInt::abs, |v| -v; 8 => W128, 16 => W256, 32 => W512);
impl_integer_register!(i32, SimdInt, SimdInt::abs, |v| -v; 4 => W128, 8 => W256, 16 => W512);
impl_integer_register!(i64, SimdInt, SimdInt::abs, |v| -v; 2 => W128, 4 => W256, 8 => W512);

impl_integer_register!(u8, SimdUint, |v| v, |v| Simd::splat(0) - v; 16 => W128, 32 => W256, 64 => W512);
impl_integer_register!(u16, SimdUint, |v| v, |v| Simd::splat(0) - v; 8 => W128, 16 => W256, 32 => W512);
impl_integer_register!(u32, SimdUint, |v| v, |v| Simd::splat(0) - v; 4 => W128, 8 => W256, 16 => W512);
impl_integer_register!(u64, SimdUint, |v| v, |v| Simd::splat(0) - v; 2 => W128, 4 => W256, 8 => W512);
