use std::{
    fmt::Debug,
    ops::{Add, Div, Mul, Sub},
    simd::SimdElement,
};

use num_traits::{NumCast, One, ToPrimitive, Zero};
use serde::Serialize;

/// Identifies the primitive stored in each lane of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl ElementKind {
    /// Width of one element in bits.
    pub const fn bits(self) -> usize {
        match self {
            ElementKind::I8 | ElementKind::U8 => 8,
            ElementKind::I16 | ElementKind::U16 => 16,
            ElementKind::F32 | ElementKind::I32 | ElementKind::U32 => 32,
            ElementKind::F64 | ElementKind::I64 | ElementKind::U64 => 64,
        }
    }
}

/// A fixed-width arithmetic primitive that can live in a SIMD lane.
///
/// Only the ten primitives `std::simd` vectorizes implement this trait. The
/// associated constants give the neutral elements that masked reductions use
/// to neutralize shadow lanes: [`Element::HIGHEST`] for a `min` reduction and
/// [`Element::LOWEST`] for a `max` reduction.
pub trait Element:
    SimdElement
    + Copy
    + Default
    + Debug
    + PartialEq
    + PartialOrd
    + NumCast
    + ToPrimitive
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Send
    + Sync
    + 'static
{
    const KIND: ElementKind;
    const LOWEST: Self;
    const HIGHEST: Self;

    /// Converts from any other element, falling back to zero when the value
    /// is not representable (e.g. a negative float into an unsigned lane).
    #[inline]
    fn convert_from<U: Element>(value: U) -> Self {
        <Self as NumCast>::from(value).unwrap_or_else(Self::zero)
    }
}

macro_rules! impl_element {
    ($($t:ty => $kind:ident, $lowest:expr, $highest:expr;)*) => {
        $(
            impl Element for $t {
                const KIND: ElementKind = ElementKind::$kind;
                const LOWEST: Self = $lowest;
                const HIGHEST: Self = $highest;
            }
        )*
    };
}

impl_element! {
    f32 => F32, f32::NEG_INFINITY, f32::INFINITY;
    f64 => F64, f64::NEG_INFINITY, f64::INFINITY;
    i8 => I8, i8::MIN, i8::MAX;
    i16 => I16, i16::MIN, i16::MAX;
    i32 => I32, i32::MIN, i32::MAX;
    i64 => I64, i64::MIN, i64::MAX;
    u8 => U8, u8::MIN, u8::MAX;
    u16 => U16, u16::MIN, u16::MAX;
    u32 => U32, u32::MIN, u32::MAX;
    u64 => U64, u64::MIN, u64::MAX;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_match_size_of() {
        assert_eq!(f32::KIND.bits(), 8 * size_of::<f32>());
        assert_eq!(f64::KIND.bits(), 8 * size_of::<f64>());
        assert_eq!(i8::KIND.bits(), 8 * size_of::<i8>());
        assert_eq!(u16::KIND.bits(), 8 * size_of::<u16>());
        assert_eq!(i64::KIND.bits(), 8 * size_of::<i64>());
    }

    #[test]
    fn convert_from_saturates_to_zero_on_unrepresentable() {
        assert_eq!(u8::convert_from(-3.0f32), 0);
        assert_eq!(u8::convert_from(200.7f32), 200);
        assert_eq!(f32::convert_from(7u64), 7.0);
        assert_eq!(i16::convert_from(1e9f64), 0);
    }

    #[test]
    fn neutral_bounds_are_extremes() {
        assert!(f32::LOWEST < f32::MIN);
        assert!(f32::HIGHEST > f32::MAX);
        assert_eq!(i32::LOWEST, i32::MIN);
        assert_eq!(u8::HIGHEST, 255);
    }
}
