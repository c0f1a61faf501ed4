use std::marker::PhantomData;

use crate::register::SimdRegister;

/// Something that can supply a register for every `(major, index)` slot of a
/// grid with major order `O` being mutated.
///
/// Returning `None` means the source does not cover that slot (for example a
/// smaller matrix, or a vector with fewer registers than the subject). How a
/// missing slot is treated is decided by the [`Neutral`] policy the operand
/// is wrapped with, not by the source.
///
/// Registers and scalars are sources for every order. A fast matrix is only a
/// source for grids of its own major order, so element-wise work between a
/// column-major and a row-major matrix does not type-check.
pub trait RegisterSource<R: SimdRegister, O> {
    fn register_at(&self, major: usize, index: usize) -> Option<R>;

    /// Logical lanes of the register at `(major, index)`. Lanes past this
    /// count are replaced by the policy's neutral value before a kernel sees
    /// them.
    fn valid_lanes_at(&self, _major: usize, _index: usize) -> usize {
        R::LANES
    }
}

/// A raw register is broadcast to every slot.
impl<R: SimdRegister, O> RegisterSource<R, O> for R {
    #[inline]
    fn register_at(&self, _major: usize, _index: usize) -> Option<R> {
        Some(*self)
    }
}

macro_rules! scalar_sources {
    ($($t:ty => [$($lanes:literal),*]),* $(,)?) => {
        $($(
            impl<O> RegisterSource<std::simd::Simd<$t, $lanes>, O> for $t {
                #[inline]
                fn register_at(&self, _major: usize, _index: usize) -> Option<std::simd::Simd<$t, $lanes>> {
                    Some(std::simd::Simd::splat(*self))
                }
            }
        )*)*
    };
}

scalar_sources! {
    f32 => [4, 8, 16],
    f64 => [2, 4, 8],
    i8 => [16, 32, 64],
    i16 => [8, 16, 32],
    i32 => [4, 8, 16],
    i64 => [2, 4, 8],
    u8 => [16, 32, 64],
    u16 => [8, 16, 32],
    u32 => [4, 8, 16],
    u64 => [2, 4, 8],
}

/// Policy deciding what a kernel receives for a slot, or part of a slot, the
/// operand does not cover.
pub trait Neutral {
    type Resolved<R: SimdRegister>: Copy;

    fn resolve<R: SimdRegister>(found: Option<R>, valid_lanes: usize) -> Self::Resolved<R>;
}

/// Uncovered lanes read as zero (add-like operations).
pub struct ZeroFill;

/// Uncovered lanes read as one (multiply-like operations).
pub struct OneFill;

/// Uncovered slots reach the kernel as `None`, partially covered ones as a
/// [`Present`] that knows which lanes are real.
pub struct KeepAbsent;

impl Neutral for ZeroFill {
    type Resolved<R: SimdRegister> = R;

    #[inline]
    fn resolve<R: SimdRegister>(found: Option<R>, valid_lanes: usize) -> R {
        found.map_or_else(R::zero, |reg| reg.keep_lanes(valid_lanes, R::zero()))
    }
}

impl Neutral for OneFill {
    type Resolved<R: SimdRegister> = R;

    #[inline]
    fn resolve<R: SimdRegister>(found: Option<R>, valid_lanes: usize) -> R {
        found.map_or_else(R::one, |reg| reg.keep_lanes(valid_lanes, R::one()))
    }
}

impl Neutral for KeepAbsent {
    type Resolved<R: SimdRegister> = Option<Present<R>>;

    #[inline]
    fn resolve<R: SimdRegister>(found: Option<R>, valid_lanes: usize) -> Option<Present<R>> {
        found.map(|register| Present {
            register,
            valid_lanes,
        })
    }
}

/// An operand register together with the number of lanes it really covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Present<R> {
    register: R,
    valid_lanes: usize,
}

impl<R: SimdRegister> Present<R> {
    pub fn register(&self) -> R {
        self.register
    }

    pub fn valid_lanes(&self) -> usize {
        self.valid_lanes
    }

    /// Computes `f(current, operand)` on the covered lanes and keeps
    /// `current` on the rest. Uncovered operand lanes are set to `fill`
    /// before `f` runs, so `f` never sees stale shadow data.
    #[inline]
    pub fn apply(self, current: R, fill: R, f: impl FnOnce(R, R) -> R) -> R {
        let operand = self.register.keep_lanes(self.valid_lanes, fill);
        f(current, operand).keep_lanes(self.valid_lanes, current)
    }
}

/// An operand paired with its neutral policy.
pub struct With<'a, S: ?Sized, N> {
    source: &'a S,
    policy: PhantomData<N>,
}

impl<S: ?Sized, N> Clone for With<'_, S, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized, N> Copy for With<'_, S, N> {}

impl<'a, S: ?Sized> With<'a, S, ZeroFill> {
    pub fn zeroed(source: &'a S) -> Self {
        With {
            source,
            policy: PhantomData,
        }
    }
}

impl<'a, S: ?Sized> With<'a, S, OneFill> {
    pub fn ones(source: &'a S) -> Self {
        With {
            source,
            policy: PhantomData,
        }
    }
}

impl<'a, S: ?Sized> With<'a, S, KeepAbsent> {
    pub fn optional(source: &'a S) -> Self {
        With {
            source,
            policy: PhantomData,
        }
    }
}

impl<S: ?Sized, N: Neutral> With<'_, S, N> {
    #[inline]
    fn fetch<R: SimdRegister, O>(&self, major: usize, index: usize) -> N::Resolved<R>
    where
        S: RegisterSource<R, O>,
    {
        N::resolve(
            <S as RegisterSource<R, O>>::register_at(self.source, major, index),
            <S as RegisterSource<R, O>>::valid_lanes_at(self.source, major, index),
        )
    }
}

/// Zero or more operands resolved together for each register slot.
///
/// Implemented for `()` and for tuples of one to three [`With`] operands; the
/// kernel receives the matching tuple of resolved registers.
pub trait OperandPack<R: SimdRegister, O> {
    type Fetched;

    fn fetch(&self, major: usize, index: usize) -> Self::Fetched;
}

impl<R: SimdRegister, O> OperandPack<R, O> for () {
    type Fetched = ();

    #[inline]
    fn fetch(&self, _major: usize, _index: usize) {}
}

impl<R, O, A, NA> OperandPack<R, O> for (With<'_, A, NA>,)
where
    R: SimdRegister,
    A: RegisterSource<R, O> + ?Sized,
    NA: Neutral,
{
    type Fetched = (NA::Resolved<R>,);

    #[inline]
    fn fetch(&self, major: usize, index: usize) -> Self::Fetched {
        (self.0.fetch::<R, O>(major, index),)
    }
}

impl<R, O, A, NA, B, NB> OperandPack<R, O> for (With<'_, A, NA>, With<'_, B, NB>)
where
    R: SimdRegister,
    A: RegisterSource<R, O> + ?Sized,
    NA: Neutral,
    B: RegisterSource<R, O> + ?Sized,
    NB: Neutral,
{
    type Fetched = (NA::Resolved<R>, NB::Resolved<R>);

    #[inline]
    fn fetch(&self, major: usize, index: usize) -> Self::Fetched {
        (self.0.fetch::<R, O>(major, index), self.1.fetch::<R, O>(major, index))
    }
}

impl<R, O, A, NA, B, NB, C, NC> OperandPack<R, O> for (With<'_, A, NA>, With<'_, B, NB>, With<'_, C, NC>)
where
    R: SimdRegister,
    A: RegisterSource<R, O> + ?Sized,
    NA: Neutral,
    B: RegisterSource<R, O> + ?Sized,
    NB: Neutral,
    C: RegisterSource<R, O> + ?Sized,
    NC: Neutral,
{
    type Fetched = (NA::Resolved<R>, NB::Resolved<R>, NC::Resolved<R>);

    #[inline]
    fn fetch(&self, major: usize, index: usize) -> Self::Fetched {
        (
            self.0.fetch::<R, O>(major, index),
            self.1.fetch::<R, O>(major, index),
            self.2.fetch::<R, O>(major, index),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Linear;
    use crate::register::f32x4;

    #[test]
    fn scalars_and_registers_cover_every_slot() {
        let scalar = 2.5f32;
        let from_scalar = RegisterSource::<f32x4, Linear>::register_at(&scalar, 7, 3);
        assert_eq!(from_scalar, Some(f32x4::splat(2.5)));

        let reg = f32x4::from_array([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(RegisterSource::<f32x4, Linear>::register_at(&reg, 0, 99), Some(reg));
    }

    struct Sparse;

    impl<O> RegisterSource<f32x4, O> for Sparse {
        fn register_at(&self, major: usize, _index: usize) -> Option<f32x4> {
            (major == 0).then(|| f32x4::splat(5.0))
        }

        fn valid_lanes_at(&self, _major: usize, _index: usize) -> usize {
            3
        }
    }

    #[test]
    fn neutral_policies_resolve_missing_slots() {
        let pack = (
            With::zeroed(&Sparse),
            With::ones(&Sparse),
            With::optional(&Sparse),
        );
        let (z, o, a) = OperandPack::<f32x4, Linear>::fetch(&pack, 1, 0);
        assert_eq!(z, f32x4::splat(0.0));
        assert_eq!(o, f32x4::splat(1.0));
        assert_eq!(a, None);

        let (z, o, a) = OperandPack::<f32x4, Linear>::fetch(&pack, 0, 0);
        assert_eq!(z.to_array(), [5.0, 5.0, 5.0, 0.0]);
        assert_eq!(o.to_array(), [5.0, 5.0, 5.0, 1.0]);
        let present = a.expect("major 0 is covered");
        assert_eq!(present.valid_lanes(), 3);
    }

    #[test]
    fn present_keeps_current_on_uncovered_lanes() {
        let present = Present {
            register: f32x4::from_array([2.0, 2.0, 0.0, 0.0]),
            valid_lanes: 2,
        };
        let current = f32x4::from_array([8.0, 6.0, 4.0, 2.0]);
        let out = present.apply(current, f32x4::splat(1.0), |a, b| a / b);
        assert_eq!(out.to_array(), [4.0, 3.0, 4.0, 2.0]);
    }
}
