//! Element-wise arithmetic shared by fast vectors and fast matrices.
//!
//! Every operation here is one kernel handed to the [`Mutate`] walker. Binary
//! operations accept any [`RegisterSource`] for the subject's major order: a
//! value of the same shape, a smaller or larger one, a raw register, or a
//! scalar. Lanes the operand does not cover are left as they were.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign};

use crate::mutation::{Mutate, RegisterGrid, RegisterSource, With};
use crate::order::MajorOrder;
use crate::register::{Element, SimdRegister};
use crate::{FastMatrix, FastVector};

type Reg<G> = <G as RegisterGrid>::Register;
type Elem<G> = <<G as RegisterGrid>::Register as SimdRegister>::Element;

#[inline]
fn scalar_min<T: Element>(a: T, b: T) -> T {
    if b < a { b } else { a }
}

#[inline]
fn scalar_max<T: Element>(a: T, b: T) -> T {
    if b > a { b } else { a }
}

pub trait Elementwise: Mutate {
    #[inline]
    fn basic_add<S>(&self, rhs: &S) -> Self
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate((With::zeroed(rhs),), |a, (b,)| a + b)
    }

    #[inline]
    fn basic_add_assign<S>(&mut self, rhs: &S)
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate_assign((With::zeroed(rhs),), |a, (b,)| a + b)
    }

    #[inline]
    fn basic_sub<S>(&self, rhs: &S) -> Self
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate((With::zeroed(rhs),), |a, (b,)| a - b)
    }

    #[inline]
    fn basic_sub_assign<S>(&mut self, rhs: &S)
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate_assign((With::zeroed(rhs),), |a, (b,)| a - b)
    }

    /// Element-wise (Hadamard) product.
    #[inline]
    fn basic_mul<S>(&self, rhs: &S) -> Self
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate((With::ones(rhs),), |a, (b,)| a * b)
    }

    #[inline]
    fn basic_mul_assign<S>(&mut self, rhs: &S)
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate_assign((With::ones(rhs),), |a, (b,)| a * b)
    }

    /// Element-wise division. Shadow lanes of the subject are divided by one,
    /// so integer lanes never trap on data that is not logically there.
    #[inline]
    fn basic_div<S>(&self, rhs: &S) -> Self
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        let mut out = *self;
        out.basic_div_assign(rhs);
        out
    }

    #[inline]
    fn basic_div_assign<S>(&mut self, rhs: &S)
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        let one = <Reg<Self> as SimdRegister>::one();
        self.mutate_at_assign((With::optional(rhs),), |pos, a, (b,)| match b {
            Some(b) => b.apply(a, one, |a, b| a / pos.mask_shadow(b, one)),
            None => a,
        })
    }

    #[inline]
    fn basic_rem<S>(&self, rhs: &S) -> Self
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        let mut out = *self;
        out.basic_rem_assign(rhs);
        out
    }

    #[inline]
    fn basic_rem_assign<S>(&mut self, rhs: &S)
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        let one = <Reg<Self> as SimdRegister>::one();
        self.mutate_at_assign((With::optional(rhs),), |pos, a, (b,)| match b {
            Some(b) => b.apply(a, one, |a, b| a % pos.mask_shadow(b, one)),
            None => a,
        })
    }

    /// `self * b + c`, fused for float registers.
    #[inline]
    fn basic_fmadd<B, C>(&self, b: &B, c: &C) -> Self
    where
        B: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
        C: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate((With::ones(b), With::zeroed(c)), |a, (b, c)| a.mul_add(b, c))
    }

    #[inline]
    fn basic_fmadd_assign<B, C>(&mut self, b: &B, c: &C)
    where
        B: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
        C: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate_assign((With::ones(b), With::zeroed(c)), |a, (b, c)| a.mul_add(b, c))
    }

    /// `self * b - c`, fused for float registers.
    #[inline]
    fn basic_fmsub<B, C>(&self, b: &B, c: &C) -> Self
    where
        B: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
        C: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate((With::ones(b), With::zeroed(c)), |a, (b, c)| {
            a.mul_add(b, c.negate())
        })
    }

    #[inline]
    fn basic_fmsub_assign<B, C>(&mut self, b: &B, c: &C)
    where
        B: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
        C: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate_assign((With::ones(b), With::zeroed(c)), |a, (b, c)| {
            a.mul_add(b, c.negate())
        })
    }

    #[inline]
    fn negate(&self) -> Self {
        self.mutate((), |a, ()| a.negate())
    }

    #[inline]
    fn negate_assign(&mut self) {
        self.mutate_assign((), |a, ()| a.negate())
    }

    #[inline]
    fn abs(&self) -> Self {
        self.mutate((), |a, ()| a.abs())
    }

    #[inline]
    fn abs_assign(&mut self) {
        self.mutate_assign((), |a, ()| a.abs())
    }

    /// Rounds toward negative infinity. The identity on integer elements, as
    /// are the other rounding operations.
    #[inline]
    fn floor(&self) -> Self {
        self.mutate((), |a, ()| a.floor())
    }

    #[inline]
    fn floor_assign(&mut self) {
        self.mutate_assign((), |a, ()| a.floor())
    }

    #[inline]
    fn ceil(&self) -> Self {
        self.mutate((), |a, ()| a.ceil())
    }

    #[inline]
    fn ceil_assign(&mut self) {
        self.mutate_assign((), |a, ()| a.ceil())
    }

    #[inline]
    fn trunc(&self) -> Self {
        self.mutate((), |a, ()| a.trunc())
    }

    #[inline]
    fn trunc_assign(&mut self) {
        self.mutate_assign((), |a, ()| a.trunc())
    }

    /// Rounds half away from zero.
    #[inline]
    fn round(&self) -> Self {
        self.mutate((), |a, ()| a.round())
    }

    #[inline]
    fn round_assign(&mut self) {
        self.mutate_assign((), |a, ()| a.round())
    }

    /// Pairwise minimum.
    #[inline]
    fn basic_min<S>(&self, rhs: &S) -> Self
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate((With::optional(rhs),), |a, (b,)| match b {
            Some(b) => b.apply(a, a, |a, b| a.simd_min(b)),
            None => a,
        })
    }

    /// Pairwise maximum.
    #[inline]
    fn basic_max<S>(&self, rhs: &S) -> Self
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate((With::optional(rhs),), |a, (b,)| match b {
            Some(b) => b.apply(a, a, |a, b| a.simd_max(b)),
            None => a,
        })
    }

    /// Sum of the logical elements. Integer sums wrap.
    #[inline]
    fn horizontal_sum(&self) -> Elem<Self> {
        let zero = <Reg<Self> as SimdRegister>::zero();
        self.fold_masked(zero, zero, |acc, reg| acc + reg).reduce_sum()
    }

    /// Smallest logical element.
    #[inline]
    fn horizontal_min(&self) -> Elem<Self> {
        let highest = <Elem<Self> as Element>::HIGHEST;
        self.fold_masked(<Reg<Self> as SimdRegister>::splat(highest), highest, |acc, reg| {
            scalar_min(acc, reg.reduce_min())
        })
    }

    /// Largest logical element.
    #[inline]
    fn horizontal_max(&self) -> Elem<Self> {
        let lowest = <Elem<Self> as Element>::LOWEST;
        self.fold_masked(<Reg<Self> as SimdRegister>::splat(lowest), lowest, |acc, reg| {
            scalar_max(acc, reg.reduce_max())
        })
    }

    /// The smallest logical element broadcast to every lane.
    #[inline]
    fn min_broadcast(&self) -> Self {
        let min = <Reg<Self> as SimdRegister>::splat(self.horizontal_min());
        self.mutate((), |_, ()| min)
    }

    /// The largest logical element broadcast to every lane.
    #[inline]
    fn max_broadcast(&self) -> Self {
        let max = <Reg<Self> as SimdRegister>::splat(self.horizontal_max());
        self.mutate((), |_, ()| max)
    }

    /// Raises every element to at least `lo`.
    #[inline]
    fn clamp_min<S>(&self, lo: &S) -> Self
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.basic_max(lo)
    }

    /// Lowers every element to at most `hi`.
    #[inline]
    fn clamp_max<S>(&self, hi: &S) -> Self
    where
        S: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.basic_min(hi)
    }

    #[inline]
    fn clamp<L, H>(&self, lo: &L, hi: &H) -> Self
    where
        L: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
        H: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.basic_max(lo).basic_min(hi)
    }

    /// `self + t * (b - self)`.
    #[inline]
    fn lerp<B, T>(&self, b: &B, t: &T) -> Self
    where
        B: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
        T: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate((With::optional(b), With::zeroed(t)), |a, (b, t)| match b {
            Some(b) => b.apply(a, a, |a, b| a + t * (b - a)),
            None => a,
        })
    }

    /// [`Elementwise::lerp`] with the final multiply-add fused.
    #[inline]
    fn fused_lerp<B, T>(&self, b: &B, t: &T) -> Self
    where
        B: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
        T: RegisterSource<Reg<Self>, Self::Order> + ?Sized,
    {
        self.mutate((With::optional(b), With::zeroed(t)), |a, (b, t)| match b {
            Some(b) => b.apply(a, a, |a, b| t.mul_add(b - a, a)),
            None => a,
        })
    }
}

impl<G: Mutate> Elementwise for G {}

macro_rules! impl_operators {
    ([$($generics:tt)*] $subject:ty) => {
        impl<$($generics)*, S> Add<S> for $subject
        where
            S: RegisterSource<Reg<$subject>, <$subject as RegisterGrid>::Order>,
        {
            type Output = Self;

            #[inline]
            fn add(self, rhs: S) -> Self {
                self.basic_add(&rhs)
            }
        }

        impl<$($generics)*, S> AddAssign<S> for $subject
        where
            S: RegisterSource<Reg<$subject>, <$subject as RegisterGrid>::Order>,
        {
            #[inline]
            fn add_assign(&mut self, rhs: S) {
                self.basic_add_assign(&rhs)
            }
        }

        impl<$($generics)*, S> Sub<S> for $subject
        where
            S: RegisterSource<Reg<$subject>, <$subject as RegisterGrid>::Order>,
        {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: S) -> Self {
                self.basic_sub(&rhs)
            }
        }

        impl<$($generics)*, S> SubAssign<S> for $subject
        where
            S: RegisterSource<Reg<$subject>, <$subject as RegisterGrid>::Order>,
        {
            #[inline]
            fn sub_assign(&mut self, rhs: S) {
                self.basic_sub_assign(&rhs)
            }
        }

        /// Element-wise; standard matrix multiplication is `multiply`.
        impl<$($generics)*, S> Mul<S> for $subject
        where
            S: RegisterSource<Reg<$subject>, <$subject as RegisterGrid>::Order>,
        {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: S) -> Self {
                self.basic_mul(&rhs)
            }
        }

        impl<$($generics)*, S> MulAssign<S> for $subject
        where
            S: RegisterSource<Reg<$subject>, <$subject as RegisterGrid>::Order>,
        {
            #[inline]
            fn mul_assign(&mut self, rhs: S) {
                self.basic_mul_assign(&rhs)
            }
        }

        impl<$($generics)*, S> Div<S> for $subject
        where
            S: RegisterSource<Reg<$subject>, <$subject as RegisterGrid>::Order>,
        {
            type Output = Self;

            #[inline]
            fn div(self, rhs: S) -> Self {
                self.basic_div(&rhs)
            }
        }

        impl<$($generics)*, S> DivAssign<S> for $subject
        where
            S: RegisterSource<Reg<$subject>, <$subject as RegisterGrid>::Order>,
        {
            #[inline]
            fn div_assign(&mut self, rhs: S) {
                self.basic_div_assign(&rhs)
            }
        }

        impl<$($generics)*, S> Rem<S> for $subject
        where
            S: RegisterSource<Reg<$subject>, <$subject as RegisterGrid>::Order>,
        {
            type Output = Self;

            #[inline]
            fn rem(self, rhs: S) -> Self {
                self.basic_rem(&rhs)
            }
        }

        impl<$($generics)*, S> RemAssign<S> for $subject
        where
            S: RegisterSource<Reg<$subject>, <$subject as RegisterGrid>::Order>,
        {
            #[inline]
            fn rem_assign(&mut self, rhs: S) {
                self.basic_rem_assign(&rhs)
            }
        }

        impl<$($generics)*> Neg for $subject {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                Elementwise::negate(&self)
            }
        }
    };
}

impl_operators!([R: SimdRegister, const N: usize, const REGS: usize] FastVector<R, N, REGS>);
impl_operators!(
    [R: SimdRegister, const MAJORS: usize, const MINORS: usize, const REGS: usize, O: MajorOrder]
    FastMatrix<R, MAJORS, MINORS, REGS, O>
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::{f32x4, f64x2, i32x4, u8x16};

    type V6 = FastVector<f32x4, 6, 2>;

    fn v6(values: [f32; 6]) -> V6 {
        V6::from_elements(values)
    }

    #[test]
    fn operators_against_vectors_registers_and_scalars() {
        let a = v6([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = V6::splat(2.0);
        assert_eq!((a + b).to_vec(), vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!((a - 1.0f32).to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!((a * f32x4::splat(3.0)).to_vec(), vec![3.0, 6.0, 9.0, 12.0, 15.0, 18.0]);
        assert_eq!((a / b).to_vec(), vec![0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);
        assert_eq!((a % 4.0f32).to_vec(), vec![1.0, 2.0, 3.0, 0.0, 1.0, 2.0]);
        assert_eq!((-a).to_vec(), vec![-1.0, -2.0, -3.0, -4.0, -5.0, -6.0]);

        let mut c = a;
        c += b;
        c *= 2.0f32;
        c -= a;
        c /= 2.0f32;
        assert_eq!(c.to_vec(), vec![2.5, 3.0, 3.5, 4.0, 4.5, 5.0]);
    }

    #[test]
    fn shorter_operands_leave_uncovered_lanes_alone() {
        let a = FastVector::<i32x4, 7, 2>::from_fn(|i| i as i32 + 10);
        let short = FastVector::<i32x4, 3, 1>::from_elements([1, 2, 3]);
        assert_eq!((a + short).to_vec(), vec![11, 13, 15, 13, 14, 15, 16]);
        assert_eq!((a * short).to_vec(), vec![10, 22, 36, 13, 14, 15, 16]);
        assert_eq!((a / short).to_vec(), vec![10, 5, 4, 13, 14, 15, 16]);
        assert_eq!(a.basic_min(&short).to_vec(), vec![1, 2, 3, 13, 14, 15, 16]);
    }

    #[test]
    fn integer_division_never_traps_on_shadow_lanes() {
        let a = FastVector::<u8x16, 5, 1>::from_elements([10, 20, 30, 40, 50]);
        let b = FastVector::<u8x16, 5, 1>::from_elements([2, 4, 5, 8, 10]);
        assert_eq!((a / b).to_vec(), vec![5, 5, 6, 5, 5]);
        assert_eq!((a % b).to_vec(), vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn fused_forms() {
        let a = v6([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = V6::splat(2.0);
        let c = V6::splat(0.5);
        assert_eq!(
            a.basic_fmadd(&b, &c).to_vec(),
            vec![2.5, 4.5, 6.5, 8.5, 10.5, 12.5]
        );
        let mut d = a;
        d.basic_fmsub_assign(&b, &c);
        assert_eq!(d.to_vec(), vec![1.5, 3.5, 5.5, 7.5, 9.5, 11.5]);
    }

    #[test]
    fn unary_forms() {
        let a = FastVector::<f64x2, 3, 2>::from_elements([-1.5, 2.5, -0.4]);
        assert_eq!(Elementwise::abs(&a).to_vec(), vec![1.5, 2.5, 0.4]);
        assert_eq!(Elementwise::floor(&a).to_vec(), vec![-2.0, 2.0, -1.0]);
        assert_eq!(Elementwise::ceil(&a).to_vec(), vec![-1.0, 3.0, -0.0]);
        assert_eq!(Elementwise::trunc(&a).to_vec(), vec![-1.0, 2.0, -0.0]);
        assert_eq!(Elementwise::round(&a).to_vec(), vec![-2.0, 3.0, -0.0]);

        let mut ints = FastVector::<i32x4, 3, 1>::from_elements([-3, 4, -5]);
        ints.abs_assign();
        ints.round_assign();
        assert_eq!(ints.to_vec(), vec![3, 4, 5]);
    }

    #[test]
    fn reductions_ignore_dirty_shadow_lanes() {
        let mut a = FastVector::<i32x4, 6, 2>::from_elements([4, -2, 9, 1, 3, 5]);
        a.set_register(1, i32x4::from_array([3, 5, -100, 100]));
        assert_eq!(a.horizontal_sum(), 20);
        assert_eq!(a.horizontal_min(), -2);
        assert_eq!(a.horizontal_max(), 9);
        assert_eq!(a.min_broadcast().to_vec(), vec![-2; 6]);
        assert_eq!(a.max_broadcast().to_vec(), vec![9; 6]);
    }

    #[test]
    fn clamp_and_lerp() {
        let a = v6([-2.0, -1.0, 0.0, 1.0, 2.0, 3.0]);
        assert_eq!(
            a.clamp(&-1.0f32, &2.0f32).to_vec(),
            vec![-1.0, -1.0, 0.0, 1.0, 2.0, 2.0]
        );
        assert_eq!(a.clamp_min(&0.0f32).horizontal_min(), 0.0);
        assert_eq!(a.clamp_max(&0.0f32).horizontal_max(), 0.0);

        let target = V6::splat(10.0);
        let half = 0.5f32;
        assert_eq!(
            a.lerp(&target, &half).to_vec(),
            vec![4.0, 4.5, 5.0, 5.5, 6.0, 6.5]
        );
        assert_eq!(a.fused_lerp(&target, &half), a.lerp(&target, &half));
    }

    #[test]
    fn integer_sums_wrap_across_registers() {
        let v = FastVector::<u8x16, 32, 2>::splat(10);
        assert_eq!(v.horizontal_sum(), 64);
        assert_eq!(v.dot(&FastVector::splat(1)), 64);

        let short = FastVector::<u8x16, 20, 2>::splat(20);
        assert_eq!(short.horizontal_sum(), 144);
    }

    #[test]
    fn lerp_leaves_lanes_a_short_target_does_not_cover() {
        let a = V6::splat(4.0);
        let b = FastVector::<f32x4, 3, 1>::splat(8.0);
        let half = 0.5f32;
        assert_eq!(a.lerp(&b, &half).to_vec(), vec![6.0, 6.0, 6.0, 4.0, 4.0, 4.0]);
        assert_eq!(a.fused_lerp(&b, &half).to_vec(), vec![6.0, 6.0, 6.0, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn matrices_share_the_same_operations() {
        let m = FastMatrix::<f32x4, 2, 3, 1>::from_fn(|column, row| (column * 3 + row) as f32);
        let doubled = m + m;
        assert_eq!(doubled.get(1, 2), Some(10.0));
        assert_eq!(m.horizontal_sum(), 15.0);
        assert_eq!((m * 0.0f32).horizontal_max(), 0.0);

        // a vector is applied to every major
        let column = FastVector::<f32x4, 3, 1>::from_elements([1.0, 1.0, 1.0]);
        let shifted = m + column;
        assert_eq!(shifted.get(0, 0), Some(1.0));
        assert_eq!(shifted.get(1, 2), Some(6.0));
    }
}
