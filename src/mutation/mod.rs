//! Mapping kernels over the registers of a fast vector or fast matrix.
//!
//! Every element-wise operation in the crate is a kernel run by one walker:
//! it visits each `(major, register)` slot of a [`RegisterGrid`] in order,
//! resolves the extra operands for that slot through an [`OperandPack`], and
//! either writes the kernel's register back (mutating forms) or only reads
//! (visiting forms). Masked forms first overwrite the trailing shadow lanes of
//! the subject with a caller-chosen register, so neutral values flow through
//! reductions and traps never fire on lanes that hold no logical data.

mod grid;
mod operand;

pub use grid::{RegisterGrid, RegisterPosition};
pub use operand::{
    KeepAbsent, Neutral, OneFill, OperandPack, Present, RegisterSource, With, ZeroFill,
};

#[inline]
fn walk<G, P, F>(grid: &mut G, operands: &P, shadow_fill: Option<G::Register>, mut kernel: F)
where
    G: RegisterGrid,
    P: OperandPack<G::Register, G::Order>,
    F: FnMut(RegisterPosition, G::Register, P::Fetched) -> G::Register,
{
    for major in 0..G::MAJORS {
        for index in 0..G::REGISTERS_PER_MAJOR {
            let position = RegisterPosition::new::<G>(major, index);
            let fetched = operands.fetch(major, index);
            let slot = grid.register_mut(major, index);
            let current = match shadow_fill {
                Some(fill) => position.mask_shadow(*slot, fill),
                None => *slot,
            };
            *slot = kernel(position, current, fetched);
        }
    }
}

/// Kernel-mapping entry points, available on every [`RegisterGrid`].
///
/// Returning forms copy the subject and leave it untouched; `_assign` forms
/// write into it. There is no form that does both.
pub trait Mutate: RegisterGrid {
    /// Applies `kernel` to every register and returns the result.
    #[inline]
    fn mutate<P, F>(&self, operands: P, mut kernel: F) -> Self
    where
        P: OperandPack<Self::Register, Self::Order>,
        F: FnMut(Self::Register, P::Fetched) -> Self::Register,
    {
        let mut out = *self;
        walk(&mut out, &operands, None, |_, reg, fetched| kernel(reg, fetched));
        out
    }

    #[inline]
    fn mutate_assign<P, F>(&mut self, operands: P, mut kernel: F)
    where
        P: OperandPack<Self::Register, Self::Order>,
        F: FnMut(Self::Register, P::Fetched) -> Self::Register,
    {
        walk(self, &operands, None, |_, reg, fetched| kernel(reg, fetched));
    }

    /// Like [`Mutate::mutate`], with the kernel told where each register sits.
    #[inline]
    fn mutate_at<P, F>(&self, operands: P, kernel: F) -> Self
    where
        P: OperandPack<Self::Register, Self::Order>,
        F: FnMut(RegisterPosition, Self::Register, P::Fetched) -> Self::Register,
    {
        let mut out = *self;
        walk(&mut out, &operands, None, kernel);
        out
    }

    #[inline]
    fn mutate_at_assign<P, F>(&mut self, operands: P, kernel: F)
    where
        P: OperandPack<Self::Register, Self::Order>,
        F: FnMut(RegisterPosition, Self::Register, P::Fetched) -> Self::Register,
    {
        walk(self, &operands, None, kernel);
    }

    /// Applies `kernel` after replacing the subject's shadow lanes with the
    /// matching lanes of `fill`.
    #[inline]
    fn mutate_masked<P, F>(&self, fill: Self::Register, operands: P, mut kernel: F) -> Self
    where
        P: OperandPack<Self::Register, Self::Order>,
        F: FnMut(Self::Register, P::Fetched) -> Self::Register,
    {
        let mut out = *self;
        walk(&mut out, &operands, Some(fill), |_, reg, fetched| kernel(reg, fetched));
        out
    }

    /// Visits every register without writing anything back.
    #[inline]
    fn inspect<P, F>(&self, operands: P, mut visitor: F)
    where
        P: OperandPack<Self::Register, Self::Order>,
        F: FnMut(RegisterPosition, Self::Register, P::Fetched),
    {
        for major in 0..Self::MAJORS {
            for index in 0..Self::REGISTERS_PER_MAJOR {
                let position = RegisterPosition::new::<Self>(major, index);
                visitor(
                    position,
                    self.register(major, index),
                    operands.fetch(major, index),
                );
            }
        }
    }

    /// Folds every register, shadow lanes replaced by `fill`, into one
    /// accumulator.
    #[inline]
    fn fold_masked<A, F>(&self, fill: Self::Register, init: A, mut f: F) -> A
    where
        F: FnMut(A, Self::Register) -> A,
    {
        let mut acc = init;
        for major in 0..Self::MAJORS {
            for index in 0..Self::REGISTERS_PER_MAJOR {
                let position = RegisterPosition::new::<Self>(major, index);
                acc = f(acc, position.mask_shadow(self.register(major, index), fill));
            }
        }
        acc
    }
}

impl<G: RegisterGrid> Mutate for G {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FastVector;
    use crate::register::{SimdRegister, f32x4, i32x4};

    type V6 = FastVector<f32x4, 6, 2>;

    fn sample() -> V6 {
        V6::from_elements([1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
    }

    #[test]
    fn mutate_returns_copy_and_leaves_subject() {
        let v = sample();
        let doubled = v.mutate((), |reg, ()| reg + reg);
        assert_eq!(doubled.to_vec(), vec![2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
        assert_eq!(v, sample());
    }

    #[test]
    fn mutate_assign_writes_in_place() {
        let mut v = sample();
        let other = V6::splat(1.0);
        v.mutate_assign((With::zeroed(&other),), |reg, (o,)| reg - o);
        assert_eq!(v.to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn positions_report_partial_register() {
        let mut seen = Vec::new();
        sample().inspect((), |pos, _, ()| seen.push((pos.index, pos.valid_lanes)));
        assert_eq!(seen, vec![(0, 4), (1, 2)]);
    }

    #[test]
    fn masked_mutation_fills_shadow_lanes() {
        let v = FastVector::<i32x4, 3, 1>::from_elements([1, 2, 3]);
        let masked = v.mutate_masked(i32x4::splat(-7), (), |reg, ()| reg);
        assert_eq!(masked.register(0).to_array(), [1, 2, 3, -7]);
    }

    #[test]
    fn fold_masked_ignores_shadow_lanes() {
        let mut v = sample();
        // dirty the shadow lanes on purpose
        v.set_register(1, f32x4::from_array([5.0, 6.0, 100.0, 100.0]));
        let sum = v.fold_masked(f32x4::zero(), 0.0f32, |acc, reg| acc + reg.reduce_sum());
        assert_eq!(sum, 21.0);
    }

    #[test]
    fn three_operand_kernel() {
        let a = sample();
        let b = V6::splat(2.0);
        let c = V6::splat(1.0);
        let out = a.mutate(
            (With::zeroed(&a), With::ones(&b), With::zeroed(&c)),
            |_, (x, y, z)| x.mul_add(y, z),
        );
        assert_eq!(out.to_vec(), vec![3.0, 5.0, 7.0, 9.0, 11.0, 13.0]);
    }
}
