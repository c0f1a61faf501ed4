use num_traits::{Float, One};

use crate::arithmetic::Elementwise;
use crate::dispatch::{self, Kernel};
use crate::order::MajorOrder;
use crate::register::{SimdRegister, f32x4, shuffle};
use crate::{FastMatrix, FastVector};

/// Where an inversion writes its determinant, if the caller asked for one.
#[derive(Debug, Clone, Copy)]
struct DeterminantSlot<R> {
    requested: bool,
    value: Option<R>,
}

impl<R: SimdRegister> DeterminantSlot<R> {
    fn requested() -> Self {
        DeterminantSlot {
            requested: true,
            value: None,
        }
    }

    fn skipped() -> Self {
        DeterminantSlot {
            requested: false,
            value: None,
        }
    }

    #[inline]
    fn record(&mut self, determinant: impl FnOnce() -> R) {
        if self.requested {
            self.value = Some(determinant());
        }
    }

    fn into_value(self) -> R {
        self.value.unwrap_or_else(R::zero)
    }
}

impl<R, const N: usize, const REGS: usize, O> FastMatrix<R, N, N, REGS, O>
where
    R: SimdRegister,
    R::Element: Float,
    O: MajorOrder,
{
    /// The inverse matrix.
    ///
    /// The matrix must be invertible. Singular input is not detected and
    /// yields non-finite elements.
    pub fn inverse(&self) -> Self {
        self.invert(&mut DeterminantSlot::skipped())
    }

    /// The inverse together with the determinant of `self`.
    pub fn inverse_with_determinant(&self) -> (Self, R::Element) {
        let (inverse, determinant) = self.inverse_with_determinant_register();
        (inverse, determinant.lane(0))
    }

    /// Like [`inverse_with_determinant`](Self::inverse_with_determinant), with
    /// the determinant splat across a register.
    pub fn inverse_with_determinant_register(&self) -> (Self, R) {
        let mut slot = DeterminantSlot::requested();
        let inverse = self.invert(&mut slot);
        (inverse, slot.into_value())
    }

    pub fn determinant(&self) -> R::Element {
        self.inverse_with_determinant().1
    }

    fn invert(&self, slot: &mut DeterminantSlot<R>) -> Self {
        if dispatch::select(Self::DESCRIPTOR, "inverse") == Kernel::Shuffle4x4F32 {
            if let Some(inverse) = self.invert_shuffle(slot) {
                return inverse;
            }
        }
        self.invert_gauss_jordan(slot)
    }

    fn invert_shuffle(&self, slot: &mut DeterminantSlot<R>) -> Option<Self> {
        let block: [FastVector<f32x4, 4, 1>; 4] = dispatch::cast(self.majors)?;
        let (inverse, determinant) = shuffle::inverse4(block.map(|major| major.register(0)));
        let majors = inverse.map(|register| FastVector::<f32x4, 4, 1>::from_registers([register]));
        let majors: [FastVector<R, N, REGS>; N] = dispatch::cast(majors)?;
        slot.record(|| dispatch::cast(determinant).unwrap_or_else(R::zero));
        Some(Self::from_majors(majors))
    }

    /// Gauss-Jordan elimination over the majors, without pivot search.
    ///
    /// Majors are treated as rows. For a column-major matrix that inverts the
    /// transpose, whose inverse read column-wise is the inverse of `self`.
    fn invert_gauss_jordan(&self, slot: &mut DeterminantSlot<R>) -> Self {
        let mut rows = self.majors;
        let mut inverse = Self::identity().majors;
        let mut determinant = <R::Element as One>::one();

        for p in 0..N {
            let pivot = rows[p].lane(p);
            determinant = determinant * pivot;

            let reciprocal = R::splat(pivot.recip());
            rows[p].basic_mul_assign(&reciprocal);
            inverse[p].basic_mul_assign(&reciprocal);

            let (pivot_row, pivot_inverse) = (rows[p], inverse[p]);
            for r in (0..N).filter(|&r| r != p) {
                let factor = R::splat(-rows[r].lane(p));
                rows[r] = pivot_row.basic_fmadd(&factor, &rows[r]);
                inverse[r] = pivot_inverse.basic_fmadd(&factor, &inverse[r]);
            }
        }

        slot.record(|| R::splat(determinant));
        Self::from_majors(inverse)
    }
}
