use std::marker::PhantomData;

use crate::dispatch::{self, Kernel};
use crate::order::MajorOrder;
use crate::register::{SimdRegister, f32x4, shuffle};
use crate::scratch::RegisterScratch;
use crate::{FastMatrix, FastVector};

impl<R, const MAJORS: usize, const MINORS: usize, const REGS: usize, O>
    FastMatrix<R, MAJORS, MINORS, REGS, O>
where
    R: SimdRegister,
    O: MajorOrder,
{
    /// The transposed matrix in the same major order.
    ///
    /// `REGS_T` is the register count of the transposed majors
    /// (`ceil(MAJORS / R::LANES)`); any other value fails to build.
    pub fn transpose<const REGS_T: usize>(&self) -> FastMatrix<R, MINORS, MAJORS, REGS_T, O> {
        if dispatch::select(Self::DESCRIPTOR, "transpose") == Kernel::Shuffle4x4F32 {
            if let Some(transposed) = self.transpose_shuffle() {
                return transposed;
            }
        }
        self.transpose_generic()
    }

    /// The transposed matrix, obtained by flipping the major order: the same
    /// registers, read the other way. Costs nothing.
    #[inline]
    pub fn transpose_reinterpret(&self) -> FastMatrix<R, MAJORS, MINORS, REGS, O::Flipped> {
        FastMatrix {
            majors: self.majors,
            order: PhantomData,
        }
    }

    fn transpose_shuffle<const REGS_T: usize>(
        &self,
    ) -> Option<FastMatrix<R, MINORS, MAJORS, REGS_T, O>> {
        let block: [FastVector<f32x4, 4, 1>; 4] = dispatch::cast(self.majors)?;
        let transposed = shuffle::transpose4(block.map(|major| major.register(0)));
        let majors = transposed.map(|register| FastVector::<f32x4, 4, 1>::from_registers([register]));
        dispatch::cast(majors).map(FastMatrix::from_majors)
    }

    /// Dumps to scratch, re-orders element by element and loads back.
    fn transpose_generic<const REGS_T: usize>(&self) -> FastMatrix<R, MINORS, MAJORS, REGS_T, O> {
        let transposed = RegisterScratch::dump(self).transposed();
        let mut out = FastMatrix::zero();
        transposed.load_into(&mut out);
        out
    }
}
