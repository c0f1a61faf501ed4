use std::any::Any;

use crate::fast_vector::StoreExtent;
use crate::order::MajorOrder;
use crate::plain::Matrix;
use crate::register::{Element, SimdRegister};
use crate::{FastMatrix, FastVector};

impl<R, const MAJORS: usize, const MINORS: usize, const REGS: usize, O>
    FastMatrix<R, MAJORS, MINORS, REGS, O>
where
    R: SimdRegister,
    O: MajorOrder,
{
    /// Loads from a plain matrix of any element type and shape.
    ///
    /// Elements the plain matrix does not have become zero; elements past this
    /// matrix's shape are dropped. A column-major matrix of the same element
    /// type loads each column with bulk register loads. Anything else converts
    /// element by element.
    pub fn from_plain<U: Element, const C: usize, const RW: usize>(plain: &Matrix<U, C, RW>) -> Self {
        if O::IS_COLUMN_MAJOR {
            if let Some(same) = (plain as &dyn Any).downcast_ref::<Matrix<R::Element, C, RW>>() {
                let rows = RW.min(MINORS);
                return Self::from_majors(std::array::from_fn(|column| match same.columns().get(column) {
                    Some(values) => FastVector::load_or_zero(&values[..rows]),
                    None => FastVector::zero(),
                }));
            }
        }
        Self::from_fn(|column, row| R::Element::convert_from(plain.at_theoretical(column, row)))
    }

    /// Stores into a plain matrix of any element type and shape. Elements
    /// outside this matrix are zero.
    pub fn store<U: Element, const C: usize, const RW: usize>(&self) -> Matrix<U, C, RW> {
        let mut out = Matrix::<U, C, RW>::zero();
        if O::IS_COLUMN_MAJOR {
            if let Some(same) = (&mut out as &mut dyn Any).downcast_mut::<Matrix<R::Element, C, RW>>() {
                let rows = RW.min(MINORS);
                for (column, major) in self.majors.iter().enumerate().take(C) {
                    major.write_prefix(&mut same.column_mut(column)[..rows]);
                }
                return out;
            }
        }
        Matrix::from_fn(|column, row| U::convert_from(self.get_theoretical(column, row)))
    }

    /// Writes the majors one after another into `dst[offset..]`. Each major
    /// takes `extent.len(MAJOR_LAYOUT)` elements.
    ///
    /// # Panics
    /// Panics if `dst[offset..]` cannot hold every major.
    pub fn store_slice(&self, dst: &mut [R::Element], offset: usize, extent: StoreExtent) {
        let stride = extent.len(Self::MAJOR_LAYOUT);
        let dst = &mut dst[offset..offset + stride * MAJORS];
        for (major, chunk) in self.majors.iter().zip(dst.chunks_exact_mut(stride)) {
            major.write_prefix(chunk);
        }
    }

    /// # Safety
    /// `dst` must be valid for writes of `MAJORS * extent.len(MAJOR_LAYOUT)`
    /// elements. No alignment is required.
    pub unsafe fn store_unchecked(&self, dst: *mut R::Element, extent: StoreExtent) {
        let stride = extent.len(Self::MAJOR_LAYOUT);
        for (major, vector) in self.majors.iter().enumerate() {
            // SAFETY: forwarded from the caller, each major stays in bounds.
            unsafe { vector.store_unchecked(dst.add(major * stride), extent) };
        }
    }
}
