use std::any::Any;

use crate::FastVector;
use crate::plain::Vector;
use crate::register::{Element, RegisterLayout, SimdRegister};

/// How much of a fast value a slice store writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreExtent {
    /// Only the logical elements.
    #[default]
    Logical,
    /// Every lane of every register, shadow lanes included.
    FullWidth,
}

impl StoreExtent {
    pub const fn len(self, layout: RegisterLayout) -> usize {
        match self {
            StoreExtent::Logical => layout.logical_size,
            StoreExtent::FullWidth => layout.full_width_size,
        }
    }
}

impl<R: SimdRegister, const N: usize, const REGS: usize> FastVector<R, N, REGS> {
    /// Loads from a plain vector of any element type and size.
    ///
    /// Indices the plain vector does not have become zero, and indices past
    /// `N` are dropped. Matching element types take a bulk register load;
    /// anything else converts element by element.
    pub fn from_plain<U: Element, const M: usize>(plain: &Vector<U, M>) -> Self {
        if let Some(same) = (plain as &dyn Any).downcast_ref::<Vector<R::Element, M>>() {
            let available = M.min(N);
            return Self::load_or_zero(&same.as_slice()[..available]);
        }
        Self::from_fn(|i| R::Element::convert_from(plain.at_theoretical(i)))
    }

    /// Stores into a plain vector of any element type and size. Indices past
    /// `N` are zero.
    pub fn store<U: Element, const M: usize>(&self) -> Vector<U, M> {
        let mut out = Vector::<U, M>::zero();
        if let Some(same) = (&mut out as &mut dyn Any).downcast_mut::<Vector<R::Element, M>>() {
            let count = M.min(N);
            self.write_prefix(&mut same.as_mut_slice()[..count]);
            return out;
        }
        Vector::from_fn(|i| U::convert_from(self.get_theoretical(i)))
    }

    /// Writes into `dst[offset..]`, either the logical elements or the full
    /// register width.
    ///
    /// # Panics
    /// Panics if `dst[offset..]` is shorter than the requested extent.
    pub fn store_slice(&self, dst: &mut [R::Element], offset: usize, extent: StoreExtent) {
        let len = extent.len(Self::LAYOUT);
        self.write_prefix(&mut dst[offset..offset + len]);
    }

    /// Writes the requested extent starting at `dst`.
    ///
    /// # Safety
    /// `dst` must be valid for writes of `extent.len(Self::LAYOUT)` elements.
    /// No alignment is required.
    pub unsafe fn store_unchecked(&self, dst: *mut R::Element, extent: StoreExtent) {
        let len = extent.len(Self::LAYOUT);
        // SAFETY: the caller guarantees `len` writable elements at `dst`.
        let dst = unsafe { std::slice::from_raw_parts_mut(dst, len) };
        self.write_prefix(dst);
    }

    /// Copies the first `dst.len()` lanes of the register run into `dst`.
    pub(crate) fn write_prefix(&self, dst: &mut [R::Element]) {
        for (register, chunk) in self.registers().iter().zip(dst.chunks_mut(R::LANES)) {
            if chunk.len() == R::LANES {
                register.write_to_slice(chunk);
            } else {
                for (lane, slot) in chunk.iter_mut().enumerate() {
                    *slot = register.lane(lane);
                }
            }
        }
    }
}
