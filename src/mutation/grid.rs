use crate::register::{RegisterLayout, SimdRegister};

/// A value made of `MAJORS` major vectors of `REGISTERS_PER_MAJOR` registers
/// each.
///
/// Fast vectors are a grid with a single major; fast matrices have one major
/// per column (column-major) or row (row-major). This is the capability every
/// register-backed type implements to take part in the mutation framework.
pub trait RegisterGrid: Copy {
    type Register: SimdRegister;
    /// Major-order marker; operands must be sources for this order.
    type Order;

    const MAJORS: usize;
    const REGISTERS_PER_MAJOR: usize;
    /// Register layout of a single major vector.
    const MAJOR_LAYOUT: RegisterLayout;

    fn register(&self, major: usize, index: usize) -> Self::Register;
    fn register_mut(&mut self, major: usize, index: usize) -> &mut Self::Register;
}

/// Where a kernel invocation sits inside a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterPosition {
    pub major: usize,
    pub index: usize,
    /// Logical lanes in this register; the rest are shadow lanes.
    pub valid_lanes: usize,
    pub lanes: usize,
}

impl RegisterPosition {
    pub(crate) fn new<G: RegisterGrid>(major: usize, index: usize) -> Self {
        RegisterPosition {
            major,
            index,
            valid_lanes: G::MAJOR_LAYOUT.valid_lanes(index),
            lanes: G::MAJOR_LAYOUT.elements_per_register,
        }
    }

    /// `true` when this register carries shadow lanes.
    pub fn is_partial(&self) -> bool {
        self.valid_lanes < self.lanes
    }

    /// Replaces the shadow lanes of `register` with the lanes of `fill`.
    /// Registers without shadow lanes are returned unchanged.
    #[inline]
    pub fn mask_shadow<R: SimdRegister>(&self, register: R, fill: R) -> R {
        if self.is_partial() {
            register.keep_lanes(self.valid_lanes, fill)
        } else {
            register
        }
    }
}
