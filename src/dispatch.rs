//! Algorithm selection for fast matrices.
//!
//! Each matrix instantiation carries a [`ShapeDescriptor`] as an associated
//! constant. The descriptor names the one kernel family an operation should
//! use: the in-register shuffle algorithms for 4x4 `f32` matrices held in
//! 128-bit registers, or the register-by-register generic fallbacks for
//! everything else.

use std::any::Any;

use serde::Serialize;
use tracing::trace;

use crate::order::{MajorOrder, OrderKind};
use crate::register::{ElementKind, RegisterLayout, RegisterWidth, SimdRegister};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    /// One `f32x4` per major, four majors.
    Shuffle4x4F32,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShapeDescriptor {
    pub element: ElementKind,
    pub width: RegisterWidth,
    pub order: OrderKind,
    pub majors: usize,
    pub minors: usize,
    pub registers_per_major: usize,
}

impl ShapeDescriptor {
    pub const fn of<R: SimdRegister, O: MajorOrder>(majors: usize, minors: usize) -> Self {
        let major = RegisterLayout::of::<R>(minors);
        ShapeDescriptor {
            element: major.element,
            width: major.width,
            order: O::KIND,
            majors,
            minors,
            registers_per_major: major.num_registers,
        }
    }

    pub const fn columns(&self) -> usize {
        match self.order {
            OrderKind::ColumnMajor => self.majors,
            OrderKind::RowMajor => self.minors,
        }
    }

    pub const fn rows(&self) -> usize {
        match self.order {
            OrderKind::ColumnMajor => self.minors,
            OrderKind::RowMajor => self.majors,
        }
    }

    pub const fn is_square(&self) -> bool {
        self.majors == self.minors
    }

    pub const fn kernel(&self) -> Kernel {
        let four_by_four = self.majors == 4 && self.minors == 4 && self.registers_per_major == 1;
        let f32_in_128 =
            matches!(self.element, ElementKind::F32) && matches!(self.width, RegisterWidth::W128);
        if four_by_four && f32_in_128 {
            Kernel::Shuffle4x4F32
        } else {
            Kernel::Generic
        }
    }
}

/// Resolves the kernel for `operation` and traces the choice.
#[inline]
pub(crate) fn select(descriptor: ShapeDescriptor, operation: &'static str) -> Kernel {
    let kernel = descriptor.kernel();
    trace!(
        operation,
        ?kernel,
        majors = descriptor.majors,
        minors = descriptor.minors,
        element = ?descriptor.element,
        "kernel selected"
    );
    kernel
}

/// Moves `value` into `B` when both are the same concrete type.
///
/// The shuffle kernels are written against concrete `f32x4` blocks; this is
/// how generic code hands its storage over to them and takes it back. A
/// mismatch returns `None`, so callers fall through to the generic kernel.
#[inline]
pub(crate) fn cast<A: 'static, B: 'static>(value: A) -> Option<B> {
    let mut slot = Some(value);
    (&mut slot as &mut dyn Any)
        .downcast_mut::<Option<B>>()
        .and_then(Option::take)
}
