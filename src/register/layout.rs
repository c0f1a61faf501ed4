use serde::Serialize;

use crate::register::{Element, ElementKind, RegisterWidth, SimdRegister};

/// Register bookkeeping for a logical run of `logical_size` elements stored in
/// registers of type `R`.
///
/// This is the one place the partial-register arithmetic lives. Fast vectors
/// and matrices expose their descriptor as an associated `const`, and every
/// masked reduction, store and load reads its trailing-lane count from
/// [`RegisterLayout::valid_in_last`] instead of re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegisterLayout {
    pub element: ElementKind,
    pub width: RegisterWidth,
    pub logical_size: usize,
    pub elements_per_register: usize,
    pub requires_partial: bool,
    pub partial_length: usize,
    pub num_registers: usize,
    pub full_width_size: usize,
}

impl RegisterLayout {
    /// Computes the layout of `logical_size` elements packed into registers
    /// of type `R`.
    ///
    /// # Panics
    /// Panics (at compile time when used in a `const` context) if
    /// `logical_size == 0`.
    pub const fn of<R: SimdRegister>(logical_size: usize) -> Self {
        assert!(logical_size >= 1, "logical size must be at least 1");

        let element = <R::Element as Element>::KIND;
        let width = R::WIDTH;
        let elements_per_register = width.bits() / element.bits();
        let requires_partial = (logical_size * element.bits()) % width.bits() != 0;
        let partial_length = if requires_partial {
            logical_size % elements_per_register
        } else {
            0
        };
        let num_registers = logical_size.div_ceil(elements_per_register);

        RegisterLayout {
            element,
            width,
            logical_size,
            elements_per_register,
            requires_partial,
            partial_length,
            num_registers,
            full_width_size: elements_per_register * num_registers,
        }
    }

    /// Number of logical (non-shadow) lanes in the last register.
    pub const fn valid_in_last(&self) -> usize {
        if self.requires_partial {
            self.partial_length
        } else {
            self.elements_per_register
        }
    }

    /// Number of logical lanes in register `register_index`. Registers past
    /// the end hold no logical lanes.
    pub const fn valid_lanes(&self, register_index: usize) -> usize {
        if register_index + 1 < self.num_registers {
            self.elements_per_register
        } else if register_index + 1 == self.num_registers {
            self.valid_in_last()
        } else {
            0
        }
    }

    /// Maps a logical element index to `(register, lane)`.
    pub const fn locate(&self, index: usize) -> (usize, usize) {
        (
            index / self.elements_per_register,
            index % self.elements_per_register,
        )
    }

    pub const fn shadow_lanes(&self) -> usize {
        self.full_width_size - self.logical_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::{f32x4, f32x16, f64x2, i8x64, u16x8};

    #[test]
    fn exact_fit_has_no_partial_register() {
        let layout = RegisterLayout::of::<f32x4>(8);
        assert_eq!(layout.elements_per_register, 4);
        assert!(!layout.requires_partial);
        assert_eq!(layout.partial_length, 0);
        assert_eq!(layout.num_registers, 2);
        assert_eq!(layout.full_width_size, 8);
        assert_eq!(layout.valid_in_last(), 4);
        assert_eq!(layout.shadow_lanes(), 0);
    }

    #[test]
    fn trailing_partial_register() {
        let layout = RegisterLayout::of::<f32x4>(7);
        assert!(layout.requires_partial);
        assert_eq!(layout.partial_length, 3);
        assert_eq!(layout.num_registers, 2);
        assert_eq!(layout.full_width_size, 8);
        assert_eq!(layout.valid_lanes(0), 4);
        assert_eq!(layout.valid_lanes(1), 3);
        assert_eq!(layout.valid_lanes(2), 0);
    }

    #[test]
    fn smaller_than_one_register() {
        let layout = RegisterLayout::of::<f32x16>(3);
        assert!(layout.requires_partial);
        assert_eq!(layout.partial_length, 3);
        assert_eq!(layout.num_registers, 1);
        assert_eq!(layout.full_width_size, 16);
        assert_eq!(layout.shadow_lanes(), 13);
    }

    #[test]
    fn wide_elements_and_narrow_elements() {
        let doubles = RegisterLayout::of::<f64x2>(5);
        assert_eq!(doubles.elements_per_register, 2);
        assert_eq!(doubles.num_registers, 3);
        assert_eq!(doubles.valid_in_last(), 1);

        let bytes = RegisterLayout::of::<i8x64>(64);
        assert_eq!(bytes.num_registers, 1);
        assert!(!bytes.requires_partial);

        let shorts = RegisterLayout::of::<u16x8>(9);
        assert_eq!(shorts.num_registers, 2);
        assert_eq!(shorts.partial_length, 1);
    }

    #[test]
    fn locate_splits_index() {
        let layout = RegisterLayout::of::<f32x4>(10);
        assert_eq!(layout.locate(0), (0, 0));
        assert_eq!(layout.locate(5), (1, 1));
        assert_eq!(layout.locate(9), (2, 1));
    }

    #[test]
    fn const_evaluable() {
        const LAYOUT: RegisterLayout = RegisterLayout::of::<f32x4>(3);
        assert_eq!(LAYOUT.num_registers, 1);
    }

    #[test]
    fn serializes_for_reports() {
        let json = serde_json::to_string(&RegisterLayout::of::<f32x4>(3)).unwrap();
        assert!(json.contains("\"element\":\"f32\""));
        assert!(json.contains("\"width\":\"128\""));
        assert!(json.contains("\"requires_partial\":true"));
    }
}
