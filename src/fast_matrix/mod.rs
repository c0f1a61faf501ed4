//! Fixed-size matrices stored as a run of register-packed major vectors.
//!
//! A `FastMatrix<R, MAJORS, MINORS, REGS, O>` holds `MAJORS` fast vectors of
//! `MINORS` elements. With the default [`ColumnMajor`] order the majors are
//! columns, so the matrix has `MAJORS` columns and `MINORS` rows; with
//! [`RowMajor`](crate::RowMajor) they are rows. Element access always takes
//! `(column, row)` regardless of order.

mod bridge;
mod factories;
mod inverse;
mod multiply;
mod transpose;

use std::marker::PhantomData;

use crate::FastVector;
use crate::dispatch::ShapeDescriptor;
use crate::mutation::{RegisterGrid, RegisterSource};
use crate::order::{ColumnMajor, MajorOrder};
use crate::register::{RegisterLayout, SimdRegister};

#[derive(Clone, Copy, Debug)]
pub struct FastMatrix<
    R: SimdRegister,
    const MAJORS: usize,
    const MINORS: usize,
    const REGS: usize,
    O: MajorOrder = ColumnMajor,
> {
    majors: [FastVector<R, MINORS, REGS>; MAJORS],
    order: PhantomData<O>,
}

impl<R, const MAJORS: usize, const MINORS: usize, const REGS: usize, O>
    FastMatrix<R, MAJORS, MINORS, REGS, O>
where
    R: SimdRegister,
    O: MajorOrder,
{
    pub const NUM_MAJORS: usize = MAJORS;
    pub const NUM_MINORS: usize = MINORS;
    pub const NUM_COLUMNS: usize = if O::IS_COLUMN_MAJOR { MAJORS } else { MINORS };
    pub const NUM_ROWS: usize = if O::IS_COLUMN_MAJOR { MINORS } else { MAJORS };
    pub const SIZE: usize = MAJORS * MINORS;
    pub const NUM_REGISTERS: usize = MAJORS * REGS;
    pub const MAJOR_LAYOUT: RegisterLayout = RegisterLayout::of::<R>(MINORS);
    pub const DESCRIPTOR: ShapeDescriptor = ShapeDescriptor::of::<R, O>(MAJORS, MINORS);

    #[inline]
    pub fn from_majors(majors: [FastVector<R, MINORS, REGS>; MAJORS]) -> Self {
        const {
            assert!(MAJORS >= 1, "a fast matrix has at least one major");
        }
        FastMatrix {
            majors,
            order: PhantomData,
        }
    }

    #[inline]
    pub fn zero() -> Self {
        Self::from_majors([FastVector::zero(); MAJORS])
    }

    #[inline]
    pub fn splat(value: R::Element) -> Self {
        Self::from_majors([FastVector::splat(value); MAJORS])
    }

    /// Builds a matrix from `f(column, row)`.
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> R::Element) -> Self {
        Self::from_majors(std::array::from_fn(|major| {
            FastVector::from_fn(|minor| {
                let (column, row) = Self::column_row(major, minor);
                f(column, row)
            })
        }))
    }

    /// Loads `MAJORS * MINORS` elements stored major after major without
    /// padding.
    ///
    /// # Panics
    /// Panics if `src` holds fewer than `SIZE` elements.
    pub fn load(src: &[R::Element]) -> Self {
        assert!(
            src.len() >= Self::SIZE,
            "need {} elements, got {}",
            Self::SIZE,
            src.len()
        );
        Self::from_majors(std::array::from_fn(|major| {
            FastVector::load_or_zero(&src[major * MINORS..(major + 1) * MINORS])
        }))
    }

    /// Loads `MAJORS` register-padded majors, `FULL_WIDTH` elements each.
    ///
    /// # Panics
    /// Panics if `src` is shorter than `MAJORS * MAJOR_LAYOUT.full_width_size`.
    pub fn load_full_width(src: &[R::Element]) -> Self {
        let stride = Self::MAJOR_LAYOUT.full_width_size;
        Self::from_majors(std::array::from_fn(|major| {
            FastVector::load(&src[major * stride..(major + 1) * stride])
        }))
    }

    /// Loads register-padded majors starting at `src`.
    ///
    /// # Safety
    /// `src` must be valid for reads of `MAJORS * MAJOR_LAYOUT.full_width_size`
    /// elements.
    pub unsafe fn load_unchecked(src: *const R::Element) -> Self {
        let stride = Self::MAJOR_LAYOUT.full_width_size;
        Self::from_majors(std::array::from_fn(|major| {
            // SAFETY: forwarded from the caller, each major is in bounds.
            unsafe { FastVector::load_unchecked(src.add(major * stride)) }
        }))
    }

    /// Maps a storage position to `(column, row)`.
    #[inline]
    const fn column_row(major: usize, minor: usize) -> (usize, usize) {
        if O::IS_COLUMN_MAJOR {
            (major, minor)
        } else {
            (minor, major)
        }
    }

    /// Maps `(column, row)` to a storage position.
    #[inline]
    const fn major_minor(column: usize, row: usize) -> (usize, usize) {
        if O::IS_COLUMN_MAJOR {
            (column, row)
        } else {
            (row, column)
        }
    }

    /// Element at `(COLUMN, ROW)`; fails to build when out of range.
    #[inline]
    pub fn at<const COLUMN: usize, const ROW: usize>(&self) -> R::Element {
        const {
            assert!(COLUMN < Self::NUM_COLUMNS, "column out of range");
            assert!(ROW < Self::NUM_ROWS, "row out of range");
        }
        let (major, minor) = Self::major_minor(COLUMN, ROW);
        self.majors[major].lane(minor)
    }

    /// Element at `(COLUMN, ROW)`, or zero outside the matrix.
    #[inline]
    pub fn at_theoretical<const COLUMN: usize, const ROW: usize>(&self) -> R::Element {
        self.get_theoretical(COLUMN, ROW)
    }

    #[inline]
    pub fn get(&self, column: usize, row: usize) -> Option<R::Element> {
        let (major, minor) = Self::major_minor(column, row);
        self.majors.get(major).and_then(|vector| vector.get(minor))
    }

    #[inline]
    pub fn get_theoretical(&self, column: usize, row: usize) -> R::Element {
        self.get(column, row)
            .unwrap_or_else(<R::Element as num_traits::Zero>::zero)
    }

    /// # Panics
    /// Panics if `(column, row)` is outside the matrix.
    #[inline]
    pub fn set(&mut self, column: usize, row: usize, value: R::Element) {
        let (major, minor) = Self::major_minor(column, row);
        self.majors[major].set_lane(minor, value);
    }

    #[inline]
    pub fn major(&self, index: usize) -> &FastVector<R, MINORS, REGS> {
        &self.majors[index]
    }

    #[inline]
    pub fn major_mut(&mut self, index: usize) -> &mut FastVector<R, MINORS, REGS> {
        &mut self.majors[index]
    }

    #[inline]
    pub fn majors(&self) -> &[FastVector<R, MINORS, REGS>; MAJORS] {
        &self.majors
    }

    #[inline]
    pub fn into_majors(self) -> [FastVector<R, MINORS, REGS>; MAJORS] {
        self.majors
    }

    #[inline]
    pub fn set_major(&mut self, index: usize, major: FastVector<R, MINORS, REGS>) {
        self.majors[index] = major;
    }

    /// Logical elements as rows, top to bottom.
    pub fn to_rows(&self) -> Vec<Vec<R::Element>> {
        (0..Self::NUM_ROWS)
            .map(|row| {
                (0..Self::NUM_COLUMNS)
                    .map(|column| self.get_theoretical(column, row))
                    .collect()
            })
            .collect()
    }
}

impl<R, const MAJORS: usize, const MINORS: usize, const REGS: usize, O> Default
    for FastMatrix<R, MAJORS, MINORS, REGS, O>
where
    R: SimdRegister,
    O: MajorOrder,
{
    fn default() -> Self {
        Self::zero()
    }
}

/// Compares logical elements only.
impl<R, const MAJORS: usize, const MINORS: usize, const REGS: usize, O> PartialEq
    for FastMatrix<R, MAJORS, MINORS, REGS, O>
where
    R: SimdRegister,
    O: MajorOrder,
{
    fn eq(&self, other: &Self) -> bool {
        self.majors == other.majors
    }
}

impl<R, const MAJORS: usize, const MINORS: usize, const REGS: usize, O> RegisterGrid
    for FastMatrix<R, MAJORS, MINORS, REGS, O>
where
    R: SimdRegister,
    O: MajorOrder,
{
    type Register = R;
    type Order = O;

    const MAJORS: usize = MAJORS;
    const REGISTERS_PER_MAJOR: usize = REGS;
    const MAJOR_LAYOUT: RegisterLayout = RegisterLayout::of::<R>(MINORS);

    #[inline]
    fn register(&self, major: usize, index: usize) -> R {
        self.majors[major].register(index)
    }

    #[inline]
    fn register_mut(&mut self, major: usize, index: usize) -> &mut R {
        self.majors[major].register_mut(index)
    }
}

/// A matrix of any shape feeds grids of its own major order. Majors and
/// registers past its extent are absent.
impl<R, const MAJORS: usize, const MINORS: usize, const REGS: usize, O> RegisterSource<R, O>
    for FastMatrix<R, MAJORS, MINORS, REGS, O>
where
    R: SimdRegister,
    O: MajorOrder,
{
    #[inline]
    fn register_at(&self, major: usize, index: usize) -> Option<R> {
        self.majors
            .get(major)
            .and_then(|vector| vector.registers().get(index))
            .copied()
    }

    #[inline]
    fn valid_lanes_at(&self, _major: usize, index: usize) -> usize {
        Self::MAJOR_LAYOUT.valid_lanes(index)
    }
}
