use std::ops::{Index, IndexMut};

use crate::register::Element;

/// A memory-backed vector of `N` elements.
///
/// This is the conversion source and sink for [`FastVector`](crate::FastVector);
/// it carries no SIMD layout of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<T, const N: usize> {
    elements: [T; N],
}

impl<T: Element, const N: usize> Vector<T, N> {
    pub const SIZE: usize = N;

    pub fn new(elements: [T; N]) -> Self {
        Vector { elements }
    }

    pub fn zero() -> Self {
        Vector {
            elements: [T::zero(); N],
        }
    }

    pub fn from_fn(f: impl FnMut(usize) -> T) -> Self {
        Vector {
            elements: std::array::from_fn(f),
        }
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.elements
    }

    pub fn as_array(&self) -> &[T; N] {
        &self.elements
    }

    pub fn as_mut_array(&mut self) -> &mut [T; N] {
        &mut self.elements
    }

    pub fn into_array(self) -> [T; N] {
        self.elements
    }

    /// Returns the element at `index`, or zero when `index` is out of range.
    pub fn at_theoretical(&self, index: usize) -> T {
        self.elements.get(index).copied().unwrap_or_else(T::zero)
    }

    /// Element-wise conversion to another element type and size; indices
    /// beyond `N` are zero.
    pub fn convert<U: Element, const M: usize>(&self) -> Vector<U, M> {
        Vector::from_fn(|i| U::convert_from(self.at_theoretical(i)))
    }
}

impl<T: Element, const N: usize> Default for Vector<T, N> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Element, const N: usize> From<[T; N]> for Vector<T, N> {
    fn from(elements: [T; N]) -> Self {
        Vector::new(elements)
    }
}

impl<T, const N: usize> Index<usize> for Vector<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.elements[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for Vector<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.elements[index]
    }
}
