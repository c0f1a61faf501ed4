//! Fixed-size vectors packed into SIMD registers.

mod bridge;

pub use bridge::StoreExtent;

use crate::arithmetic::Elementwise;
use crate::mutation::{RegisterGrid, RegisterSource};
use crate::order::Linear;
use crate::register::{RegisterLayout, SimdRegister};

/// `N` elements stored in `REGS` registers of type `R`.
///
/// `REGS` must equal `ceil(N / R::LANES)`; any other value fails to build.
/// Logical element `i` lives in lane `i % R::LANES` of register
/// `i / R::LANES`. Lanes past `N` in the last register are shadow lanes:
/// they can be read, but reductions and equality ignore them.
#[derive(Clone, Copy, Debug)]
pub struct FastVector<R: SimdRegister, const N: usize, const REGS: usize> {
    registers: [R; REGS],
}

impl<R: SimdRegister, const N: usize, const REGS: usize> FastVector<R, N, REGS> {
    pub const LAYOUT: RegisterLayout = RegisterLayout::of::<R>(N);
    pub const SIZE: usize = N;
    pub const NUM_REGISTERS: usize = REGS;
    pub const ELEMENTS_PER_REGISTER: usize = R::LANES;
    pub const FULL_WIDTH_SIZE: usize = Self::LAYOUT.full_width_size;

    /// Wraps registers as a vector. Every other constructor goes through here.
    #[inline]
    pub fn from_registers(registers: [R; REGS]) -> Self {
        const {
            assert!(N >= 1, "a fast vector holds at least one element");
            assert!(
                REGS == Self::LAYOUT.num_registers,
                "REGS must equal ceil(N / lanes per register)"
            );
        }
        FastVector { registers }
    }

    #[inline]
    pub fn zero() -> Self {
        Self::splat_register(R::zero())
    }

    #[inline]
    pub fn one() -> Self {
        Self::splat_register(R::one())
    }

    /// Every lane, shadow lanes included, set to `value`.
    #[inline]
    pub fn splat(value: R::Element) -> Self {
        Self::splat_register(R::splat(value))
    }

    #[inline]
    pub fn splat_register(register: R) -> Self {
        Self::from_registers([register; REGS])
    }

    /// Loads `FULL_WIDTH_SIZE` elements from the front of `src`.
    ///
    /// # Panics
    /// Panics if `src` is shorter than `FULL_WIDTH_SIZE`.
    #[inline]
    pub fn load(src: &[R::Element]) -> Self {
        Self::from_registers(std::array::from_fn(|i| R::from_slice(&src[i * R::LANES..])))
    }

    /// Loads whatever prefix of `src` is available and zero-fills the rest.
    #[inline]
    pub fn load_or_zero(src: &[R::Element]) -> Self {
        Self::from_registers(std::array::from_fn(|i| {
            R::from_slice_or_zero(src.get(i * R::LANES..).unwrap_or(&[]))
        }))
    }

    /// Loads `FULL_WIDTH_SIZE` elements starting at `src`.
    ///
    /// # Safety
    /// `src` must be valid for reads of `FULL_WIDTH_SIZE` elements. No
    /// alignment is required.
    #[inline]
    pub unsafe fn load_unchecked(src: *const R::Element) -> Self {
        const {
            assert!(size_of::<R>() == R::LANES * size_of::<R::Element>());
        }
        Self::from_registers(std::array::from_fn(|i| {
            // SAFETY: the caller guarantees FULL_WIDTH_SIZE readable elements,
            // and R has the size of LANES packed elements.
            unsafe { src.add(i * R::LANES).cast::<R>().read_unaligned() }
        }))
    }

    #[inline]
    pub fn from_elements(elements: [R::Element; N]) -> Self {
        Self::load_or_zero(&elements)
    }

    /// Builds a vector from `f(index)` for every logical index. Shadow lanes
    /// are zero.
    pub fn from_fn(mut f: impl FnMut(usize) -> R::Element) -> Self {
        Self::from_registers(std::array::from_fn(|register| {
            let valid = Self::LAYOUT.valid_lanes(register);
            (0..valid).fold(R::zero(), |reg, lane| {
                reg.with_lane(lane, f(register * R::LANES + lane))
            })
        }))
    }

    /// Element `I`; fails to build unless `I < N`.
    #[inline]
    pub fn at<const I: usize>(&self) -> R::Element {
        const {
            assert!(I < N, "index out of logical range");
        }
        self.lane(I)
    }

    /// Lane `I` of the full-width storage, shadow lanes included.
    #[inline]
    pub fn at_full_width<const I: usize>(&self) -> R::Element {
        const {
            assert!(I < Self::FULL_WIDTH_SIZE, "index out of register range");
        }
        self.lane(I)
    }

    /// Element `I`, or zero when `I` is outside the logical range.
    #[inline]
    pub fn at_theoretical<const I: usize>(&self) -> R::Element {
        self.get_theoretical(I)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<R::Element> {
        (index < N).then(|| self.lane(index))
    }

    #[inline]
    pub fn get_theoretical(&self, index: usize) -> R::Element {
        self.get(index)
            .unwrap_or_else(<R::Element as num_traits::Zero>::zero)
    }

    /// Reads lane `index` of the full-width storage.
    ///
    /// # Panics
    /// Panics if `index >= FULL_WIDTH_SIZE`.
    #[inline]
    pub fn lane(&self, index: usize) -> R::Element {
        let (register, lane) = Self::LAYOUT.locate(index);
        self.registers[register].lane(lane)
    }

    /// Overwrites logical element `index`.
    ///
    /// # Panics
    /// Panics if `index >= N`.
    #[inline]
    pub fn set_lane(&mut self, index: usize, value: R::Element) {
        assert!(index < N, "index {index} out of logical range {N}");
        let (register, lane) = Self::LAYOUT.locate(index);
        self.registers[register] = self.registers[register].with_lane(lane, value);
    }

    #[inline]
    pub fn get_register<const I: usize>(&self) -> R {
        const {
            assert!(I < REGS, "register index out of range");
        }
        self.registers[I]
    }

    /// Register `I`, or a zero register when `I >= REGS`.
    #[inline]
    pub fn get_register_theoretical<const I: usize>(&self) -> R {
        self.register_theoretical(I)
    }

    #[inline]
    pub fn register(&self, index: usize) -> R {
        self.registers[index]
    }

    #[inline]
    pub fn register_theoretical(&self, index: usize) -> R {
        self.registers.get(index).copied().unwrap_or_else(R::zero)
    }

    #[inline]
    pub(crate) fn register_mut(&mut self, index: usize) -> &mut R {
        &mut self.registers[index]
    }

    #[inline]
    pub fn set_register(&mut self, index: usize, register: R) {
        self.registers[index] = register;
    }

    #[inline]
    pub fn registers(&self) -> &[R; REGS] {
        &self.registers
    }

    #[inline]
    pub fn into_registers(self) -> [R; REGS] {
        self.registers
    }

    #[inline]
    pub fn set_all_zero(&mut self) {
        *self = Self::zero();
    }

    #[inline]
    pub fn set_all_one(&mut self) {
        *self = Self::one();
    }

    /// Broadcasts `value` into every lane.
    #[inline]
    pub fn set1(&mut self, value: R::Element) {
        *self = Self::splat(value);
    }

    /// The logical elements, in order.
    pub fn to_vec(&self) -> Vec<R::Element> {
        (0..N).map(|i| self.lane(i)).collect()
    }

    /// Reinterprets the registers under another logical size. Registers
    /// beyond `REGS` read as zero; registers beyond `REGS2` are dropped.
    #[inline]
    pub fn recast<const N2: usize, const REGS2: usize>(&self) -> FastVector<R, N2, REGS2> {
        FastVector::from_registers(std::array::from_fn(|i| self.register_theoretical(i)))
    }

    /// Sum of the element-wise products over the logical lanes.
    #[inline]
    pub fn dot(&self, other: &Self) -> R::Element {
        self.basic_mul(other).horizontal_sum()
    }

    #[inline]
    pub fn squared_length(&self) -> R::Element {
        self.dot(self)
    }
}

impl<R: SimdRegister, const N: usize, const REGS: usize> Default for FastVector<R, N, REGS> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<R: SimdRegister, const N: usize, const REGS: usize> PartialEq for FastVector<R, N, REGS> {
    fn eq(&self, other: &Self) -> bool {
        self.registers
            .iter()
            .zip(&other.registers)
            .enumerate()
            .all(|(i, (a, b))| {
                let valid = Self::LAYOUT.valid_lanes(i);
                a.keep_lanes(valid, R::zero()) == b.keep_lanes(valid, R::zero())
            })
    }
}

impl<R: SimdRegister, const N: usize, const REGS: usize> From<[R::Element; N]>
    for FastVector<R, N, REGS>
{
    fn from(elements: [R::Element; N]) -> Self {
        Self::from_elements(elements)
    }
}

impl<R: SimdRegister, const N: usize, const REGS: usize> RegisterGrid for FastVector<R, N, REGS> {
    type Register = R;
    type Order = Linear;

    const MAJORS: usize = 1;
    const REGISTERS_PER_MAJOR: usize = REGS;
    const MAJOR_LAYOUT: RegisterLayout = Self::LAYOUT;

    #[inline]
    fn register(&self, _major: usize, index: usize) -> R {
        self.registers[index]
    }

    #[inline]
    fn register_mut(&mut self, _major: usize, index: usize) -> &mut R {
        &mut self.registers[index]
    }
}

/// A vector of any size is applied to every major of the subject. Registers
/// past its end are absent.
impl<R: SimdRegister, O, const N: usize, const REGS: usize> RegisterSource<R, O>
    for FastVector<R, N, REGS>
{
    #[inline]
    fn register_at(&self, _major: usize, index: usize) -> Option<R> {
        self.registers.get(index).copied()
    }

    #[inline]
    fn valid_lanes_at(&self, _major: usize, index: usize) -> usize {
        Self::LAYOUT.valid_lanes(index)
    }
}
