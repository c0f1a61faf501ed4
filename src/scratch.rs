use crate::mutation::RegisterGrid;
use crate::register::{RegisterLayout, SimdRegister};

/// Register-backed scratch holding a grid laid out major by major.
///
/// The buffer is a `Vec<R>`, so every major starts on a register boundary and
/// loads back into fast values without realignment. The generic transpose and
/// the mixed-order multiply stage their data here.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterScratch<R: SimdRegister> {
    registers: Vec<R>,
    majors: usize,
    minors: usize,
    registers_per_major: usize,
}

impl<R: SimdRegister> RegisterScratch<R> {
    /// Zeroed scratch for `majors` runs of `minors` logical elements.
    pub fn zeroed(majors: usize, minors: usize) -> Self {
        let registers_per_major = RegisterLayout::of::<R>(minors).num_registers;
        RegisterScratch {
            registers: vec![R::zero(); majors * registers_per_major],
            majors,
            minors,
            registers_per_major,
        }
    }

    /// Copies every register of `grid`, major then register order.
    pub fn dump<G: RegisterGrid<Register = R>>(grid: &G) -> Self {
        let mut registers = Vec::with_capacity(G::MAJORS * G::REGISTERS_PER_MAJOR);
        for major in 0..G::MAJORS {
            for index in 0..G::REGISTERS_PER_MAJOR {
                registers.push(grid.register(major, index));
            }
        }
        RegisterScratch {
            registers,
            majors: G::MAJORS,
            minors: G::MAJOR_LAYOUT.logical_size,
            registers_per_major: G::REGISTERS_PER_MAJOR,
        }
    }

    pub fn majors(&self) -> usize {
        self.majors
    }

    pub fn minors(&self) -> usize {
        self.minors
    }

    pub fn registers_per_major(&self) -> usize {
        self.registers_per_major
    }

    pub fn register(&self, major: usize, index: usize) -> R {
        self.registers[major * self.registers_per_major + index]
    }

    pub fn major_registers(&self, major: usize) -> &[R] {
        let start = major * self.registers_per_major;
        &self.registers[start..start + self.registers_per_major]
    }

    fn major_registers_mut(&mut self, major: usize) -> &mut [R] {
        let start = major * self.registers_per_major;
        &mut self.registers[start..start + self.registers_per_major]
    }

    pub fn element(&self, major: usize, minor: usize) -> R::Element {
        self.register(major, minor / R::LANES).lane(minor % R::LANES)
    }

    pub fn set_element(&mut self, major: usize, minor: usize, value: R::Element) {
        let slot = &mut self.registers[major * self.registers_per_major + minor / R::LANES];
        *slot = slot.with_lane(minor % R::LANES, value);
    }

    /// The scratch of the transposed grid: `minors` majors of `majors`
    /// elements each, with element `(major, minor)` moved to `(minor, major)`.
    pub fn transposed(&self) -> Self {
        let mut out = Self::zeroed(self.minors, self.majors);
        for major in 0..self.majors {
            for minor in 0..self.minors {
                out.set_element(minor, major, self.element(major, minor));
            }
        }
        out
    }

    /// Writes the scratch back into `grid`.
    ///
    /// # Panics
    /// Panics if the scratch shape differs from the grid's.
    pub fn load_into<G: RegisterGrid<Register = R>>(&self, grid: &mut G) {
        assert_eq!(
            (self.majors, self.registers_per_major),
            (G::MAJORS, G::REGISTERS_PER_MAJOR),
            "scratch shape does not match the target grid"
        );
        for major in 0..G::MAJORS {
            for (index, register) in self.major_registers(major).iter().enumerate() {
                *grid.register_mut(major, index) = *register;
            }
        }
    }
}
