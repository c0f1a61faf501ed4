#![feature(portable_simd)]

//! Fixed-size vectors and matrices stored in SIMD registers.
//!
//! Shapes, register widths and major orders are type parameters, so shape
//! mismatches fail to build instead of failing at runtime.

pub mod arithmetic;
pub mod dispatch;
pub mod error;
pub mod fast_matrix;
pub mod fast_vector;
pub mod fs;
pub mod mutation;
pub mod order;
pub mod plain;
pub mod register;
pub mod scratch;
pub mod statistics;

pub use arithmetic::Elementwise;
pub use fast_matrix::FastMatrix;
pub use fast_vector::{FastVector, StoreExtent};
pub use mutation::Mutate;
pub use order::{ColumnMajor, Linear, MajorOrder, RowMajor};

use register::{f32x4, f32x8, f64x2, f64x4};

pub type FastVector4f32 = FastVector<f32x4, 4, 1>;
pub type FastVector3f32 = FastVector<f32x4, 3, 1>;
pub type FastVector8f32 = FastVector<f32x8, 8, 1>;
pub type FastVector4f64 = FastVector<f64x4, 4, 1>;

pub type FastMatrix4x4f32 = FastMatrix<f32x4, 4, 4, 1>;
pub type FastMatrix3x3f32 = FastMatrix<f32x4, 3, 3, 1>;
pub type FastMatrix4x4f64 = FastMatrix<f64x2, 4, 4, 2>;
pub type FastMatrix4x4f32RowMajor = FastMatrix<f32x4, 4, 4, 1, RowMajor>;

pub mod prelude {
    pub use crate::mutation::{RegisterGrid, RegisterSource, With};
    pub use crate::register::SimdRegister;
    pub use crate::{
        ColumnMajor, Elementwise, FastMatrix, FastVector, MajorOrder, Mutate, RowMajor,
        StoreExtent,
    };
}
