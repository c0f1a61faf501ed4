//! Plain, memory-backed vector and matrix types.
//!
//! These are the collaborators the SIMD engine converts from and stores to.
//! They are deliberately simple: no register layout, no dispatch.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
