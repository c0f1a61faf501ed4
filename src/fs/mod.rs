//! Loading batches of matrices from NumPy `.npy` files.

mod matrix_load;

pub use matrix_load::*;
