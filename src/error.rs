//! Errors raised while reading matrix batches from disk.

use thiserror::Error;

pub type LoadResult<T> = Result<T, LoadError>;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read matrix batch: {0}")]
    Io(#[from] std::io::Error),

    /// The stored dtype is not the requested element type.
    #[error("unexpected dtype: {0}")]
    DType(String),

    #[error("expected shape {expected}, found {found:?}")]
    Shape { expected: String, found: Vec<u64> },

    #[error("fortran-ordered arrays are not supported")]
    FortranOrder,
}

impl LoadError {
    pub fn shape(expected: impl Into<String>, found: &[u64]) -> Self {
        Self::Shape {
            expected: expected.into(),
            found: found.to_vec(),
        }
    }
}
