use std::path::Path;

use tracing::debug;

use crate::error::{LoadError, LoadResult};
use crate::plain::Matrix;
use crate::register::Element;

/// A batch of `C x RW` matrices read from a `.npy` array.
///
/// The array is C-ordered with shape `(n, RW, C)` or `(n, RW * C)`; each
/// matrix is stored row after row.
pub trait MatrixBatch: Sized {
    fn load_from_npy(path: impl AsRef<Path>) -> LoadResult<Self>;

    fn from_npy_bytes(bytes: &[u8]) -> LoadResult<Self>;
}

impl<T, const C: usize, const RW: usize> MatrixBatch for Vec<Matrix<T, C, RW>>
where
    T: Element + npyz::Deserialize,
{
    fn load_from_npy(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "read matrix batch");
        Self::from_npy_bytes(&bytes)
    }

    fn from_npy_bytes(bytes: &[u8]) -> LoadResult<Self> {
        let npy = npyz::NpyFile::new(bytes)?;
        if matches!(npy.order(), npyz::Order::Fortran) {
            return Err(LoadError::FortranOrder);
        }

        let shape = npy.shape().to_vec();
        let count = match shape[..] {
            [n, rows, columns] if rows as usize == RW && columns as usize == C => n as usize,
            [n, flat] if flat as usize == RW * C => n as usize,
            _ => return Err(LoadError::shape(format!("(n, {RW}, {C})"), &shape)),
        };

        let values = npy
            .data::<T>()
            .map_err(|err| LoadError::DType(err.to_string()))?
            .collect::<std::io::Result<Vec<T>>>()?;

        let stride = RW * C;
        let matrices: Vec<_> = values
            .chunks_exact(stride)
            .take(count)
            .map(|chunk| Matrix::from_fn(|column, row| chunk[row * C + column]))
            .collect();
        debug!(count = matrices.len(), columns = C, rows = RW, "parsed matrix batch");
        Ok(matrices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npy_bytes(descr: &str, shape: &str, data: &[u8]) -> Vec<u8> {
        let mut header = format!("{{'descr': '{descr}', 'fortran_order': False, 'shape': {shape}, }}");
        let unpadded = 10 + header.len() + 1;
        header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
        header.push('\n');

        let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(data);
        bytes
    }

    fn f32_data(values: impl IntoIterator<Item = f32>) -> Vec<u8> {
        values.into_iter().flat_map(f32::to_le_bytes).collect()
    }

    #[test]
    fn loads_three_dimensional_batches() {
        let bytes = npy_bytes("<f4", "(2, 2, 3)", &f32_data((0..12).map(|v| v as f32)));
        let batch = Vec::<Matrix<f32, 3, 2>>::from_npy_bytes(&bytes).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].to_rows(), [[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]]);
        assert_eq!(batch[1].at(2, 1), 11.0);
    }

    #[test]
    fn loads_flattened_batches() {
        let bytes = npy_bytes("<f4", "(1, 4)", &f32_data([1.0, 2.0, 3.0, 4.0]));
        let batch = Vec::<Matrix<f32, 2, 2>>::from_npy_bytes(&bytes).unwrap();
        assert_eq!(batch[0].to_rows(), [[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn rejects_wrong_shape() {
        let bytes = npy_bytes("<f4", "(1, 3, 3)", &f32_data([0.0; 9]));
        let err = Vec::<Matrix<f32, 2, 2>>::from_npy_bytes(&bytes).unwrap_err();
        assert!(matches!(err, LoadError::Shape { .. }));
    }

    #[test]
    fn rejects_wrong_dtype() {
        let data: Vec<u8> = [1.0f64; 4].iter().flat_map(|v| v.to_le_bytes()).collect();
        let bytes = npy_bytes("<f8", "(1, 2, 2)", &data);
        let err = Vec::<Matrix<f32, 2, 2>>::from_npy_bytes(&bytes).unwrap_err();
        assert!(matches!(err, LoadError::DType(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Vec::<Matrix<f32, 4, 4>>::load_from_npy("does/not/exist.npy").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
