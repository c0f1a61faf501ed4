use crate::register::Element;

/// A memory-backed, column-major matrix with `C` columns and `R` rows.
///
/// Besides acting as the conversion source and sink for
/// [`FastMatrix`](crate::FastMatrix), this type is the scalar reference the
/// SIMD paths are checked against: [`Matrix::multiply`] and
/// [`Matrix::determinant`] are straightforward textbook implementations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix<T, const C: usize, const R: usize> {
    columns: [[T; R]; C],
}

impl<T: Element, const C: usize, const R: usize> Matrix<T, C, R> {
    pub const NUM_COLUMNS: usize = C;
    pub const NUM_ROWS: usize = R;
    pub const SIZE: usize = C * R;

    pub fn from_columns(columns: [[T; R]; C]) -> Self {
        Matrix { columns }
    }

    pub fn from_rows(rows: [[T; C]; R]) -> Self {
        Matrix::from_fn(|column, row| rows[row][column])
    }

    /// Builds a matrix from `f(column, row)`.
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> T) -> Self {
        Matrix {
            columns: std::array::from_fn(|column| std::array::from_fn(|row| f(column, row))),
        }
    }

    pub fn zero() -> Self {
        Matrix {
            columns: [[T::zero(); R]; C],
        }
    }

    /// Ones on the main diagonal, zero elsewhere. Non-square shapes get ones
    /// on the leading `min(C, R)` diagonal entries.
    pub fn identity() -> Self {
        Matrix::from_fn(|column, row| if column == row { T::one() } else { T::zero() })
    }

    pub fn at(&self, column: usize, row: usize) -> T {
        self.columns[column][row]
    }

    pub fn set(&mut self, column: usize, row: usize, value: T) {
        self.columns[column][row] = value;
    }

    /// Returns the element at `(column, row)`, or zero when out of range.
    pub fn at_theoretical(&self, column: usize, row: usize) -> T {
        self.columns
            .get(column)
            .and_then(|c| c.get(row))
            .copied()
            .unwrap_or_else(T::zero)
    }

    pub fn column(&self, column: usize) -> &[T; R] {
        &self.columns[column]
    }

    pub fn column_mut(&mut self, column: usize) -> &mut [T; R] {
        &mut self.columns[column]
    }

    pub fn columns(&self) -> &[[T; R]; C] {
        &self.columns
    }

    /// All elements in column-major order.
    pub fn as_column_major_slice(&self) -> &[T] {
        self.columns.as_flattened()
    }

    pub fn to_rows(&self) -> [[T; C]; R] {
        std::array::from_fn(|row| std::array::from_fn(|column| self.at(column, row)))
    }

    pub fn transpose(&self) -> Matrix<T, R, C> {
        Matrix::from_fn(|column, row| self.at(row, column))
    }

    /// Reference standard multiplication: `self (C x R) * rhs (C2 x C)`.
    pub fn multiply<const C2: usize>(&self, rhs: &Matrix<T, C2, C>) -> Matrix<T, C2, R> {
        Matrix::from_fn(|column, row| {
            (0..C).fold(T::zero(), |acc, k| acc + self.at(k, row) * rhs.at(column, k))
        })
    }

    /// Element-wise conversion to another element type and shape; missing
    /// entries are zero.
    pub fn convert<U: Element, const C2: usize, const R2: usize>(&self) -> Matrix<U, C2, R2> {
        Matrix::from_fn(|column, row| U::convert_from(self.at_theoretical(column, row)))
    }

    /// Determinant by cofactor expansion along the first row, computed in
    /// `f64`.
    ///
    /// # Panics
    /// Panics if the matrix is not square.
    pub fn determinant(&self) -> f64 {
        assert_eq!(C, R, "determinant requires a square matrix");
        let rows: Vec<Vec<f64>> = (0..R)
            .map(|row| {
                (0..C)
                    .map(|column| self.at(column, row).to_f64().unwrap_or(f64::NAN))
                    .collect()
            })
            .collect();
        cofactor_determinant(&rows)
    }

    /// `true` when every pair of elements differs by at most `epsilon`.
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.as_column_major_slice()
            .iter()
            .zip(other.as_column_major_slice())
            .all(|(a, b)| {
                let a = a.to_f64().unwrap_or(f64::NAN);
                let b = b.to_f64().unwrap_or(f64::NAN);
                (a - b).abs() <= epsilon
            })
    }
}

fn cofactor_determinant(rows: &[Vec<f64>]) -> f64 {
    match rows.len() {
        0 => 1.0,
        1 => rows[0][0],
        2 => rows[0][0] * rows[1][1] - rows[0][1] * rows[1][0],
        n => (0..n)
            .map(|skip| {
                let minor: Vec<Vec<f64>> = rows[1..]
                    .iter()
                    .map(|row| {
                        row.iter()
                            .enumerate()
                            .filter(|&(column, _)| column != skip)
                            .map(|(_, &value)| value)
                            .collect()
                    })
                    .collect();
                let sign = if skip % 2 == 0 { 1.0 } else { -1.0 };
                sign * rows[0][skip] * cofactor_determinant(&minor)
            })
            .sum(),
    }
}

impl<T: Element, const C: usize, const R: usize> Default for Matrix<T, C, R> {
    fn default() -> Self {
        Self::zero()
    }
}
