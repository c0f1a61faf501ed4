use num_traits::{Float, One, Zero};

use crate::FastMatrix;
use crate::order::MajorOrder;
use crate::register::SimdRegister;

impl<R, const MAJORS: usize, const MINORS: usize, const REGS: usize, O>
    FastMatrix<R, MAJORS, MINORS, REGS, O>
where
    R: SimdRegister,
    O: MajorOrder,
{
    /// Ones on the leading diagonal, zero elsewhere.
    pub fn identity() -> Self {
        Self::from_fn(|column, row| {
            if column == row {
                R::Element::one()
            } else {
                R::Element::zero()
            }
        })
    }

    /// Diagonal scaling by `factors`; diagonal entries past `D` stay one.
    pub fn scale<const D: usize>(factors: [R::Element; D]) -> Self {
        const {
            assert!(
                D <= Self::NUM_COLUMNS && D <= Self::NUM_ROWS,
                "more factors than diagonal entries"
            );
        }
        let mut out = Self::identity();
        for (i, factor) in factors.into_iter().enumerate() {
            out.set(i, i, factor);
        }
        out
    }

    /// Identity with `offsets` in the first `D` rows of the last column.
    pub fn translation<const D: usize>(offsets: [R::Element; D]) -> Self {
        const {
            assert!(MAJORS == MINORS, "translation requires a square matrix");
            assert!(D < MAJORS, "translation needs a homogeneous coordinate");
        }
        let last = Self::NUM_COLUMNS - 1;
        let mut out = Self::identity();
        for (row, offset) in offsets.into_iter().enumerate() {
            out.set(last, row, offset);
        }
        out
    }
}

impl<R, const N: usize, const REGS: usize, O> FastMatrix<R, N, N, REGS, O>
where
    R: SimdRegister,
    R::Element: Float,
    O: MajorOrder,
{
    /// Identity with a rotation by `angle` radians from axis `from` towards
    /// axis `to`.
    fn plane_rotation(from: usize, to: usize, angle: R::Element) -> Self {
        let (sin, cos) = angle.sin_cos();
        let mut out = Self::identity();
        out.set(from, from, cos);
        out.set(to, to, cos);
        out.set(from, to, sin);
        out.set(to, from, -sin);
        out
    }

    /// Right-handed rotation about the x axis, for column vectors.
    pub fn rotation_x(angle: R::Element) -> Self {
        const {
            assert!(N >= 3, "rotation about x needs at least three dimensions");
        }
        Self::plane_rotation(1, 2, angle)
    }

    pub fn rotation_y(angle: R::Element) -> Self {
        const {
            assert!(N >= 3, "rotation about y needs at least three dimensions");
        }
        Self::plane_rotation(2, 0, angle)
    }

    pub fn rotation_z(angle: R::Element) -> Self {
        const {
            assert!(N >= 2, "rotation about z needs at least two dimensions");
        }
        Self::plane_rotation(0, 1, angle)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use crate::order::RowMajor;
    use crate::register::{f32x4, f64x2, i32x4};
    use crate::{FastMatrix, FastVector};

    #[test]
    fn identity_any_shape() {
        let m = FastMatrix::<i32x4, 3, 2, 1>::identity();
        assert_eq!(m.to_rows(), vec![vec![1, 0, 0], vec![0, 1, 0]]);
    }

    #[test]
    fn scale_keeps_remaining_diagonal() {
        let m = FastMatrix::<f64x2, 4, 4, 2>::scale([2.0, 3.0]);
        assert_eq!(m.get(0, 0), Some(2.0));
        assert_eq!(m.get(1, 1), Some(3.0));
        assert_eq!(m.get(2, 2), Some(1.0));
        assert_eq!(m.get(1, 0), Some(0.0));
    }

    #[test]
    fn translation_moves_points() {
        let col = FastMatrix::<f32x4, 4, 4, 1>::translation([1.0, 2.0, 3.0]);
        let row = FastMatrix::<f32x4, 4, 4, 1, RowMajor>::translation([1.0, 2.0, 3.0]);
        assert_eq!(col.to_rows(), row.to_rows());
        let point = FastVector::<f32x4, 4, 1>::from_elements([10.0, 20.0, 30.0, 1.0]);
        assert_eq!(col.multiply_vector(&point).to_vec(), vec![11.0, 22.0, 33.0, 1.0]);
    }

    #[test]
    fn rotations_turn_unit_axes() {
        let x = FastVector::<f32x4, 3, 1>::from_elements([1.0, 0.0, 0.0]);
        let y = FastVector::<f32x4, 3, 1>::from_elements([0.0, 1.0, 0.0]);
        let z = FastVector::<f32x4, 3, 1>::from_elements([0.0, 0.0, 1.0]);

        let rz = FastMatrix::<f32x4, 3, 3, 1>::rotation_z(FRAC_PI_2).multiply_vector(&x);
        let rx = FastMatrix::<f32x4, 3, 3, 1>::rotation_x(FRAC_PI_2).multiply_vector(&y);
        let ry = FastMatrix::<f32x4, 3, 3, 1>::rotation_y(FRAC_PI_2).multiply_vector(&z);

        // x -> y, y -> z, z -> x
        for (got, want) in [(rz, y), (rx, z), (ry, x)] {
            for i in 0..3 {
                assert_relative_eq!(got.to_vec()[i], want.to_vec()[i], epsilon = 1e-6);
            }
        }
    }
}
