use tracing::trace;

use crate::arithmetic::Elementwise;
use crate::mutation::RegisterGrid;
use crate::order::{ColumnMajor, MajorOrder, RowMajor};
use crate::register::SimdRegister;
use crate::scratch::RegisterScratch;
use crate::{FastMatrix, FastVector};

/// `out[p] = sum over k of majors[k] * weights[p][k]`, accumulated with fused
/// multiply-add.
///
/// With column-major operands `majors` are the left-hand columns and
/// `weights` the right-hand columns. With row-major operands the roles swap:
/// `majors` are the right-hand rows and `weights` the left-hand rows.
#[inline]
fn accumulate<R, const N: usize, const REGS: usize, const K: usize, const WREGS: usize, const P: usize>(
    majors: &[FastVector<R, N, REGS>; K],
    weights: &[FastVector<R, K, WREGS>; P],
) -> [FastVector<R, N, REGS>; P]
where
    R: SimdRegister,
{
    std::array::from_fn(|p| {
        let weight = &weights[p];
        majors
            .iter()
            .enumerate()
            .fold(FastVector::zero(), |acc, (k, major)| {
                major.basic_fmadd(&R::splat(weight.lane(k)), &acc)
            })
    })
}

impl<R: SimdRegister, const K: usize, const M: usize, const REGS: usize>
    FastMatrix<R, K, M, REGS, ColumnMajor>
{
    /// Standard product `self (M x K) * rhs (K x P)`. Mismatched inner
    /// dimensions do not type-check.
    pub fn multiply<const P: usize, const RREGS: usize>(
        &self,
        rhs: &FastMatrix<R, P, K, RREGS, ColumnMajor>,
    ) -> FastMatrix<R, P, M, REGS, ColumnMajor> {
        FastMatrix::from_majors(accumulate(&self.majors, &rhs.majors))
    }

    /// `self (M x K) * v (K)`.
    pub fn multiply_vector<const VREGS: usize>(
        &self,
        v: &FastVector<R, K, VREGS>,
    ) -> FastVector<R, M, REGS> {
        let [out] = accumulate(&self.majors, &[*v]);
        out
    }
}

impl<R: SimdRegister, const M: usize, const K: usize, const REGS: usize>
    FastMatrix<R, M, K, REGS, RowMajor>
{
    /// Standard product `self (M x K) * rhs (K x P)`. Mismatched inner
    /// dimensions do not type-check.
    pub fn multiply<const P: usize, const RREGS: usize>(
        &self,
        rhs: &FastMatrix<R, K, P, RREGS, RowMajor>,
    ) -> FastMatrix<R, M, P, RREGS, RowMajor> {
        FastMatrix::from_majors(accumulate(&rhs.majors, &self.majors))
    }

    /// `self (M x K) * v (K)`; `OREGS` is the register count of the result.
    pub fn multiply_vector<const OREGS: usize>(
        &self,
        v: &FastVector<R, K, REGS>,
    ) -> FastVector<R, M, OREGS> {
        FastVector::from_fn(|row| self.majors[row].dot(v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MultiplyPlan {
    /// Output columns accumulate left-hand columns.
    ColumnFma { transpose_lhs: bool },
    /// Output rows accumulate right-hand rows.
    RowFma { transpose_rhs: bool },
}

impl MultiplyPlan {
    const fn of<O: MajorOrder, RO: MajorOrder, OO: MajorOrder>() -> Self {
        if OO::IS_COLUMN_MAJOR {
            MultiplyPlan::ColumnFma {
                transpose_lhs: !O::IS_COLUMN_MAJOR,
            }
        } else {
            MultiplyPlan::RowFma {
                transpose_rhs: RO::IS_COLUMN_MAJOR,
            }
        }
    }
}

fn staged<G: RegisterGrid>(grid: &G, transpose: bool) -> RegisterScratch<G::Register> {
    let scratch = RegisterScratch::dump(grid);
    if transpose { scratch.transposed() } else { scratch }
}

impl<R, const MAJORS: usize, const MINORS: usize, const REGS: usize, O>
    FastMatrix<R, MAJORS, MINORS, REGS, O>
where
    R: SimdRegister,
    O: MajorOrder,
{
    /// Standard product for any combination of major orders.
    ///
    /// The output order and shape come from the result type. Operands whose
    /// majors run the wrong way for the output are transposed through register
    /// scratch first. Shapes that do not chain fail to build.
    pub fn multiply_into<
        const RMAJORS: usize,
        const RMINORS: usize,
        const RREGS: usize,
        RO: MajorOrder,
        const OMAJORS: usize,
        const OMINORS: usize,
        const OREGS: usize,
        OO: MajorOrder,
    >(
        &self,
        rhs: &FastMatrix<R, RMAJORS, RMINORS, RREGS, RO>,
    ) -> FastMatrix<R, OMAJORS, OMINORS, OREGS, OO> {
        const {
            assert!(
                Self::NUM_COLUMNS == FastMatrix::<R, RMAJORS, RMINORS, RREGS, RO>::NUM_ROWS,
                "inner dimensions differ"
            );
            assert!(
                FastMatrix::<R, OMAJORS, OMINORS, OREGS, OO>::NUM_ROWS == Self::NUM_ROWS,
                "output rows differ from left-hand rows"
            );
            assert!(
                FastMatrix::<R, OMAJORS, OMINORS, OREGS, OO>::NUM_COLUMNS
                    == FastMatrix::<R, RMAJORS, RMINORS, RREGS, RO>::NUM_COLUMNS,
                "output columns differ from right-hand columns"
            );
        }
        let plan = MultiplyPlan::of::<O, RO, OO>();
        trace!(?plan, lhs = ?Self::DESCRIPTOR, "multiply plan");

        let inner = Self::NUM_COLUMNS;
        let mut out = FastMatrix::<R, OMAJORS, OMINORS, OREGS, OO>::zero();
        match plan {
            MultiplyPlan::ColumnFma { transpose_lhs } => {
                let columns = staged(self, transpose_lhs);
                for j in 0..OMAJORS {
                    for k in 0..inner {
                        let weight = R::splat(rhs.get_theoretical(j, k));
                        for index in 0..OREGS {
                            let slot = out.register_mut(j, index);
                            *slot = columns.register(k, index).mul_add(weight, *slot);
                        }
                    }
                }
            }
            MultiplyPlan::RowFma { transpose_rhs } => {
                let rows = staged(rhs, transpose_rhs);
                for i in 0..OMAJORS {
                    for k in 0..inner {
                        let weight = R::splat(self.get_theoretical(k, i));
                        for index in 0..OREGS {
                            let slot = out.register_mut(i, index);
                            *slot = rows.register(k, index).mul_add(weight, *slot);
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plain::Matrix;
    use crate::register::{f32x4, f64x2, i32x4};

    fn reference<const C: usize, const RW: usize, const C2: usize>(
        a: impl Fn(usize, usize) -> f32,
        b: impl Fn(usize, usize) -> f32,
    ) -> Matrix<f32, C2, RW> {
        let a = Matrix::<f32, C, RW>::from_fn(a);
        let b = Matrix::<f32, C2, C>::from_fn(b);
        a.multiply(&b)
    }

    fn a_fn(c: usize, r: usize) -> f32 {
        (c as f32) * 0.5 - (r as f32) + 1.0
    }

    fn b_fn(c: usize, r: usize) -> f32 {
        (r * 3 + c) as f32 * 0.25
    }

    #[test]
    fn column_major_matches_reference() {
        // (5 x 3) * (3 x 2)
        let a = FastMatrix::<f32x4, 3, 5, 2>::from_fn(a_fn);
        let b = FastMatrix::<f32x4, 2, 3, 1>::from_fn(b_fn);
        let c = a.multiply(&b);
        let expected = reference::<3, 5, 2>(a_fn, b_fn);
        for col in 0..2 {
            for row in 0..5 {
                assert_eq!(c.get(col, row), Some(expected.at(col, row)));
            }
        }
    }

    #[test]
    fn row_major_matches_reference() {
        let a = FastMatrix::<f32x4, 5, 3, 1, RowMajor>::from_fn(a_fn);
        let b = FastMatrix::<f32x4, 3, 2, 1, RowMajor>::from_fn(b_fn);
        let c = a.multiply(&b);
        let expected = reference::<3, 5, 2>(a_fn, b_fn);
        for col in 0..2 {
            for row in 0..5 {
                assert_eq!(c.get(col, row), Some(expected.at(col, row)));
            }
        }
    }

    #[test]
    fn mixed_orders_match_reference() {
        let expected = reference::<3, 5, 2>(a_fn, b_fn);
        let a_col = FastMatrix::<f32x4, 3, 5, 2, ColumnMajor>::from_fn(a_fn);
        let a_row = FastMatrix::<f32x4, 5, 3, 1, RowMajor>::from_fn(a_fn);
        let b_col = FastMatrix::<f32x4, 2, 3, 1, ColumnMajor>::from_fn(b_fn);
        let b_row = FastMatrix::<f32x4, 3, 2, 1, RowMajor>::from_fn(b_fn);

        let c1: FastMatrix<f32x4, 2, 5, 2, ColumnMajor> = a_row.multiply_into(&b_col);
        let c2: FastMatrix<f32x4, 5, 2, 1, RowMajor> = a_col.multiply_into(&b_row);
        let c3: FastMatrix<f32x4, 5, 2, 1, RowMajor> = a_row.multiply_into(&b_col);
        let c4: FastMatrix<f32x4, 2, 5, 2, ColumnMajor> = a_col.multiply_into(&b_col);
        for col in 0..2 {
            for row in 0..5 {
                let e = Some(expected.at(col, row));
                assert_eq!(c1.get(col, row), e);
                assert_eq!(c2.get(col, row), e);
                assert_eq!(c3.get(col, row), e);
                assert_eq!(c4.get(col, row), e);
            }
        }
        assert_eq!(c4, a_col.multiply(&b_col));
    }

    #[test]
    fn identity_is_neutral() {
        let m = FastMatrix::<f64x2, 3, 3, 2>::from_fn(|c, r| (c * 7 + r * 3) as f64);
        let id = FastMatrix::<f64x2, 3, 3, 2>::identity();
        assert_eq!(m.multiply(&id), m);
        assert_eq!(id.multiply(&m), m);
    }

    #[test]
    fn integer_multiply() {
        let a = FastMatrix::<i32x4, 2, 2, 1, RowMajor>::from_fn(|c, r| (r * 2 + c + 1) as i32);
        let b = FastMatrix::<i32x4, 2, 2, 1, RowMajor>::from_fn(|c, r| (r * 2 + c + 5) as i32);
        // [[1 2] [3 4]] * [[5 6] [7 8]]
        assert_eq!(a.multiply(&b).to_rows(), vec![vec![19, 22], vec![43, 50]]);
    }

    #[test]
    fn matrix_vector_both_orders() {
        let col = FastMatrix::<f32x4, 3, 2, 1>::from_fn(|c, r| (r * 3 + c) as f32);
        let row = FastMatrix::<f32x4, 2, 3, 1, RowMajor>::from_fn(|c, r| (r * 3 + c) as f32);
        let v = FastVector::<f32x4, 3, 1>::from_elements([1.0, 2.0, 3.0]);
        // [[0 1 2] [3 4 5]] * [1 2 3]
        assert_eq!(col.multiply_vector(&v).to_vec(), vec![8.0, 26.0]);
        assert_eq!(row.multiply_vector::<1>(&v).to_vec(), vec![8.0, 26.0]);
    }

    #[test]
    fn plan_stages_only_operands_running_the_wrong_way() {
        assert_eq!(
            MultiplyPlan::of::<ColumnMajor, RowMajor, ColumnMajor>(),
            MultiplyPlan::ColumnFma { transpose_lhs: false }
        );
        assert_eq!(
            MultiplyPlan::of::<RowMajor, RowMajor, ColumnMajor>(),
            MultiplyPlan::ColumnFma { transpose_lhs: true }
        );
        assert_eq!(
            MultiplyPlan::of::<ColumnMajor, RowMajor, RowMajor>(),
            MultiplyPlan::RowFma { transpose_rhs: false }
        );
        assert_eq!(
            MultiplyPlan::of::<RowMajor, ColumnMajor, RowMajor>(),
            MultiplyPlan::RowFma { transpose_rhs: true }
        );
    }
}
