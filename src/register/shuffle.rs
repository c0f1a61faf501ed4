//! In-register shuffle kernels for 4x4 `f32` blocks held in four 128-bit
//! registers.
//!
//! The kernels only see four registers; whether those are rows or columns is
//! up to the caller. Both the transpose and the inverse commute with
//! transposition, so the same kernel serves column-major and row-major data.

use std::simd::{f32x4, simd_swizzle};

/// `[a0, b0, a1, b1]`
#[inline]
fn unpack_lo(a: f32x4, b: f32x4) -> f32x4 {
    simd_swizzle!(a, b, [0, 4, 1, 5])
}

/// `[a2, b2, a3, b3]`
#[inline]
fn unpack_hi(a: f32x4, b: f32x4) -> f32x4 {
    simd_swizzle!(a, b, [2, 6, 3, 7])
}

/// `[a0, a1, b0, b1]`
#[inline]
fn move_lh(a: f32x4, b: f32x4) -> f32x4 {
    simd_swizzle!(a, b, [0, 1, 4, 5])
}

/// `[a2, a3, b2, b3]`
#[inline]
fn move_hl(a: f32x4, b: f32x4) -> f32x4 {
    simd_swizzle!(a, b, [2, 3, 6, 7])
}

/// Transposes a 4x4 block using paired unpack/move shuffles, without a
/// round-trip through memory.
#[inline]
pub fn transpose4(m: [f32x4; 4]) -> [f32x4; 4] {
    let t0 = unpack_lo(m[0], m[1]);
    let t1 = unpack_lo(m[2], m[3]);
    let t2 = unpack_hi(m[0], m[1]);
    let t3 = unpack_hi(m[2], m[3]);
    [
        move_lh(t0, t1),
        move_hl(t0, t1),
        move_lh(t2, t3),
        move_hl(t2, t3),
    ]
}

// A 2x2 block is packed into one register as [x y z w] = [[x y] [z w]].

/// `a * b` for two packed 2x2 blocks.
#[inline]
fn mat2_mul(a: f32x4, b: f32x4) -> f32x4 {
    a * simd_swizzle!(b, [0, 3, 0, 3]) + simd_swizzle!(a, [1, 0, 3, 2]) * simd_swizzle!(b, [2, 1, 2, 1])
}

/// `adj(a) * b` for two packed 2x2 blocks.
#[inline]
fn mat2_adj_mul(a: f32x4, b: f32x4) -> f32x4 {
    simd_swizzle!(a, [3, 3, 0, 0]) * b - simd_swizzle!(a, [1, 1, 2, 2]) * simd_swizzle!(b, [2, 3, 0, 1])
}

/// `a * adj(b)` for two packed 2x2 blocks.
#[inline]
fn mat2_mul_adj(a: f32x4, b: f32x4) -> f32x4 {
    a * simd_swizzle!(b, [3, 0, 3, 0]) - simd_swizzle!(a, [1, 0, 3, 2]) * simd_swizzle!(b, [2, 1, 2, 1])
}

#[inline]
fn broadcast_lane<const L: usize>(v: f32x4) -> f32x4 {
    f32x4::splat(v[L])
}

/// Inverts a 4x4 block with the 2x2 block-adjugate method.
///
/// Returns the four inverse registers and the determinant splat across a
/// register. The input must be invertible; a singular block yields
/// non-finite lanes.
#[inline]
pub fn inverse4(m: [f32x4; 4]) -> ([f32x4; 4], f32x4) {
    let a = move_lh(m[0], m[1]);
    let b = move_hl(m[0], m[1]);
    let c = move_lh(m[2], m[3]);
    let d = move_hl(m[2], m[3]);

    // (|A|, |B|, |C|, |D|)
    let det_sub = simd_swizzle!(m[0], m[2], [0, 2, 4, 6]) * simd_swizzle!(m[1], m[3], [1, 3, 5, 7])
        - simd_swizzle!(m[0], m[2], [1, 3, 5, 7]) * simd_swizzle!(m[1], m[3], [0, 2, 4, 6]);
    let det_a = broadcast_lane::<0>(det_sub);
    let det_b = broadcast_lane::<1>(det_sub);
    let det_c = broadcast_lane::<2>(det_sub);
    let det_d = broadcast_lane::<3>(det_sub);

    let d_c = mat2_adj_mul(d, c);
    let a_b = mat2_adj_mul(a, b);

    let x = det_d * a - mat2_mul(b, d_c);
    let w = det_a * d - mat2_mul(c, a_b);
    let y = det_b * c - mat2_mul_adj(d, a_b);
    let z = det_c * b - mat2_mul_adj(a, d_c);

    // |M| = |A||D| + |B||C| - tr((A#B)(D#C))
    let trace = (a_b * simd_swizzle!(d_c, [0, 2, 1, 3])).reduce_sum_splat();
    let det = det_a * det_d + det_b * det_c - trace;

    let signed_reciprocal = f32x4::from_array([1.0, -1.0, -1.0, 1.0]) / det;
    let x = x * signed_reciprocal;
    let y = y * signed_reciprocal;
    let z = z * signed_reciprocal;
    let w = w * signed_reciprocal;

    (
        [
            simd_swizzle!(x, y, [3, 1, 7, 5]),
            simd_swizzle!(x, y, [2, 0, 6, 4]),
            simd_swizzle!(z, w, [3, 1, 7, 5]),
            simd_swizzle!(z, w, [2, 0, 6, 4]),
        ],
        det,
    )
}

trait HorizontalSplat {
    fn reduce_sum_splat(self) -> Self;
}

impl HorizontalSplat for f32x4 {
    #[inline]
    fn reduce_sum_splat(self) -> Self {
        let pairs = self + simd_swizzle!(self, [1, 0, 3, 2]);
        pairs + simd_swizzle!(pairs, [2, 3, 0, 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(m: [[f32; 4]; 4]) -> [f32x4; 4] {
        m.map(f32x4::from_array)
    }

    fn scalar_mul(a: &[[f32; 4]; 4], b: &[[f32; 4]; 4]) -> [[f32; 4]; 4] {
        let mut out = [[0.0; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    out[i][j] += a[i][k] * b[k][j];
                }
            }
        }
        out
    }

    #[test]
    fn transpose_swaps_rows_and_columns() {
        let m = rows([
            [0.0, 1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0, 7.0],
            [8.0, 9.0, 10.0, 11.0],
            [12.0, 13.0, 14.0, 15.0],
        ]);
        let t = transpose4(m);
        assert_eq!(t[0].to_array(), [0.0, 4.0, 8.0, 12.0]);
        assert_eq!(t[1].to_array(), [1.0, 5.0, 9.0, 13.0]);
        assert_eq!(t[2].to_array(), [2.0, 6.0, 10.0, 14.0]);
        assert_eq!(t[3].to_array(), [3.0, 7.0, 11.0, 15.0]);
        assert_eq!(transpose4(t), m);
    }

    #[test]
    fn inverse_of_identity_is_identity() {
        let id = rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let (inv, det) = inverse4(id);
        assert_eq!(inv, id);
        assert_eq!(det.to_array(), [1.0; 4]);
    }

    #[test]
    fn inverse_times_original_is_identity() {
        let m = [
            [4.0, 7.0, 2.0, 3.0],
            [0.0, 5.0, 0.0, 1.0],
            [1.0, 0.0, 6.0, 0.0],
            [2.0, 1.0, 0.0, 8.0],
        ];
        let (inv, _) = inverse4(rows(m));
        let inv = inv.map(|r| r.to_array());
        let product = scalar_mul(&m, &inv);
        for (i, row) in product.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (value - expected).abs() < 1e-4,
                    "product[{i}][{j}] = {value}"
                );
            }
        }
    }

    #[test]
    fn determinant_of_diagonal_is_product() {
        let m = rows([
            [2.0, 0.0, 0.0, 0.0],
            [0.0, 3.0, 0.0, 0.0],
            [0.0, 0.0, 4.0, 0.0],
            [0.0, 0.0, 0.0, 0.5],
        ]);
        let (inv, det) = inverse4(m);
        assert_eq!(det.to_array(), [12.0; 4]);
        assert_eq!(inv[0].to_array(), [0.5, 0.0, 0.0, 0.0]);
        assert_eq!(inv[3].to_array(), [0.0, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn horizontal_splat_sums_all_lanes() {
        let v = f32x4::from_array([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(v.reduce_sum_splat().to_array(), [10.0; 4]);
    }
}
