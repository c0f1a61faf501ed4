//! Benchmarks for fast matrix kernels.
//!
//! Run with: cargo bench --bench fast_matrix

#![feature(portable_simd)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use fastmat::register::{f32x4, f32x8, f64x2};
use fastmat::{Elementwise, FastMatrix, FastMatrix4x4f32, FastMatrix4x4f64, RowMajor};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

const BATCH: usize = 1024;

fn invertible<const N: usize>(rng: &mut StdRng) -> impl FnMut(usize, usize) -> f64 + '_ {
    move |column, row| {
        let noise: f64 = rng.sample(StandardNormal);
        if column == row { noise + 2.0 * N as f64 } else { noise }
    }
}

fn bench_inverse(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let shuffle: Vec<FastMatrix4x4f32> = (0..BATCH)
        .map(|_| {
            let mut f = invertible::<4>(&mut rng);
            FastMatrix4x4f32::from_fn(|col, row| f(col, row) as f32)
        })
        .collect();
    let generic: Vec<FastMatrix4x4f64> = (0..BATCH)
        .map(|_| FastMatrix4x4f64::from_fn(invertible::<4>(&mut rng)))
        .collect();
    let reference: Vec<nalgebra::Matrix4<f64>> = generic
        .iter()
        .map(|m| nalgebra::Matrix4::from_fn(|row, col| m.get_theoretical(col, row)))
        .collect();

    let mut group = c.benchmark_group("inverse");
    group.throughput(Throughput::Elements(BATCH as u64));
    group.bench_function("shuffle_4x4_f32", |b| {
        b.iter(|| {
            for m in &shuffle {
                black_box(m.inverse());
            }
        })
    });
    group.bench_function("gauss_jordan_4x4_f64", |b| {
        b.iter(|| {
            for m in &generic {
                black_box(m.inverse());
            }
        })
    });
    group.bench_function("nalgebra_4x4_f64", |b| {
        b.iter(|| {
            for m in &reference {
                black_box(m.try_inverse());
            }
        })
    });
    group.finish();
}

fn bench_transpose(c: &mut Criterion) {
    let shuffle = FastMatrix4x4f32::from_fn(|col, row| (col * 4 + row) as f32);
    let generic = FastMatrix::<f32x8, 4, 4, 1>::from_fn(|col, row| (col * 4 + row) as f32);
    let rectangular = FastMatrix::<f32x4, 3, 7, 2>::from_fn(|col, row| (col * 7 + row) as f32);

    let mut group = c.benchmark_group("transpose");
    group.bench_function("shuffle_4x4_f32", |b| b.iter(|| black_box(&shuffle).transpose::<1>()));
    group.bench_function("scratch_4x4_f32x8", |b| b.iter(|| black_box(&generic).transpose::<1>()));
    group.bench_function("scratch_3x7_f32", |b| b.iter(|| black_box(&rectangular).transpose::<1>()));
    group.bench_function("reinterpret_4x4_f32", |b| {
        b.iter(|| black_box(&shuffle).transpose_reinterpret())
    });
    group.finish();
}

fn bench_multiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiply");
    for &scale in &[0.5f64, 2.0] {
        let col = FastMatrix::<f64x2, 4, 4, 2>::from_fn(|c, r| (c + r) as f64 * scale);
        let row = FastMatrix::<f64x2, 4, 4, 2, RowMajor>::from_fn(|c, r| (c + r) as f64 * scale);
        group.bench_with_input(BenchmarkId::new("column_major", scale), &col, |b, m| {
            b.iter(|| black_box(m).multiply(m))
        });
        group.bench_with_input(BenchmarkId::new("row_major", scale), &row, |b, m| {
            b.iter(|| black_box(m).multiply(m))
        });
        group.bench_with_input(BenchmarkId::new("mixed_into_column", scale), &(row, col), |b, (r, c)| {
            b.iter(|| {
                let out: FastMatrix<f64x2, 4, 4, 2> = black_box(r).multiply_into(c);
                out
            })
        });
    }
    group.finish();
}

fn bench_elementwise(c: &mut Criterion) {
    let a = FastMatrix::<f32x8, 5, 5, 1>::splat(1.5);
    let b = FastMatrix::<f32x8, 5, 5, 1>::splat(0.25);
    let mut group = c.benchmark_group("elementwise");
    group.bench_function("fmadd_5x5_f32x8", |bench| {
        bench.iter(|| black_box(&a).basic_fmadd(&b, &a))
    });
    group.bench_function("horizontal_sum_5x5_f32x8", |bench| {
        bench.iter(|| black_box(&a).horizontal_sum())
    });
    group.finish();
}

criterion_group!(benches, bench_inverse, bench_transpose, bench_multiply, bench_elementwise);
criterion_main!(benches);
