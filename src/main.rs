#![feature(portable_simd)]

use clap::Parser;
use fastmat::{
    FastMatrix4x4f32,
    dispatch::Kernel,
    error::LoadError,
    fs::MatrixBatch,
    plain::Matrix,
    prelude::*,
    statistics::{Operation, Stats},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;
use serde::Serialize;
use std::{
    hint::black_box,
    path::PathBuf,
    process::ExitCode,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Instant,
};
use thiserror::Error;
use tqdm::tqdm;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Throughput benchmark for 4x4 f32 fast matrices
#[derive(Parser, Debug)]
#[command(name = "fastmat")]
#[command(about = "Benchmarks fast matrix kernels over a batch of 4x4 matrices", long_about = None)]
struct Args {
    /// Path to a (n, 4, 4) f32 matrix batch (numpy format); random matrices otherwise
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Number of random matrices to generate when no input is given
    #[arg(short, long, default_value_t = 100_000)]
    count: usize,

    /// Seed for the random matrices
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Number of worker threads (comma-separated list, e.g., "1,2,4,8")
    #[arg(short, long, value_delimiter = ',', default_value = "1")]
    threads: Vec<usize>,

    /// Operations to run (comma-separated)
    #[arg(short, long, value_enum, value_delimiter = ',', default_values_t = Operation::ALL)]
    operations: Vec<Operation>,

    /// Matrices each worker takes per batch
    #[arg(long, default_value_t = 4096)]
    batch_size: usize,

    /// Where to write the JSON report
    #[arg(short, long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum BenchError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("the matrix batch is empty")]
    EmptyBatch,

    #[error("a benchmark worker panicked")]
    WorkerPanicked,

    #[error("failed to write the report: {0}")]
    Report(#[from] std::io::Error),

    #[error("failed to serialize the report: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct JobReport {
    operation: Operation,
    threads: usize,
    matrices: usize,
    seconds: f64,
    matrices_per_second: f64,
    checksum: f64,
    stats: Stats,
}

#[derive(Debug, Serialize)]
struct Report {
    kernel: Kernel,
    seed: u64,
    jobs: Vec<JobReport>,
}

fn random_matrices(count: usize, seed: u64) -> Vec<FastMatrix4x4f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            // a heavy diagonal keeps every matrix comfortably invertible
            FastMatrix4x4f32::from_fn(|column, row| {
                let noise: f32 = rng.sample(StandardNormal);
                if column == row { noise + 8.0 } else { noise }
            })
        })
        .collect()
}

fn load_matrices(args: &Args) -> Result<Vec<FastMatrix4x4f32>, BenchError> {
    let matrices = match &args.input {
        Some(path) => {
            info!(path = %path.display(), "loading matrix batch");
            Vec::<Matrix<f32, 4, 4>>::load_from_npy(path)?
                .iter()
                .map(FastMatrix4x4f32::from_plain)
                .collect()
        }
        None => {
            info!(count = args.count, seed = args.seed, "generating random matrices");
            random_matrices(args.count, args.seed)
        }
    };
    if matrices.is_empty() {
        return Err(BenchError::EmptyBatch);
    }
    Ok(matrices)
}

/// Runs `operation` once on `m`, bumps `stats` and returns the top-left
/// element of the result.
#[inline]
fn apply(operation: Operation, m: &FastMatrix4x4f32, stats: &mut Stats) -> f32 {
    let registers = FastMatrix4x4f32::NUM_REGISTERS;
    let result = match operation {
        Operation::Multiply => m.multiply(m),
        Operation::Transpose => m.transpose::<1>(),
        Operation::Inverse => m.inverse(),
        Operation::Elementwise => m.basic_fmadd(m, m),
    };
    stats.bump(operation, registers);
    black_box(result).at::<0, 0>()
}

fn run_job(
    matrices: Arc<Vec<FastMatrix4x4f32>>,
    operation: Operation,
    num_threads: usize,
    batch_size: usize,
) -> Result<JobReport, BenchError> {
    let num_matrices = matrices.len();
    debug!(?operation, threads = num_threads, "starting job");
    let start_time = Instant::now();

    let next_batch = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let matrices = Arc::clone(&matrices);
            let next_batch = Arc::clone(&next_batch);

            thread::spawn(move || {
                let mut local_stats = Stats::new();
                let mut local_sum = 0.0f64;
                loop {
                    let batch_start = next_batch.fetch_add(batch_size, Ordering::Relaxed);
                    if batch_start >= num_matrices {
                        break;
                    }
                    let batch_end = (batch_start + batch_size).min(num_matrices);
                    for m in &matrices[batch_start..batch_end] {
                        local_sum += f64::from(apply(operation, m, &mut local_stats));
                    }
                }
                (local_sum, local_stats)
            })
        })
        .collect();

    let mut checksum = 0.0;
    let mut stats = Stats::new();
    for handle in handles {
        let (local_sum, local_stats) = handle.join().map_err(|_| BenchError::WorkerPanicked)?;
        checksum += local_sum;
        stats = stats.merge(&local_stats);
    }

    let seconds = start_time.elapsed().as_secs_f64();
    let report = JobReport {
        operation,
        threads: num_threads,
        matrices: num_matrices,
        seconds,
        matrices_per_second: num_matrices as f64 / seconds,
        checksum,
        stats,
    };
    info!(
        ?operation,
        threads = num_threads,
        seconds = report.seconds,
        matrices_per_second = report.matrices_per_second,
        checksum = report.checksum,
        "job completed"
    );
    Ok(report)
}

fn run(args: Args) -> Result<(), BenchError> {
    let matrices = Arc::new(load_matrices(&args)?);
    let kernel = FastMatrix4x4f32::DESCRIPTOR.kernel();
    info!(matrices = matrices.len(), ?kernel, "matrices ready");

    let jobs: Vec<(usize, Operation)> = args
        .threads
        .iter()
        .flat_map(|&threads| args.operations.iter().map(move |&op| (threads, op)))
        .collect();
    info!(threads = ?args.threads, operations = ?args.operations, total = jobs.len(), "starting sweep");

    let mut reports = Vec::with_capacity(jobs.len());
    for (threads, operation) in tqdm(jobs.into_iter()) {
        reports.push(run_job(
            Arc::clone(&matrices),
            operation,
            threads.max(1),
            args.batch_size.max(1),
        )?);
    }

    let report = Report {
        kernel,
        seed: args.seed,
        jobs: reports,
    };
    match &args.report {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            serde_json::to_writer_pretty(file, &report)?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "benchmark failed");
            ExitCode::FAILURE
        }
    }
}
