//! Counters collected by the benchmark workers.
//!
//! Each worker thread owns a [`Stats`] and bumps it per kernel call; the
//! driver merges them once the threads are joined and serializes the result
//! into the JSON report.

mod stats;
pub use stats::*;
