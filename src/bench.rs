//! Timing harness: drives one multiplier against supplied inputs and keeps
//! a streaming runtime average per input size.

use std::collections::BTreeMap;
use std::hint::black_box;
use std::time::Instant;

use tracing::debug;

use crate::error::Error;
use crate::matrix::SquareMatrix;
use crate::multiply::Multiplier;
use crate::stats::RunningAverage;

/// Benchmarks a single [`Multiplier`], folding each input's mean runtime
/// into a running average keyed by matrix size.
///
/// One instance per multiplier under test; the size-to-average map is owned
/// here exclusively and iterates in ascending size order.
#[derive(Clone, Debug)]
pub struct Benchmarker {
    algorithm: Multiplier,
    averages: BTreeMap<usize, RunningAverage>,
}

impl Benchmarker {
    pub fn new(algorithm: Multiplier) -> Self {
        Self {
            algorithm,
            averages: BTreeMap::new(),
        }
    }

    /// The multiplier under test.
    pub fn algorithm(&self) -> Multiplier {
        self.algorithm
    }

    /// Times `samples` runs of the multiplier against one input pair and
    /// folds the mean sample duration (nanoseconds) into the bucket for the
    /// input size, creating the bucket on first encounter.
    ///
    /// The same inputs are reused for every sample and never mutated;
    /// products are discarded. Inputs are validated once, before the first
    /// sample, so a rejected pair contaminates no average.
    pub fn benchmark_input(
        &mut self,
        a: &SquareMatrix,
        b: &SquareMatrix,
        samples: usize,
    ) -> Result<(), Error> {
        if samples == 0 {
            return Err(Error::NoSamples);
        }
        self.algorithm.validate(a, b)?;

        let mut total_ns = 0.0f64;
        for _ in 0..samples {
            let start = Instant::now();
            let product = self.algorithm.dispatch(a, b);
            let elapsed = start.elapsed();
            black_box(product);
            total_ns += elapsed.as_nanos() as f64;
        }
        let input_mean = total_ns / samples as f64;

        let size = a.size();
        let name = self.algorithm.name();
        let bucket = self.averages.entry(size).or_insert_with(|| {
            debug!(algorithm = name, size, "new size bucket");
            RunningAverage::new()
        });
        bucket.add(input_mean);
        Ok(())
    }

    /// Mean-of-means per size, ascending by size.
    pub fn average_runtimes(&self) -> BTreeMap<usize, f64> {
        self.averages
            .iter()
            .map(|(&size, avg)| (size, avg.average()))
            .collect()
    }

    /// Mean runtime for one size, in nanoseconds.
    ///
    /// Returns `0.0` for a size never benchmarked; callers that cannot rule
    /// out an unseen size must check [`Self::average_runtimes`] for presence
    /// before treating the value as a measurement.
    pub fn average_runtime(&self, size: usize) -> f64 {
        self.averages
            .get(&size)
            .map_or(0.0, RunningAverage::average)
    }
}
