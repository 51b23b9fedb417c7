//! Benchmark driver: sweeps doubling matrix sizes, feeding identical random
//! input pairs to every selected multiplier and reporting per-size average
//! runtimes.
//!
//! Inputs are generated once per (size, input) step and handed to every
//! registered benchmarker, so all multipliers are measured against the same
//! matrices without any of them being stored.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use matmul_analysis::{Benchmarker, Elem, Multiplier, SquareMatrix};

const DEFAULT_SEED: u64 = 0x1234_5678_9ABC_DEF0;
const ELEMENT_RANGE: u64 = 1000;

#[derive(Parser, Debug)]
#[command(name = "mm_bench", about = "Runtime analysis of matrix multiplication strategies")]
struct Cli {
    /// Largest matrix side length; the sweep doubles from 2 up to here.
    #[arg(long, default_value_t = 512)]
    max_size: usize,

    /// Random input pairs generated per size.
    #[arg(long, default_value_t = 1000)]
    inputs_per_size: usize,

    /// Timing samples taken per input pair.
    #[arg(long, default_value_t = 20)]
    samples_per_input: usize,

    /// Multipliers to benchmark.
    #[arg(
        long,
        value_delimiter = ',',
        default_values = ["iterative", "divide-conquer", "strassen"]
    )]
    multipliers: Vec<Multiplier>,

    /// Seed for deterministic input generation.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Report destination; falls back to the console on write failure.
    #[arg(short, long, default_value = "data.csv")]
    output: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
    Text,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if cli.max_size < 2 || !cli.max_size.is_power_of_two() {
        bail!("--max-size must be a power of two >= 2, got {}", cli.max_size);
    }
    if cli.inputs_per_size == 0 {
        bail!("--inputs-per-size must be at least 1");
    }
    if cli.samples_per_input == 0 {
        bail!("--samples-per-input must be at least 1");
    }
    if cli.multipliers.is_empty() {
        bail!("at least one multiplier must be selected");
    }

    let mut benchmarks: Vec<Benchmarker> = cli
        .multipliers
        .iter()
        .map(|&m| Benchmarker::new(m))
        .collect();

    info!(
        max_size = cli.max_size,
        inputs = cli.inputs_per_size,
        samples = cli.samples_per_input,
        "starting sweep"
    );

    let mut state = cli.seed;
    let mut size = 2usize;
    while size <= cli.max_size {
        let bar = ProgressBar::new(cli.inputs_per_size as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{msg:>10} [{bar:50.cyan/blue}] {pos}/{len} ({elapsed_precise})",
            )?
            .progress_chars("#>-"),
        );
        bar.set_message(format!("size {size}"));

        for _ in 0..cli.inputs_per_size {
            let a = random_matrix(size, &mut state);
            let b = random_matrix(size, &mut state);
            for bench in &mut benchmarks {
                bench
                    .benchmark_input(&a, &b, cli.samples_per_input)
                    .with_context(|| {
                        format!("benchmarking {} at size {size}", bench.algorithm())
                    })?;
            }
            bar.inc(1);
        }
        bar.finish();
        debug!(size, "size sweep complete");
        size <<= 1;
    }

    let report = Report::collect(&benchmarks);
    let rendered = render(&report, cli.format)?;
    match write_out(&cli.output, &rendered) {
        Ok(()) => info!(path = %cli.output.display(), "results saved"),
        Err(err) => {
            warn!("failed to write {}: {err:#}", cli.output.display());
            println!("{rendered}");
        }
    }
    Ok(())
}

/// xorshift64*, seeded once per run.
#[inline]
fn next_u64(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    *state = x;
    x.wrapping_mul(0x2545_F491_4F6C_DD1D)
}

fn random_matrix(size: usize, state: &mut u64) -> SquareMatrix {
    SquareMatrix::from_fn(size, |_, _| (next_u64(state) % ELEMENT_RANGE) as Elem + 1)
}

#[derive(Serialize)]
struct Report {
    multipliers: Vec<MultiplierReport>,
}

#[derive(Serialize)]
struct MultiplierReport {
    name: &'static str,
    averages: Vec<SizeAverage>,
}

#[derive(Serialize)]
struct SizeAverage {
    size: usize,
    mean_ns: f64,
}

impl Report {
    fn collect(benchmarks: &[Benchmarker]) -> Self {
        Report {
            multipliers: benchmarks
                .iter()
                .map(|bench| MultiplierReport {
                    name: bench.algorithm().name(),
                    averages: bench
                        .average_runtimes()
                        .into_iter()
                        .map(|(size, mean_ns)| SizeAverage { size, mean_ns })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Every size any multiplier was measured at, ascending.
    fn sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self
            .multipliers
            .iter()
            .flat_map(|m| m.averages.iter().map(|avg| avg.size))
            .collect();
        sizes.sort_unstable();
        sizes.dedup();
        sizes
    }
}

impl MultiplierReport {
    fn mean_for(&self, size: usize) -> Option<f64> {
        self.averages
            .iter()
            .find(|avg| avg.size == size)
            .map(|avg| avg.mean_ns)
    }
}

fn render(report: &Report, format: Format) -> Result<String> {
    match format {
        Format::Csv => Ok(render_csv(report)),
        Format::Json => serde_json::to_string_pretty(report).context("serializing report"),
        Format::Text => Ok(render_text(report)),
    }
}

/// One row per multiplier, one column per size, mean runtimes in
/// nanoseconds.
fn render_csv(report: &Report) -> String {
    let sizes = report.sizes();
    let mut out = String::from("multiplier");
    for size in &sizes {
        out.push_str(&format!(",{size}"));
    }
    out.push('\n');
    for multiplier in &report.multipliers {
        out.push_str(multiplier.name);
        for &size in &sizes {
            match multiplier.mean_for(size) {
                Some(mean) => out.push_str(&format!(",{mean}")),
                None => out.push(','),
            }
        }
        out.push('\n');
    }
    out
}

fn render_text(report: &Report) -> String {
    let sizes = report.sizes();
    let mut out = String::from("mean runtime per multiplication (ns)\n\n");
    out.push_str(&format!("{:>8}", "size"));
    for multiplier in &report.multipliers {
        out.push_str(&format!("  {:>16}", multiplier.name));
    }
    out.push('\n');
    for &size in &sizes {
        out.push_str(&format!("{size:>8}"));
        for multiplier in &report.multipliers {
            match multiplier.mean_for(size) {
                Some(mean) => out.push_str(&format!("  {mean:>16.1}")),
                None => out.push_str(&format!("  {:>16}", "-")),
            }
        }
        out.push('\n');
    }
    out
}

fn write_out(path: &Path, rendered: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    file.write_all(rendered.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
