use thiserror::Error;

/// Errors surfaced by matrix construction, multiplication, and benchmarking.
///
/// Invalid inputs are rejected once, at the top-level call, before any
/// computation; no partial result is ever produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The two operands have different side lengths.
    #[error("matrix size mismatch: {left}x{left} vs {right}x{right}")]
    SizeMismatch { left: usize, right: usize },

    /// A row literal does not match the declared square dimension.
    #[error("row {row} has {cols} columns, expected {expected}")]
    NotSquare {
        row: usize,
        cols: usize,
        expected: usize,
    },

    /// The recursive multipliers require a power-of-two side length of at
    /// least 2.
    #[error("size {0} is not a power of two >= 2")]
    NotPowerOfTwo(usize),

    /// Benchmarking needs at least one timing sample per input.
    #[error("sample count must be at least 1")]
    NoSamples,

    /// No multiplier is registered under the given name.
    #[error("unknown multiplier: {0}")]
    UnknownMultiplier(String),
}
