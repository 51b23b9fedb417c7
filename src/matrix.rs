//! Square matrix storage and quadrant addressing.
//!
//! Matrices are `n x n` in row-major order over a single integral element
//! type. The recursive multipliers never copy sub-matrices: a [`Quad`] names
//! a square window of some backing array by (row offset, column offset, side
//! length), and kernels thread the backing slice and its stride alongside
//! every window they touch.

use crate::error::Error;

/// Element type shared by every multiplication strategy.
///
/// Integral, so the outputs of different strategies can be compared exactly.
/// Duration statistics stay floating point; this alias only governs matrix
/// cells.
pub type Elem = i64;

/// A square, row-major, heap-backed matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquareMatrix {
    size: usize,
    data: Vec<Elem>,
}

impl SquareMatrix {
    /// Allocates a zero-filled `size x size` matrix.
    pub fn zeroed(size: usize) -> Self {
        Self {
            size,
            data: vec![0; size * size],
        }
    }

    /// Builds a matrix from row literals, validating squareness.
    pub fn from_rows(rows: &[&[Elem]]) -> Result<Self, Error> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != size {
                return Err(Error::NotSquare {
                    row,
                    cols: values.len(),
                    expected: size,
                });
            }
            data.extend_from_slice(values);
        }
        Ok(Self { size, data })
    }

    /// Builds a matrix by evaluating `f(row, col)` for every cell in
    /// row-major order.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> Elem) -> Self {
        let mut data = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                data.push(f(row, col));
            }
        }
        Self { size, data }
    }

    /// Side length `n`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Elem {
        self.data[row * self.size + col]
    }

    /// Overwrites the element at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Elem) {
        self.data[row * self.size + col] = value;
    }

    /// Row-major backing storage.
    pub fn as_slice(&self) -> &[Elem] {
        &self.data
    }

    /// Mutable row-major backing storage.
    pub fn as_mut_slice(&mut self) -> &mut [Elem] {
        &mut self.data
    }
}

/// A square window into a backing array: no data, just addressing.
///
/// Logical `(r, c)` maps to backing index `(row + r) * stride + col + c`.
/// Construction sites guarantee `row + size` and `col + size` never exceed
/// the backing dimension; accesses are not re-checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quad {
    pub row: usize,
    pub col: usize,
    pub size: usize,
}

impl Quad {
    /// The window covering a whole `size x size` matrix.
    pub fn whole(size: usize) -> Self {
        Self {
            row: 0,
            col: 0,
            size,
        }
    }

    /// The four half-size quadrants `[q11, q12, q21, q22]`.
    ///
    /// Callers guarantee `size` is even.
    pub fn split(self) -> [Quad; 4] {
        let half = self.size / 2;
        [
            Quad {
                row: self.row,
                col: self.col,
                size: half,
            },
            Quad {
                row: self.row,
                col: self.col + half,
                size: half,
            },
            Quad {
                row: self.row + half,
                col: self.col,
                size: half,
            },
            Quad {
                row: self.row + half,
                col: self.col + half,
                size: half,
            },
        ]
    }

    /// Backing index of logical `(r, c)` under `stride`.
    #[inline]
    pub fn index(self, stride: usize, r: usize, c: usize) -> usize {
        (self.row + r) * stride + self.col + c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_accepts_square_input() {
        let m = SquareMatrix::from_rows(&[&[1, 2], &[3, 4]]).unwrap();
        assert_eq!(m.size(), 2);
        assert_eq!(m.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(m.get(1, 0), 3);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = SquareMatrix::from_rows(&[&[1, 2], &[3]]).unwrap_err();
        assert_eq!(
            err,
            Error::NotSquare {
                row: 1,
                cols: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut m = SquareMatrix::zeroed(3);
        m.set(2, 1, 42);
        assert_eq!(m.get(2, 1), 42);
        assert_eq!(m.as_slice()[2 * 3 + 1], 42);
    }

    #[test]
    fn split_produces_disjoint_quadrants() {
        let [q11, q12, q21, q22] = Quad::whole(8).split();
        assert_eq!(q11, Quad { row: 0, col: 0, size: 4 });
        assert_eq!(q12, Quad { row: 0, col: 4, size: 4 });
        assert_eq!(q21, Quad { row: 4, col: 0, size: 4 });
        assert_eq!(q22, Quad { row: 4, col: 4, size: 4 });
    }

    #[test]
    fn nested_split_offsets_compose() {
        let [_, _, _, q22] = Quad::whole(8).split();
        let [i11, _, _, i22] = q22.split();
        assert_eq!(i11, Quad { row: 4, col: 4, size: 2 });
        assert_eq!(i22, Quad { row: 6, col: 6, size: 2 });
    }

    #[test]
    fn window_indexing_matches_direct_addressing() {
        let m = SquareMatrix::from_fn(4, |r, c| (r * 4 + c) as Elem);
        let [_, q12, _, _] = Quad::whole(4).split();
        for r in 0..2 {
            for c in 0..2 {
                let idx = q12.index(4, r, c);
                assert_eq!(m.as_slice()[idx], m.get(r, c + 2));
            }
        }
    }
}
