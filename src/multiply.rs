//! Square matrix multiplication (`C = A x B`) strategies.
//!
//! # Strategies
//!
//! | Variant | Method | Cost |
//! |---------|--------|------|
//! | [`Multiplier::Iterative`] | Direct i-j-k loops | O(n^3) |
//! | [`Multiplier::DivideAndConquer`] | 8 recursive quadrant products | O(n^3) |
//! | [`Multiplier::Strassen`] | 7 recursive products, signed folds | O(n^2.807) |
//! | [`Multiplier::Control`] | Allocates the result, no arithmetic | O(n^2) |
//!
//! The iterative product is the reference: the recursive variants must match
//! it bit for bit on integer inputs. Both recursive variants walk [`Quad`]
//! windows of the operands' backing storage instead of copying sub-matrices,
//! halving the window until the 2x2 base case.
//!
//! The two recursions differ in destination convention. Divide-and-conquer
//! *accumulates*: every result quadrant receives two additive contributions,
//! so the top-level result starts zeroed and the base case adds into its
//! destination. Strassen *overwrites*: its products land in scratch buffers
//! reused across the seven steps, so a destination carries no
//! zero-initialization guarantee at depth and must be cleared by the callee.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::matrix::{Elem, Quad, SquareMatrix};

/// One multiplication capability, selected at composition time.
///
/// Stateless and copyable; the name is a reporting label and carries no
/// algorithmic meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Multiplier {
    Iterative,
    DivideAndConquer,
    Strassen,
    Control,
}

impl Multiplier {
    pub const ALL: [Multiplier; 4] = [
        Multiplier::Iterative,
        Multiplier::DivideAndConquer,
        Multiplier::Strassen,
        Multiplier::Control,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Multiplier::Iterative => "iterative",
            Multiplier::DivideAndConquer => "divide-conquer",
            Multiplier::Strassen => "strassen",
            Multiplier::Control => "control",
        }
    }

    /// Checks the inputs this multiplier is defined for.
    ///
    /// Equal sizes for every variant; the recursive variants additionally
    /// require a power-of-two side length of at least 2 (they halve down to
    /// a 2x2 base case). Checked once here, never per recursion level.
    pub fn validate(self, a: &SquareMatrix, b: &SquareMatrix) -> Result<(), Error> {
        if a.size() != b.size() {
            return Err(Error::SizeMismatch {
                left: a.size(),
                right: b.size(),
            });
        }
        if matches!(self, Multiplier::DivideAndConquer | Multiplier::Strassen) {
            let size = a.size();
            if size < 2 || !size.is_power_of_two() {
                return Err(Error::NotPowerOfTwo(size));
            }
        }
        Ok(())
    }

    /// Multiplies `a` and `b`, validating the inputs first.
    ///
    /// Pure: the operands are never mutated and repeated calls on the same
    /// inputs return the same product.
    pub fn multiply(self, a: &SquareMatrix, b: &SquareMatrix) -> Result<SquareMatrix, Error> {
        self.validate(a, b)?;
        Ok(self.dispatch(a, b))
    }

    /// Kernel dispatch without validation; callers validate up front.
    pub(crate) fn dispatch(self, a: &SquareMatrix, b: &SquareMatrix) -> SquareMatrix {
        match self {
            Multiplier::Iterative => multiply_iterative(a, b),
            Multiplier::DivideAndConquer => multiply_divide_conquer(a, b),
            Multiplier::Strassen => multiply_strassen(a, b),
            Multiplier::Control => multiply_control(a, b),
        }
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Multiplier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iterative" => Ok(Multiplier::Iterative),
            "divide-conquer" => Ok(Multiplier::DivideAndConquer),
            "strassen" => Ok(Multiplier::Strassen),
            "control" => Ok(Multiplier::Control),
            _ => Err(Error::UnknownMultiplier(s.to_string())),
        }
    }
}

/// Reference implementation: the direct triple-loop product.
pub fn multiply_iterative(a: &SquareMatrix, b: &SquareMatrix) -> SquareMatrix {
    let n = a.size();
    let mut c = SquareMatrix::zeroed(n);
    let av = a.as_slice();
    let bv = b.as_slice();
    let cv = c.as_mut_slice();
    for i in 0..n {
        let row = i * n;
        for j in 0..n {
            let mut sum: Elem = 0;
            for k in 0..n {
                sum += av[row + k] * bv[k * n + j];
            }
            cv[row + j] = sum;
        }
    }
    c
}

/// Allocates a zeroed result and performs no arithmetic.
///
/// An experimental control: benchmarking it isolates allocation overhead
/// from algorithmic cost when reading runtime curves. Not a correct product.
pub fn multiply_control(a: &SquareMatrix, _b: &SquareMatrix) -> SquareMatrix {
    SquareMatrix::zeroed(a.size())
}

/// Recursive 8-product quadrant decomposition.
///
/// Asymptotically still O(n^3); it exists to expose divide-and-conquer
/// overhead against the iterative baseline, not to win. Assumes a
/// power-of-two size, enforced by [`Multiplier::validate`].
pub fn multiply_divide_conquer(a: &SquareMatrix, b: &SquareMatrix) -> SquareMatrix {
    let n = a.size();
    let mut c = SquareMatrix::zeroed(n);
    let whole = Quad::whole(n);
    mul_add(
        a.as_slice(),
        b.as_slice(),
        c.as_mut_slice(),
        n,
        whole,
        whole,
        whole,
    );
    c
}

/// `C += A x B` over same-stride windows, recursing by quadrant halving.
fn mul_add(a: &[Elem], b: &[Elem], c: &mut [Elem], stride: usize, qa: Quad, qb: Quad, qc: Quad) {
    let size = qa.size;
    if size <= 2 {
        for r in 0..size {
            for col in 0..size {
                let mut sum: Elem = 0;
                for k in 0..size {
                    sum += a[qa.index(stride, r, k)] * b[qb.index(stride, k, col)];
                }
                c[qc.index(stride, r, col)] += sum;
            }
        }
        return;
    }

    let [a11, a12, a21, a22] = qa.split();
    let [b11, b12, b21, b22] = qb.split();
    let [c11, c12, c21, c22] = qc.split();

    // C11 = A11 B11 + A12 B21
    mul_add(a, b, c, stride, a11, b11, c11);
    mul_add(a, b, c, stride, a12, b21, c11);
    // C12 = A11 B12 + A12 B22
    mul_add(a, b, c, stride, a11, b12, c12);
    mul_add(a, b, c, stride, a12, b22, c12);
    // C21 = A21 B11 + A22 B21
    mul_add(a, b, c, stride, a21, b11, c21);
    mul_add(a, b, c, stride, a22, b21, c21);
    // C22 = A21 B12 + A22 B22
    mul_add(a, b, c, stride, a21, b12, c22);
    mul_add(a, b, c, stride, a22, b22, c22);
}

/// Strassen's 7-product recursion.
///
/// Assumes a power-of-two size, enforced by [`Multiplier::validate`].
pub fn multiply_strassen(a: &SquareMatrix, b: &SquareMatrix) -> SquareMatrix {
    let n = a.size();
    let mut c = SquareMatrix::zeroed(n);
    let whole = Quad::whole(n);
    strassen_into(
        a.as_slice(),
        n,
        whole,
        b.as_slice(),
        n,
        whole,
        c.as_mut_slice(),
        n,
        whole,
    );
    c
}

/// `C = A x B` (overwrite), each operand its own (backing, stride, window)
/// triple so scratch buffers and operand quadrants flow through the same
/// signature.
///
/// Three scratch buffers serve all seven products: each product is folded
/// into its destination quadrants before the next step reclaims the
/// scratch, so the steps must run in order.
#[allow(clippy::too_many_arguments)]
fn strassen_into(
    a: &[Elem],
    sa: usize,
    qa: Quad,
    b: &[Elem],
    sb: usize,
    qb: Quad,
    c: &mut [Elem],
    sc: usize,
    qc: Quad,
) {
    let size = qa.size;
    if size <= 2 {
        for r in 0..size {
            for col in 0..size {
                let mut sum: Elem = 0;
                for k in 0..size {
                    sum += a[qa.index(sa, r, k)] * b[qb.index(sb, k, col)];
                }
                c[qc.index(sc, r, col)] = sum;
            }
        }
        return;
    }

    let m = size / 2;
    let [a11, a12, a21, a22] = qa.split();
    let [b11, b12, b21, b22] = qb.split();
    let [c11, c12, c21, c22] = qc.split();

    // The folds below accumulate, and the destination may be a caller's
    // scratch still holding an earlier product.
    for r in 0..size {
        for col in 0..size {
            c[qc.index(sc, r, col)] = 0;
        }
    }

    let mut t1 = vec![0 as Elem; m * m];
    let mut t2 = vec![0 as Elem; m * m];
    let mut t3 = vec![0 as Elem; m * m];
    let w = Quad::whole(m);

    // P = (A11 + A22)(B11 + B22): C11 += P, C22 += P
    combine(a, sa, a11, a, sa, a22, &mut t1, m, w, false);
    combine(b, sb, b11, b, sb, b22, &mut t2, m, w, false);
    strassen_into(&t1, m, w, &t2, m, w, &mut t3, m, w);
    fold(&t3, m, w, c, sc, c11, false);
    fold(&t3, m, w, c, sc, c22, false);

    // Q = (A21 + A22) B11: C21 += Q, C22 -= Q
    combine(a, sa, a21, a, sa, a22, &mut t1, m, w, false);
    strassen_into(&t1, m, w, b, sb, b11, &mut t3, m, w);
    fold(&t3, m, w, c, sc, c21, false);
    fold(&t3, m, w, c, sc, c22, true);

    // R = A11 (B12 - B22): C12 += R, C22 += R
    combine(b, sb, b12, b, sb, b22, &mut t2, m, w, true);
    strassen_into(a, sa, a11, &t2, m, w, &mut t3, m, w);
    fold(&t3, m, w, c, sc, c12, false);
    fold(&t3, m, w, c, sc, c22, false);

    // S = A22 (B21 - B11): C11 += S, C21 += S
    combine(b, sb, b21, b, sb, b11, &mut t2, m, w, true);
    strassen_into(a, sa, a22, &t2, m, w, &mut t3, m, w);
    fold(&t3, m, w, c, sc, c11, false);
    fold(&t3, m, w, c, sc, c21, false);

    // T = (A11 + A12) B22: C11 -= T, C12 += T
    combine(a, sa, a11, a, sa, a12, &mut t1, m, w, false);
    strassen_into(&t1, m, w, b, sb, b22, &mut t3, m, w);
    fold(&t3, m, w, c, sc, c11, true);
    fold(&t3, m, w, c, sc, c12, false);

    // U = (A21 - A11)(B11 + B12): C22 += U
    combine(a, sa, a21, a, sa, a11, &mut t1, m, w, true);
    combine(b, sb, b11, b, sb, b12, &mut t2, m, w, false);
    strassen_into(&t1, m, w, &t2, m, w, &mut t3, m, w);
    fold(&t3, m, w, c, sc, c22, false);

    // V = (A12 - A22)(B21 + B22): C11 += V
    combine(a, sa, a12, a, sa, a22, &mut t1, m, w, true);
    combine(b, sb, b21, b, sb, b22, &mut t2, m, w, false);
    strassen_into(&t1, m, w, &t2, m, w, &mut t3, m, w);
    fold(&t3, m, w, c, sc, c11, false);
}

/// `dst = a ± b` in one elementwise pass; `subtract` flips the sign of `b`.
#[allow(clippy::too_many_arguments)]
fn combine(
    a: &[Elem],
    sa: usize,
    qa: Quad,
    b: &[Elem],
    sb: usize,
    qb: Quad,
    dst: &mut [Elem],
    sd: usize,
    qd: Quad,
    subtract: bool,
) {
    let size = qa.size;
    for r in 0..size {
        for c in 0..size {
            let left = a[qa.index(sa, r, c)];
            let right = b[qb.index(sb, r, c)];
            dst[qd.index(sd, r, c)] = if subtract { left - right } else { left + right };
        }
    }
}

/// `dst ±= src`: the accumulate-in-place flavor of [`combine`].
fn fold(src: &[Elem], ss: usize, qs: Quad, dst: &mut [Elem], sd: usize, qd: Quad, subtract: bool) {
    let size = qs.size;
    for r in 0..size {
        for c in 0..size {
            let value = src[qs.index(ss, r, c)];
            let i = qd.index(sd, r, c);
            if subtract {
                dst[i] -= value;
            } else {
                dst[i] += value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn matrix(rows: &[&[Elem]]) -> SquareMatrix {
        SquareMatrix::from_rows(rows).unwrap()
    }

    const PRODUCT_VARIANTS: [Multiplier; 3] = [
        Multiplier::Iterative,
        Multiplier::DivideAndConquer,
        Multiplier::Strassen,
    ];

    #[test]
    fn known_product_2x2() {
        let a = matrix(&[&[1, 2], &[3, 4]]);
        let b = matrix(&[&[5, 6], &[7, 8]]);
        let expected = matrix(&[&[19, 22], &[43, 50]]);
        for variant in PRODUCT_VARIANTS {
            assert_eq!(
                variant.multiply(&a, &b).unwrap(),
                expected,
                "variant={variant}"
            );
        }
    }

    #[test]
    fn known_product_4x4() {
        let a = SquareMatrix::from_fn(4, |r, c| (r * 4 + c + 1) as Elem);
        let b = SquareMatrix::from_fn(4, |r, c| (r * 4 + c + 17) as Elem);
        let expected = matrix(&[
            &[250, 260, 270, 280],
            &[618, 644, 670, 696],
            &[986, 1028, 1070, 1112],
            &[1354, 1412, 1470, 1528],
        ]);
        for variant in PRODUCT_VARIANTS {
            assert_eq!(
                variant.multiply(&a, &b).unwrap(),
                expected,
                "variant={variant}"
            );
        }
    }

    #[test]
    fn known_product_8x8() {
        let a = matrix(&[
            &[5, 7, 4, 3, 3, 6, 9, 2],
            &[4, 7, 5, 0, 0, 0, 6, 2],
            &[4, 3, 5, 8, 8, 8, 2, 4],
            &[8, 8, 2, 7, 0, 7, 1, 5],
            &[5, 2, 8, 4, 4, 3, 7, 2],
            &[3, 4, 9, 3, 7, 9, 9, 6],
            &[0, 5, 3, 2, 9, 4, 9, 1],
            &[2, 7, 5, 8, 7, 6, 8, 5],
        ]);
        let b = matrix(&[
            &[2, 3, 1, 1, 5, 9, 1, 4],
            &[7, 7, 3, 7, 4, 1, 3, 5],
            &[4, 5, 8, 3, 7, 0, 7, 6],
            &[1, 3, 9, 9, 5, 0, 6, 3],
            &[7, 3, 3, 0, 7, 3, 0, 2],
            &[3, 5, 4, 8, 2, 7, 8, 9],
            &[8, 3, 1, 3, 3, 0, 9, 1],
            &[6, 4, 3, 8, 5, 5, 1, 6],
        ]);
        let expected = matrix(&[
            &[201, 167, 133, 184, 166, 113, 203, 169],
            &[137, 112, 77, 102, 111, 53, 116, 99],
            &[177, 168, 195, 214, 205, 139, 182, 199],
            &[146, 169, 155, 232, 163, 154, 158, 199],
            &[165, 137, 148, 140, 174, 90, 180, 144],
            &[257, 208, 198, 232, 233, 145, 255, 235],
            &[202, 134, 112, 129, 154, 65, 162, 118],
            &[242, 199, 203, 250, 223, 113, 231, 203],
        ]);
        for variant in PRODUCT_VARIANTS {
            assert_eq!(
                variant.multiply(&a, &b).unwrap(),
                expected,
                "variant={variant}"
            );
        }
    }

    #[test]
    fn control_allocates_zeroes() {
        let a = matrix(&[&[1, 2], &[3, 4]]);
        let b = matrix(&[&[5, 6], &[7, 8]]);
        let c = Multiplier::Control.multiply(&a, &b).unwrap();
        assert_eq!(c, SquareMatrix::zeroed(2));
    }

    #[test]
    fn mismatched_sizes_rejected() {
        let a = SquareMatrix::zeroed(4);
        let b = SquareMatrix::zeroed(2);
        for variant in Multiplier::ALL {
            assert_eq!(
                variant.multiply(&a, &b).unwrap_err(),
                Error::SizeMismatch { left: 4, right: 2 },
                "variant={variant}"
            );
        }
    }

    #[test]
    fn recursive_variants_reject_non_power_of_two() {
        let a = SquareMatrix::from_fn(3, |r, c| (r + c) as Elem);
        let b = SquareMatrix::from_fn(3, |r, c| (r * c) as Elem);
        for variant in [Multiplier::DivideAndConquer, Multiplier::Strassen] {
            assert_eq!(
                variant.multiply(&a, &b).unwrap_err(),
                Error::NotPowerOfTwo(3),
                "variant={variant}"
            );
        }
        // The iterative reference has no power-of-two requirement.
        assert!(Multiplier::Iterative.multiply(&a, &b).is_ok());
        assert!(Multiplier::Control.multiply(&a, &b).is_ok());
    }

    #[test]
    fn size_one_rejected_for_recursive_variants() {
        let a = matrix(&[&[3]]);
        let b = matrix(&[&[4]]);
        for variant in [Multiplier::DivideAndConquer, Multiplier::Strassen] {
            assert_eq!(
                variant.multiply(&a, &b).unwrap_err(),
                Error::NotPowerOfTwo(1),
                "variant={variant}"
            );
        }
    }

    #[test]
    fn multiply_leaves_inputs_unchanged() {
        let a = SquareMatrix::from_fn(8, |r, c| (r * 13 + c * 7) as Elem % 11 - 5);
        let b = SquareMatrix::from_fn(8, |r, c| (r * 5 + c * 3) as Elem % 9 - 4);
        let (a_before, b_before) = (a.clone(), b.clone());
        for variant in Multiplier::ALL {
            let first = variant.multiply(&a, &b).unwrap();
            let second = variant.multiply(&a, &b).unwrap();
            assert_eq!(first, second, "variant={variant}");
            assert_eq!(a, a_before, "variant={variant}");
            assert_eq!(b, b_before, "variant={variant}");
        }
    }

    #[test]
    fn names_round_trip_through_parsing() {
        for variant in Multiplier::ALL {
            assert_eq!(variant.name().parse::<Multiplier>().unwrap(), variant);
        }
        assert_eq!(
            "fft".parse::<Multiplier>().unwrap_err(),
            Error::UnknownMultiplier("fft".to_string())
        );
    }

    proptest! {
        /// The recursive variants agree with the iterative reference on
        /// random mixed-sign inputs from the base case (n=2) through two
        /// recursion levels (n=8) and beyond (n=16).
        #[test]
        fn recursive_variants_match_iterative(
            exp in 1u32..=4,
            cells_a in proptest::collection::vec(-100i64..=100, 256),
            cells_b in proptest::collection::vec(-100i64..=100, 256),
        ) {
            let n = 1usize << exp;
            let a = SquareMatrix::from_fn(n, |r, c| cells_a[r * n + c]);
            let b = SquareMatrix::from_fn(n, |r, c| cells_b[r * n + c]);
            let expected = multiply_iterative(&a, &b);
            let dnc = multiply_divide_conquer(&a, &b);
            prop_assert_eq!(dnc.as_slice(), expected.as_slice());
            let strassen = multiply_strassen(&a, &b);
            prop_assert_eq!(strassen.as_slice(), expected.as_slice());
        }
    }
}
