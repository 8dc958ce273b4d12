//! Exact integer matrix arithmetic.
//!
//! Everything on the cryptographic path stays in arbitrary precision:
//! determinants use Bareiss fraction-free elimination and the inverse is
//! returned as an exact adjugate/determinant pair, never as floats.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::error::{GghError, Result};

/// Dense matrix of arbitrary-precision integers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    data: Vec<Vec<BigInt>>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Builds a matrix from its rows. Fails if the rows are ragged.
    pub fn from_rows(data: Vec<Vec<BigInt>>) -> Result<Self> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        for row in &data {
            if row.len() != cols {
                return Err(GghError::DimensionMismatch {
                    expected: cols,
                    got: row.len(),
                });
            }
        }
        Ok(Self { data, rows, cols })
    }

    /// Builds a matrix from `i64` rows; test and fixture convenience.
    pub fn from_i64_rows(rows: &[&[i64]]) -> Result<Self> {
        Self::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|&e| BigInt::from(e)).collect())
                .collect(),
        )
    }

    pub fn identity(n: usize) -> Self {
        let data = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| if i == j { BigInt::one() } else { BigInt::zero() })
                    .collect()
            })
            .collect();
        Self {
            data,
            rows: n,
            cols: n,
        }
    }

    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![vec![BigInt::zero(); cols]; rows],
            rows,
            cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn row(&self, i: usize) -> &[BigInt] {
        &self.data[i]
    }

    pub fn column(&self, j: usize) -> Vec<BigInt> {
        self.data.iter().map(|row| row[j].clone()).collect()
    }

    pub fn get(&self, i: usize, j: usize) -> &BigInt {
        &self.data[i][j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: BigInt) {
        self.data[i][j] = value;
    }

    /// Matrix product `self × other`.
    pub fn mul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(GghError::DimensionMismatch {
                expected: self.cols,
                got: other.rows,
            });
        }
        let mut out = Matrix::zero(self.rows, other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut acc = BigInt::zero();
                for k in 0..self.cols {
                    acc += &self.data[i][k] * &other.data[k][j];
                }
                out.data[i][j] = acc;
            }
        }
        Ok(out)
    }

    /// Matrix-vector product `self × v` with `v` as a column vector.
    pub fn mul_vector(&self, v: &[BigInt]) -> Result<Vec<BigInt>> {
        if self.cols != v.len() {
            return Err(GghError::DimensionMismatch {
                expected: self.cols,
                got: v.len(),
            });
        }
        Ok(self
            .data
            .iter()
            .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
            .collect())
    }

    pub fn transpose(&self) -> Matrix {
        let data = (0..self.cols)
            .map(|j| self.column(j))
            .collect();
        Matrix {
            data,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Exact determinant by Bareiss fraction-free elimination. All
    /// intermediate divisions are exact, so the computation never leaves
    /// the integers.
    pub fn determinant(&self) -> Result<BigInt> {
        if !self.is_square() {
            return Err(GghError::DimensionMismatch {
                expected: self.rows,
                got: self.cols,
            });
        }
        let n = self.rows;
        if n == 0 {
            return Ok(BigInt::one());
        }
        let mut m = self.data.clone();
        let mut negated = false;
        let mut prev = BigInt::one();
        for k in 0..n - 1 {
            if m[k][k].is_zero() {
                let Some(p) = (k + 1..n).find(|&i| !m[i][k].is_zero()) else {
                    return Ok(BigInt::zero());
                };
                m.swap(k, p);
                negated = !negated;
            }
            for i in k + 1..n {
                for j in k + 1..n {
                    let num = &m[i][j] * &m[k][k] - &m[i][k] * &m[k][j];
                    m[i][j] = num / &prev;
                }
                m[i][k] = BigInt::zero();
            }
            prev = m[k][k].clone();
        }
        let det = m[n - 1][n - 1].clone();
        Ok(if negated { -det } else { det })
    }

    /// Exact inverse as `(numerator, denominator)` with
    /// `self × numerator = denominator × I`. The numerator is the adjugate
    /// and the denominator is the determinant.
    ///
    /// Fails with `SingularMatrix` when the determinant is zero.
    pub fn inverse(&self) -> Result<(Matrix, BigInt)> {
        if !self.is_square() {
            return Err(GghError::DimensionMismatch {
                expected: self.rows,
                got: self.cols,
            });
        }
        let det = self.determinant()?;
        if det.is_zero() {
            return Err(GghError::SingularMatrix {
                context: "matrix inverse",
            });
        }
        let n = self.rows;

        // Gauss-Jordan over exact rationals, then scale by the determinant.
        let mut a: Vec<Vec<BigRational>> = self
            .data
            .iter()
            .map(|row| row.iter().cloned().map(BigRational::from_integer).collect())
            .collect();
        let mut inv: Vec<Vec<BigRational>> = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        if i == j {
                            BigRational::one()
                        } else {
                            BigRational::zero()
                        }
                    })
                    .collect()
            })
            .collect();

        for col in 0..n {
            let pivot = (col..n)
                .find(|&r| !a[r][col].is_zero())
                .ok_or(GghError::SingularMatrix {
                    context: "matrix inverse",
                })?;
            a.swap(col, pivot);
            inv.swap(col, pivot);

            let p = a[col][col].clone();
            for j in 0..n {
                a[col][j] = &a[col][j] / &p;
                inv[col][j] = &inv[col][j] / &p;
            }
            for r in 0..n {
                if r == col || a[r][col].is_zero() {
                    continue;
                }
                let f = a[r][col].clone();
                for j in 0..n {
                    a[r][j] = &a[r][j] - &(&f * &a[col][j]);
                    inv[r][j] = &inv[r][j] - &(&f * &inv[col][j]);
                }
            }
        }

        let det_rat = BigRational::from_integer(det.clone());
        let numerator: Vec<Vec<BigInt>> = inv
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|e| {
                        let scaled = e * &det_rat;
                        // The adjugate is integral, so the scaling is exact.
                        debug_assert!(scaled.is_integer());
                        scaled.to_integer()
                    })
                    .collect()
            })
            .collect();
        Ok((
            Matrix {
                data: numerator,
                rows: n,
                cols: n,
            },
            det,
        ))
    }
}

/// Rounds a rational to the nearest integer; half-way cases round away
/// from zero. This is the single tie-breaking rule used everywhere, since
/// it decides round-trip behavior at decoding boundaries.
pub fn round_rational(r: &BigRational) -> BigInt {
    r.round().to_integer()
}

/// Rounds every coordinate of a rational vector to the nearest integer.
pub fn round_vector(v: &[BigRational]) -> Vec<BigInt> {
    v.iter().map(round_rational).collect()
}

/// Orthogonality defect of the columns: product of column norms divided by
/// |det|. Equals 1.0 for an orthogonal basis and grows as the basis skews;
/// closest-vector decoding accuracy degrades with it.
pub fn orthogonality_defect(basis: &Matrix) -> Result<f64> {
    let det = basis.determinant()?;
    if det.is_zero() {
        return Err(GghError::SingularMatrix {
            context: "orthogonality defect",
        });
    }
    let mut product = 1.0f64;
    for j in 0..basis.cols() {
        let norm_sqr: BigInt = basis.column(j).iter().map(|e| e * e).sum();
        product *= norm_sqr.to_f64().unwrap_or(f64::INFINITY).sqrt();
    }
    let det_abs = det.abs().to_f64().unwrap_or(f64::INFINITY);
    Ok(product / det_abs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fixture() -> Matrix {
        Matrix::from_i64_rows(&[&[5, 1, 0], &[0, 5, 1], &[1, 0, 5]]).unwrap()
    }

    #[test]
    fn determinant_of_fixture_basis() {
        assert_eq!(fixture().determinant().unwrap(), BigInt::from(126));
    }

    #[test]
    fn determinant_of_identity_is_one() {
        assert_eq!(Matrix::identity(7).determinant().unwrap(), BigInt::one());
    }

    #[test]
    fn determinant_of_singular_matrix_is_zero() {
        let m = Matrix::from_i64_rows(&[&[1, 2], &[2, 4]]).unwrap();
        assert_eq!(m.determinant().unwrap(), BigInt::zero());
    }

    #[test]
    fn determinant_with_zero_pivot_needs_row_swap() {
        let m = Matrix::from_i64_rows(&[&[0, 1], &[1, 0]]).unwrap();
        assert_eq!(m.determinant().unwrap(), BigInt::from(-1));
    }

    #[test]
    fn transpose_swaps_entries() {
        let m = Matrix::from_i64_rows(&[&[1, 2], &[3, 4]]).unwrap();
        let t = m.transpose();
        assert_eq!(t, Matrix::from_i64_rows(&[&[1, 3], &[2, 4]]).unwrap());
    }

    #[test]
    fn mul_vector_checks_dimension() {
        let m = fixture();
        let err = m.mul_vector(&vec![BigInt::one(); 2]).unwrap_err();
        assert!(matches!(
            err,
            crate::GghError::DimensionMismatch { expected: 3, got: 2 }
        ));
    }

    #[test]
    fn inverse_of_fixture_satisfies_adjugate_identity() {
        let m = fixture();
        let (num, den) = m.inverse().unwrap();
        assert_eq!(den, BigInt::from(126));
        let product = m.mul(&num).unwrap();
        let mut scaled_identity = Matrix::identity(3);
        for i in 0..3 {
            scaled_identity.set(i, i, den.clone());
        }
        assert_eq!(product, scaled_identity);
    }

    #[test]
    fn inverse_of_singular_matrix_fails() {
        let m = Matrix::from_i64_rows(&[&[1, 2], &[2, 4]]).unwrap();
        assert!(matches!(
            m.inverse(),
            Err(crate::GghError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn rounding_ties_go_away_from_zero() {
        let half = |n: i64, d: i64| BigRational::new(BigInt::from(n), BigInt::from(d));
        assert_eq!(round_rational(&half(5, 2)), BigInt::from(3));
        assert_eq!(round_rational(&half(-5, 2)), BigInt::from(-3));
        assert_eq!(round_rational(&half(7, 3)), BigInt::from(2));
        assert_eq!(round_rational(&half(-7, 3)), BigInt::from(-2));
        assert_eq!(round_rational(&half(0, 1)), BigInt::zero());
    }

    #[test]
    fn defect_of_orthogonal_basis_is_one() {
        let m = Matrix::from_i64_rows(&[&[4, 0], &[0, 9]]).unwrap();
        let defect = orthogonality_defect(&m).unwrap();
        assert!((defect - 1.0).abs() < 1e-9);
    }

    proptest! {
        // A × N = d × I for random invertible matrices up to dimension 6
        // with entries bounded by 10.
        #[test]
        fn inverse_identity_holds(
            n in 1usize..=6,
            seed in any::<u64>(),
        ) {
            use rand::{Rng, SeedableRng};
            let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(seed);
            let data: Vec<Vec<BigInt>> = (0..n)
                .map(|_| (0..n).map(|_| BigInt::from(rng.gen_range(-10i64..=10))).collect())
                .collect();
            let m = Matrix::from_rows(data).unwrap();
            prop_assume!(!m.determinant().unwrap().is_zero());

            let (num, den) = m.inverse().unwrap();
            let product = m.mul(&num).unwrap();
            for i in 0..n {
                for j in 0..n {
                    let expected = if i == j { den.clone() } else { BigInt::zero() };
                    prop_assert_eq!(product.get(i, j), &expected);
                }
            }
        }
    }
}
