//! Lattice basis reduction over exact rationals.
//!
//! The LLL pass only ever applies unimodular column operations (integer
//! size-reduction steps and swaps), so the reduced matrix generates exactly
//! the same lattice as its input. It must not be confused with the
//! unimodular *mask* applied afterwards for obfuscation.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use crate::error::{GghError, Result};
use crate::matrix::{round_rational, Matrix};

/// The customary Lovász parameter δ = 3/4.
pub fn lovasz_delta() -> BigRational {
    BigRational::new(BigInt::from(3), BigInt::from(4))
}

fn dot(a: &[BigRational], b: &[BigRational]) -> BigRational {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn to_rational(v: &[BigInt]) -> Vec<BigRational> {
    v.iter().cloned().map(BigRational::from_integer).collect()
}

/// Gram-Schmidt orthogonalization of the columns, with the projection
/// coefficients. Returns `(gs, mu)` where `gs[i]` is the i-th orthogonalized
/// column and `mu[i][j]` (for `j < i`) the coefficient of `gs[j]` in column
/// `i`. Fails when the columns are linearly dependent.
pub(crate) fn gram_schmidt_columns(
    columns: &[Vec<BigInt>],
) -> Result<(Vec<Vec<BigRational>>, Vec<Vec<BigRational>>)> {
    let n = columns.len();
    let mut gs: Vec<Vec<BigRational>> = columns.iter().map(|c| to_rational(c)).collect();
    let mut mu = vec![vec![BigRational::zero(); n]; n];
    for i in 0..n {
        for j in 0..i {
            let denom = dot(&gs[j], &gs[j]);
            if denom.is_zero() {
                return Err(GghError::SingularMatrix {
                    context: "gram-schmidt",
                });
            }
            let coeff = dot(&gs[i], &gs[j]) / denom;
            for t in 0..gs[i].len() {
                let sub = &coeff * &gs[j][t];
                gs[i][t] = &gs[i][t] - &sub;
            }
            mu[i][j] = coeff;
        }
        if dot(&gs[i], &gs[i]).is_zero() {
            return Err(GghError::SingularMatrix {
                context: "gram-schmidt",
            });
        }
    }
    Ok((gs, mu))
}

/// LLL-reduces the columns of `basis` with parameter `delta`.
///
/// Textbook Lenstra-Lenstra-Lovász: size-reduce the working column against
/// its predecessors (rounding the Gram-Schmidt coefficients, ties away from
/// zero), then either advance or swap on the Lovász condition. The
/// orthogonalization is recomputed from scratch each round; dimensions here
/// are small enough that clarity wins over the incremental update.
pub fn lll_reduce(basis: &Matrix, delta: &BigRational) -> Result<Matrix> {
    if !basis.is_square() {
        return Err(GghError::DimensionMismatch {
            expected: basis.rows(),
            got: basis.cols(),
        });
    }
    let n = basis.cols();
    if n <= 1 {
        return Ok(basis.clone());
    }

    let mut cols: Vec<Vec<BigInt>> = (0..n).map(|j| basis.column(j)).collect();
    let mut k = 1;
    while k < n {
        // Reduce from the nearest predecessor down; each subtraction
        // changes the coefficients against earlier columns, so they are
        // recomputed per step.
        for j in (0..k).rev() {
            let (_, mu) = gram_schmidt_columns(&cols)?;
            let r = round_rational(&mu[k][j]);
            if !r.is_zero() {
                for t in 0..n {
                    let sub = &r * &cols[j][t];
                    cols[k][t] = &cols[k][t] - &sub;
                }
            }
        }

        let (gs, mu) = gram_schmidt_columns(&cols)?;
        let norm_k = dot(&gs[k], &gs[k]);
        let norm_prev = dot(&gs[k - 1], &gs[k - 1]);
        let mu_sq = &mu[k][k - 1] * &mu[k][k - 1];
        if norm_k >= (delta.clone() - mu_sq) * norm_prev {
            k += 1;
        } else {
            cols.swap(k, k - 1);
            k = if k > 1 { k - 1 } else { 1 };
        }
    }

    let rows = (0..n)
        .map(|i| (0..n).map(|j| cols[j][i].clone()).collect())
        .collect();
    Matrix::from_rows(rows)
}
