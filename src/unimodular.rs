//! Random unimodular matrices for masking the private basis.

use num_bigint::BigInt;
use rand::Rng;

use crate::matrix::Matrix;

/// Random lower-triangular matrix with diagonal entries independently ±1
/// and strictly-lower entries independently from {-1, 0, 1}.
fn random_lower_triangular<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Matrix {
    let mut m = Matrix::zero(n, n);
    for i in 0..n {
        for j in 0..i {
            m.set(i, j, BigInt::from(rng.gen_range(-1i64..=1)));
        }
        let diag = if rng.gen::<bool>() { 1 } else { -1 };
        m.set(i, i, BigInt::from(diag));
    }
    m
}

/// Generates a random unimodular matrix `U = L × R` with `L`
/// lower-triangular and `R` the transpose of an independently generated
/// lower-triangular matrix. Both diagonals consist of ±1, so
/// `det(U) = det(L) × det(R) ∈ {1, -1}` for every instance; the mask is
/// therefore always invertible over the integers.
pub fn random_unimodular<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Matrix {
    let lower = random_lower_triangular(n, rng);
    let upper = random_lower_triangular(n, rng).transpose();
    let mut product = Matrix::zero(n, n);
    for i in 0..n {
        for j in 0..n {
            let mut acc = BigInt::from(0);
            for k in 0..n {
                acc += lower.get(i, k) * upper.get(k, j);
            }
            product.set(i, j, acc);
        }
    }
    product
}
