//! Decryption via closest-vector approximation.
//!
//! Given `c = (B·U)·m⃗ + δ`, both strategies work on the exact integer
//! vector `partial = adj(B)·c = det(B)·B⁻¹·c`, find a nearby lattice point
//! `z`, unmask it with `adj(U)` and recover the scalar as
//! `closest[0] / (det(B)·det(U))`.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use rayon::prelude::*;

use crate::error::{GghError, Result};
use crate::keygen::PrivateKey;
use crate::matrix::{round_rational, round_vector, Matrix};
use crate::reduction::gram_schmidt_columns;

/// Closest-vector approximation used by the decryptor. Selected at run
/// time; both strategies share the surrounding pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodingStrategy {
    /// Babai's nearest-plane algorithm: peel basis vectors from last to
    /// first, rounding each projection coefficient. Exact whenever the
    /// perturbation stays inside the basis's Gram-Schmidt radius.
    ///
    /// The decode runs on the determinant-scaled vector `adj(B)·c`, where
    /// the effective perturbation is `adj(B)·δ`. That almost always
    /// escapes the decoding radius, so any nonzero perturbation tends to
    /// surface as `DivisionNotExact` or a wrong unit — a known limitation
    /// of historical GGH tooling, kept intact here. Unperturbed
    /// ciphertexts decode exactly.
    NearestPlane,
    /// Independent coordinate-wise rounding of `B⁻¹·c`. Strictly weaker
    /// than nearest-plane for skewed bases, but it divides by the
    /// determinant *before* rounding, so ternary perturbation is tolerated
    /// whenever `‖B⁻¹·δ‖∞ < 1/2` — in particular for diagonally dominant
    /// private bases.
    Rounding,
}

/// Decrypts ciphertext vectors with the secret key.
#[derive(Clone, Debug)]
pub struct Decryptor {
    key: PrivateKey,
    strategy: DecodingStrategy,
}

fn relabel(err: GghError, context: &'static str) -> GghError {
    match err {
        GghError::SingularMatrix { .. } => GghError::SingularMatrix { context },
        other => other,
    }
}

impl Decryptor {
    pub fn new(key: PrivateKey, strategy: DecodingStrategy) -> Self {
        Self { key, strategy }
    }

    pub fn strategy(&self) -> DecodingStrategy {
        self.strategy
    }

    /// Recovers the plaintext integer from one ciphertext vector.
    pub fn decrypt(&self, cipher: &[BigInt]) -> Result<BigInt> {
        let n = self.key.dim();
        if cipher.len() != n {
            return Err(GghError::DimensionMismatch {
                expected: n,
                got: cipher.len(),
            });
        }

        let (adj, det) = self
            .key
            .basis()
            .inverse()
            .map_err(|e| relabel(e, "private basis"))?;
        let partial = adj.mul_vector(cipher)?;

        let z = match self.strategy {
            DecodingStrategy::NearestPlane => nearest_plane(self.key.basis(), &partial)?,
            DecodingStrategy::Rounding => {
                let unscaled: Vec<BigRational> = partial
                    .iter()
                    .map(|p| BigRational::new(p.clone(), det.clone()))
                    .collect();
                round_vector(&unscaled)
                    .into_iter()
                    .map(|r| r * &det)
                    .collect()
            }
        };

        let (mask_adj, mask_det) = self
            .key
            .mask()
            .inverse()
            .map_err(|e| relabel(e, "unimodular mask"))?;
        let closest = mask_adj.mul_vector(&z)?;

        let divisor = &det * &mask_det;
        let (quotient, remainder) = closest[0].div_rem(&divisor);
        if !remainder.is_zero() {
            return Err(GghError::DivisionNotExact {
                numerator: closest[0].clone(),
                divisor,
            });
        }
        Ok(quotient)
    }

    /// Decrypts a ciphertext stream back into bytes (the least-significant
    /// byte of each recovered integer). Units are independent, so they are
    /// decoded in parallel and reassembled in stream order.
    pub fn decrypt_bytes(&self, ciphers: &[Vec<BigInt>]) -> Result<Vec<u8>> {
        ciphers
            .par_iter()
            .map(|c| self.decrypt(c).map(|m| least_significant_byte(&m)))
            .collect()
    }
}

fn least_significant_byte(m: &BigInt) -> u8 {
    m.mod_floor(&BigInt::from(256)).to_u8().unwrap_or(0)
}

/// Babai's nearest-plane decode of `target` against the column lattice of
/// `basis`, in ambient coordinates. Processes basis vectors from last to
/// first; at each step the residual's coefficient along the current
/// Gram-Schmidt direction is rounded (ties away from zero) and the rounded
/// multiple of the *original* basis vector is subtracted.
fn nearest_plane(basis: &Matrix, target: &[BigInt]) -> Result<Vec<BigInt>> {
    let n = basis.cols();
    let columns: Vec<Vec<BigInt>> = (0..n).map(|j| basis.column(j)).collect();
    let (gs, _) = gram_schmidt_columns(&columns)?;

    let mut residual: Vec<BigInt> = target.to_vec();
    for i in (0..n).rev() {
        let mut num = BigRational::zero();
        let mut denom = BigRational::zero();
        for t in 0..n {
            num += BigRational::from_integer(residual[t].clone()) * &gs[i][t];
            denom += &gs[i][t] * &gs[i][t];
        }
        let coeff = round_rational(&(num / denom));
        if !coeff.is_zero() {
            for t in 0..n {
                residual[t] -= &coeff * &columns[i][t];
            }
        }
    }
    Ok(target.iter().zip(&residual).map(|(t, r)| t - r).collect())
}
