//! Key generation: a "nice" private basis plus a unimodular mask, and the
//! public basis derived from them.

use num_bigint::BigInt;
use num_traits::Zero;
use rand::Rng;

use crate::error::{GghError, Result};
use crate::matrix::Matrix;
use crate::reduction::{lll_reduce, lovasz_delta};
use crate::unimodular::random_unimodular;

/// Singular samples are retried this many times before giving up. A zero
/// determinant is rare for any usable dimension, so hitting the limit
/// means something is wrong with the parameters, not bad luck.
const MAX_SAMPLING_ATTEMPTS: usize = 32;

/// Knobs for private-basis sampling.
#[derive(Clone, Copy, Debug)]
pub struct BasisOptions {
    /// Entries are sampled uniformly from `[-entry_bound, entry_bound]`.
    pub entry_bound: u32,
    /// Add `round(sqrt(n)) × entry_bound` to every diagonal entry, biasing
    /// the basis toward diagonal dominance (lower orthogonality defect,
    /// better closest-vector decoding).
    pub diagonal_shift: bool,
    /// Run an LLL pass over the sampled basis before use. This only applies
    /// lattice-preserving operations; it is unrelated to the unimodular
    /// mask applied afterwards.
    pub lll_reduction: bool,
}

impl Default for BasisOptions {
    fn default() -> Self {
        Self {
            entry_bound: 4,
            diagonal_shift: true,
            lll_reduction: false,
        }
    }
}

/// Secret key: the nice basis and the unimodular mask. Never leaves the
/// key-holder's side.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    dim: usize,
    basis: Matrix,
    mask: Matrix,
}

/// Public key: the masked basis. This is the only information released to
/// encryptors.
#[derive(Clone, Debug)]
pub struct PublicKey {
    dim: usize,
    basis: Matrix,
}

impl PrivateKey {
    /// Assembles a private key from parts, validating shapes.
    pub fn new(dim: usize, basis: Matrix, mask: Matrix) -> Result<Self> {
        check_square(dim, &basis)?;
        check_square(dim, &mask)?;
        Ok(Self { dim, basis, mask })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn basis(&self) -> &Matrix {
        &self.basis
    }

    pub fn mask(&self) -> &Matrix {
        &self.mask
    }

    /// Derives the public basis: `publicBasis = privateBasis × mask`.
    /// Deterministic given the key.
    pub fn public_key(&self) -> Result<PublicKey> {
        Ok(PublicKey {
            dim: self.dim,
            basis: self.basis.mul(&self.mask)?,
        })
    }
}

impl PublicKey {
    pub fn new(dim: usize, basis: Matrix) -> Result<Self> {
        check_square(dim, &basis)?;
        Ok(Self { dim, basis })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn basis(&self) -> &Matrix {
        &self.basis
    }
}

fn check_square(dim: usize, m: &Matrix) -> Result<()> {
    if m.rows() != dim {
        return Err(GghError::DimensionMismatch {
            expected: dim,
            got: m.rows(),
        });
    }
    if m.cols() != dim {
        return Err(GghError::DimensionMismatch {
            expected: dim,
            got: m.cols(),
        });
    }
    Ok(())
}

fn sample_basis<R: Rng + ?Sized>(dim: usize, options: &BasisOptions, rng: &mut R) -> Matrix {
    let bound = i64::from(options.entry_bound);
    let mut basis = Matrix::zero(dim, dim);
    for i in 0..dim {
        for j in 0..dim {
            basis.set(i, j, BigInt::from(rng.gen_range(-bound..=bound)));
        }
    }
    if options.diagonal_shift {
        let shift = BigInt::from((dim as f64).sqrt().round() as i64 * bound);
        for i in 0..dim {
            let shifted = basis.get(i, i) + &shift;
            basis.set(i, i, shifted);
        }
    }
    basis
}

/// Generates a private key: a bounded-entry basis (resampled until its
/// determinant is nonzero) together with a fresh unimodular mask.
pub fn generate_private_key<R: Rng + ?Sized>(
    dim: usize,
    options: &BasisOptions,
    rng: &mut R,
) -> Result<PrivateKey> {
    if dim == 0 {
        return Err(GghError::DimensionMismatch {
            expected: 1,
            got: 0,
        });
    }
    for _ in 0..MAX_SAMPLING_ATTEMPTS {
        let mut basis = sample_basis(dim, options, rng);
        if basis.determinant()?.is_zero() {
            continue;
        }
        if options.lll_reduction {
            basis = lll_reduce(&basis, &lovasz_delta())?;
        }
        let mask = random_unimodular(dim, rng);
        return PrivateKey::new(dim, basis, mask);
    }
    Err(GghError::SingularMatrix {
        context: "private basis generation",
    })
}

/// Generates a key pair for the given dimension.
pub fn generate_keypair<R: Rng + ?Sized>(
    dim: usize,
    options: &BasisOptions,
    rng: &mut R,
) -> Result<(PublicKey, PrivateKey)> {
    let private = generate_private_key(dim, options, rng)?;
    let public = private.public_key()?;
    Ok((public, private))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Signed;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn generated_basis_is_nonsingular() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        for dim in 1..=8 {
            let key = generate_private_key(dim, &BasisOptions::default(), &mut rng).unwrap();
            assert!(!key.basis().determinant().unwrap().is_zero());
        }
    }

    #[test]
    fn public_basis_is_private_times_mask() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let private = generate_private_key(6, &BasisOptions::default(), &mut rng).unwrap();
        let public = private.public_key().unwrap();
        assert_eq!(
            public.basis(),
            &private.basis().mul(private.mask()).unwrap()
        );
    }

    #[test]
    fn determinants_are_multiplicative() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let private = generate_private_key(5, &BasisOptions::default(), &mut rng).unwrap();
        let public = private.public_key().unwrap();
        let expected =
            private.basis().determinant().unwrap() * private.mask().determinant().unwrap();
        assert_eq!(public.basis().determinant().unwrap(), expected);
    }

    #[test]
    fn entry_bound_is_respected_without_shift() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let options = BasisOptions {
            entry_bound: 3,
            diagonal_shift: false,
            lll_reduction: false,
        };
        let key = generate_private_key(7, &options, &mut rng).unwrap();
        let bound = BigInt::from(3);
        for i in 0..7 {
            for j in 0..7 {
                assert!(key.basis().get(i, j).abs() <= bound);
            }
        }
    }

    #[test]
    fn diagonal_shift_adds_rounded_sqrt_times_bound() {
        // With dim = 9 and bound 4 the shift is 3 × 4 = 12, so diagonal
        // entries land in [8, 16] while off-diagonals stay within ±4.
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let options = BasisOptions {
            entry_bound: 4,
            diagonal_shift: true,
            lll_reduction: false,
        };
        let key = generate_private_key(9, &options, &mut rng).unwrap();
        for i in 0..9 {
            let d = key.basis().get(i, i);
            assert!(*d >= BigInt::from(8) && *d <= BigInt::from(16));
        }
    }

    #[test]
    fn lll_option_preserves_the_determinant_magnitude() {
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let plain = BasisOptions {
            lll_reduction: false,
            ..BasisOptions::default()
        };
        let reduced = BasisOptions {
            lll_reduction: true,
            ..plain
        };
        let a = generate_private_key(5, &plain, &mut rng).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let b = generate_private_key(5, &reduced, &mut rng).unwrap();
        assert_eq!(
            a.basis().determinant().unwrap().abs(),
            b.basis().determinant().unwrap().abs()
        );
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        assert!(matches!(
            generate_private_key(0, &BasisOptions::default(), &mut rng),
            Err(GghError::DimensionMismatch { .. })
        ));
    }
}
