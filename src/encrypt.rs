//! Encryption: embed a message as a perturbed lattice point.

use num_bigint::BigInt;
use rand::Rng;
use rayon::prelude::*;

use crate::error::Result;
use crate::keygen::PublicKey;

/// Perturbation applied to each ciphertext vector. Selected at run time;
/// both settings share one code path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Perturbation {
    /// No noise; the ciphertext is an exact lattice point.
    Disabled,
    /// Each coordinate gets independent noise from {-1, 0, 1}.
    Ternary,
}

/// Encrypts plaintext units against a public key. Holds no secret material.
#[derive(Clone, Debug)]
pub struct Encryptor {
    key: PublicKey,
    perturbation: Perturbation,
}

impl Encryptor {
    pub fn new(key: PublicKey, perturbation: Perturbation) -> Self {
        Self { key, perturbation }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.key
    }

    fn sample_delta<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<BigInt> {
        let n = self.key.dim();
        match self.perturbation {
            Perturbation::Disabled => vec![BigInt::from(0); n],
            Perturbation::Ternary => (0..n)
                .map(|_| BigInt::from(rng.gen_range(-1i64..=1)))
                .collect(),
        }
    }

    /// Encrypts one plaintext integer:
    /// `cipher = publicBasis × (m, m, …, m)ᵗ + δ`.
    pub fn encrypt<R: Rng + ?Sized>(&self, msg: &BigInt, rng: &mut R) -> Result<Vec<BigInt>> {
        let delta = self.sample_delta(rng);
        self.encrypt_with_delta(msg, &delta)
    }

    fn encrypt_with_delta(&self, msg: &BigInt, delta: &[BigInt]) -> Result<Vec<BigInt>> {
        let plain = vec![msg.clone(); self.key.dim()];
        let mut cipher = self.key.basis().mul_vector(&plain)?;
        for (c, d) in cipher.iter_mut().zip(delta) {
            *c += d;
        }
        Ok(cipher)
    }

    /// Encrypts a byte stream, one ciphertext vector per byte. Perturbation
    /// vectors are drawn sequentially so the rng is consumed in stream
    /// order; the basis products fan out across rayon workers, and the
    /// output keeps the input's unit order.
    pub fn encrypt_bytes<R: Rng + ?Sized>(
        &self,
        data: &[u8],
        rng: &mut R,
    ) -> Result<Vec<Vec<BigInt>>> {
        let deltas: Vec<Vec<BigInt>> = data.iter().map(|_| self.sample_delta(rng)).collect();
        data.par_iter()
            .zip(deltas.par_iter())
            .map(|(&byte, delta)| self.encrypt_with_delta(&BigInt::from(byte), delta))
            .collect()
    }
}
