//! Implementation of the GGH (Goldreich-Goldwasser-Halevi) lattice-based
//! public-key cryptosystem.
//!
//! A key pair is a "nice" private basis `B` (low orthogonality defect)
//! together with a random unimodular mask `U`; the public basis is the
//! skewed product `B × U`, which generates the same lattice. A plaintext
//! integer `m` is encrypted as the perturbed lattice point
//! `cipher = (B·U)·(m, …, m)ᵗ + δ` and recovered by approximate
//! closest-vector decoding with the private basis — Babai's nearest-plane
//! algorithm or coordinate-wise rounding, selectable at run time.
//!
//! All arithmetic is exact: arbitrary-precision integers everywhere, with
//! rationals (never floats) on the inverse and decoding paths.
//!
//! **This scheme is historically interesting, not secure.** GGH is broken
//! by Nguyen's attack, and this crate reproduces the historical algorithm
//! as published, including its limited perturbation tolerance (see
//! [`DecodingStrategy`]). Do not protect real data with it.

pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod keygen;
pub mod matrix;
pub mod reduction;
pub mod serialize;
pub mod unimodular;

pub use decrypt::{DecodingStrategy, Decryptor};
pub use encrypt::{Encryptor, Perturbation};
pub use error::{GghError, Result};
pub use keygen::{generate_keypair, generate_private_key, BasisOptions, PrivateKey, PublicKey};
pub use matrix::{orthogonality_defect, round_rational, round_vector, Matrix};
pub use reduction::{lll_reduce, lovasz_delta};
pub use unimodular::random_unimodular;

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn end_to_end_smoke() {
        let mut rng = ChaCha20Rng::seed_from_u64(1234);
        let (public, private) = generate_keypair(6, &BasisOptions::default(), &mut rng).unwrap();

        let encryptor = Encryptor::new(public, Perturbation::Disabled);
        let cipher = encryptor.encrypt(&BigInt::from(42), &mut rng).unwrap();

        for strategy in [DecodingStrategy::NearestPlane, DecodingStrategy::Rounding] {
            let decryptor = Decryptor::new(private.clone(), strategy);
            assert_eq!(decryptor.decrypt(&cipher).unwrap(), BigInt::from(42));
        }
    }
}
