use num_bigint::BigInt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GghError {
    /// A matrix that must be invertible has determinant zero.
    #[error("singular matrix in {context}: determinant is zero")]
    SingularMatrix { context: &'static str },

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// The final scalar recovery did not divide evenly. Signals a corrupted
    /// ciphertext or a perturbation that escaped the decoding radius.
    #[error("inexact division recovering plaintext: {numerator} is not divisible by {divisor}")]
    DivisionNotExact { numerator: BigInt, divisor: BigInt },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GghError>;
