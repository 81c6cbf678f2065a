use super::encoding::EncodingError;
use super::keys::{GaloisKeyError, PublicKeyError, RelinearizationKeyError, SecretKeyError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BgvError {
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("encoding failed: {source}")]
    Encoding {
        #[from]
        source: EncodingError,
    },

    #[error("secret key generation failed: {source}")]
    SecretKey {
        #[from]
        source: SecretKeyError,
    },

    #[error("public key generation failed: {source}")]
    PublicKey {
        #[from]
        source: PublicKeyError,
    },

    #[error("relinearization key generation failed: {source}")]
    RelinearizationKey {
        #[from]
        source: RelinearizationKeyError,
    },

    #[error("galois key generation failed: {source}")]
    GaloisKey {
        #[from]
        source: GaloisKeyError,
    },

    #[error("no rotation key for step {step} (galois element {element})")]
    MissingRotationKey { step: i32, element: usize },

    #[error("`{op}` requires a relinearized (base-size) ciphertext")]
    NonLinearOperand { op: &'static str },
}

pub type BgvResult<T> = Result<T, BgvError>;
