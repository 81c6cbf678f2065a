//! Relinearization key: a key-switch ladder from s² back to s.
//!
//! Ciphertext-ciphertext multiplication produces a degree-2 ciphertext
//! (d0, d1, d2) decrypting under (1, s, s²). The relinearization key lets the
//! evaluator replace the d2·s² term with a degree-1 contribution, restoring
//! base ciphertext size before any further operation.

use super::kswitch::KeySwitchKey;
use super::secret_key::SecretKey;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelinearizationKeyError {
    #[error("error_std must be positive, got {0}")]
    InvalidErrorStd(f64),
    #[error("decomposition base must be in 1..=64 bits, got {0}")]
    InvalidBaseBits(u32),
}

pub struct RelinearizationKeyParams {
    pub error_std: f64,
    pub plain_modulus: u64,
    pub base_bits: u32,
}

impl RelinearizationKeyParams {
    pub fn validate(&self) -> Result<(), RelinearizationKeyError> {
        if self.error_std <= 0.0 {
            return Err(RelinearizationKeyError::InvalidErrorStd(self.error_std));
        }
        if self.base_bits == 0 || self.base_bits > 64 {
            return Err(RelinearizationKeyError::InvalidBaseBits(self.base_bits));
        }
        Ok(())
    }
}

pub struct RelinearizationKey<const DEGREE: usize> {
    pub(crate) ksk: KeySwitchKey<DEGREE>,
}

impl<const DEGREE: usize> RelinearizationKey<DEGREE> {
    pub fn generate<R: Rng>(
        secret_key: &SecretKey<DEGREE>,
        params: &RelinearizationKeyParams,
        rng: &mut R,
    ) -> Result<Self, RelinearizationKeyError> {
        params.validate()?;

        let mut s_squared = secret_key.s.clone();
        s_squared *= &secret_key.s;

        let ksk = KeySwitchKey::generate(
            &secret_key.s,
            &s_squared,
            params.error_std,
            params.plain_modulus,
            params.base_bits,
            rng,
        );
        Ok(RelinearizationKey { ksk })
    }
}
