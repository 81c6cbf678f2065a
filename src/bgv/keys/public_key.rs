//! Public key: an RLWE sample (b, a) with b = -(a·s) + t·e.
//!
//! The error is scaled by the plain modulus t so that decryption recovers the
//! message exactly modulo t once the noise is centered away.

use super::secret_key::SecretKey;
use crate::bgv::poly::{ModPoly, RingContext};
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublicKeyError {
    #[error("error_std must be positive, got {0}")]
    InvalidErrorStd(f64),
}

pub struct PublicKeyParams {
    /// Standard deviation of the Gaussian error distribution.
    pub error_std: f64,
    /// Plaintext modulus t; errors are embedded as t·e.
    pub plain_modulus: u64,
}

impl PublicKeyParams {
    fn validate(&self) -> Result<(), PublicKeyError> {
        if self.error_std > 0.0 {
            Ok(())
        } else {
            Err(PublicKeyError::InvalidErrorStd(self.error_std))
        }
    }
}

#[derive(Clone)]
pub struct PublicKey<const DEGREE: usize> {
    /// b = -(a·s) + t·e
    pub b: ModPoly<DEGREE>,
    /// uniformly random component
    pub a: ModPoly<DEGREE>,
}

impl<const DEGREE: usize> PublicKey<DEGREE> {
    pub fn generate<R: Rng>(
        secret_key: &SecretKey<DEGREE>,
        params: &PublicKeyParams,
        ctx: &RingContext,
        rng: &mut R,
    ) -> Result<Self, PublicKeyError> {
        params.validate()?;

        let a = ModPoly::sample_uniform(ctx, rng);
        let mut e = ModPoly::sample_gaussian(params.error_std, ctx, rng);
        e.scale_by_u64(params.plain_modulus);

        let mut a_times_s = a.clone();
        a_times_s *= &secret_key.s;
        let mut b = -a_times_s;
        b += &e;

        Ok(PublicKey { b, a })
    }
}
