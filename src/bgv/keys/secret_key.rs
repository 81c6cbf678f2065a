//! Secret key: a sparse ternary polynomial s(X) with coefficients in {-1, 0, 1}.

use crate::bgv::poly::{ModPoly, RingContext};
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretKeyError {
    #[error("hamming weight {0} exceeds ring degree {1}")]
    InvalidHammingWeight(usize, usize),
}

pub struct SecretKeyParams {
    /// Number of non-zero coefficients in the secret polynomial.
    pub hamming_weight: usize,
}

impl SecretKeyParams {
    fn validate(&self, degree: usize) -> Result<(), SecretKeyError> {
        if self.hamming_weight > degree || self.hamming_weight == 0 {
            Err(SecretKeyError::InvalidHammingWeight(
                self.hamming_weight,
                degree,
            ))
        } else {
            Ok(())
        }
    }
}

pub struct SecretKey<const DEGREE: usize> {
    pub s: ModPoly<DEGREE>,
}

impl<const DEGREE: usize> SecretKey<DEGREE> {
    pub fn generate<R: Rng>(
        params: &SecretKeyParams,
        ctx: &RingContext,
        rng: &mut R,
    ) -> Result<Self, SecretKeyError> {
        params.validate(DEGREE)?;
        let s = ModPoly::sample_ternary(params.hamming_weight, ctx, rng);
        Ok(SecretKey { s })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_bigint::{U256, Zero};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn hamming_weight_is_exact() {
        let ctx = RingContext::new(200);
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let params = SecretKeyParams { hamming_weight: 40 };
        let sk = SecretKey::<128>::generate(&params, &ctx, &mut rng).unwrap();
        let non_zero = sk
            .s
            .coeffs
            .iter()
            .filter(|c| !bool::from(c.is_zero()))
            .count();
        assert_eq!(non_zero, 40);
    }

    #[test]
    fn coefficients_are_ternary() {
        let ctx = RingContext::new(200);
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let params = SecretKeyParams { hamming_weight: 20 };
        let sk = SecretKey::<64>::generate(&params, &ctx, &mut rng).unwrap();
        let minus_one = ctx.modulus().wrapping_sub(&U256::ONE);
        for c in &sk.s.coeffs {
            assert!(*c == U256::ZERO || *c == U256::ONE || *c == minus_one);
        }
    }

    #[test]
    fn rejects_overweight() {
        let ctx = RingContext::new(200);
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let params = SecretKeyParams { hamming_weight: 99 };
        assert!(SecretKey::<64>::generate(&params, &ctx, &mut rng).is_err());
    }
}
