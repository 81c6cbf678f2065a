//! Rotation (Galois) keys.
//!
//! A slot rotation is the automorphism X -> X^g followed by a key switch from
//! τ_g(s) back to s. One key-switch ladder is generated per rotation step the
//! deployment actually uses; asking for a step without a key is an error
//! surfaced by the engine, never a silent fallback.
//!
//! Step convention: positive steps rotate the usable slots left (slot i takes
//! the value of slot i+step), negative steps rotate right. Steps are taken
//! modulo DEGREE/2, the size of the rotation orbit.

use super::kswitch::KeySwitchKey;
use super::secret_key::SecretKey;
use rand::Rng;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GaloisKeyError {
    #[error("error_std must be positive, got {0}")]
    InvalidErrorStd(f64),
    #[error("decomposition base must be in 1..=64 bits, got {0}")]
    InvalidBaseBits(u32),
}

pub struct GaloisKeyParams {
    pub error_std: f64,
    pub plain_modulus: u64,
    pub base_bits: u32,
}

pub struct GaloisKeys<const DEGREE: usize> {
    /// Key-switch ladders keyed by Galois element.
    keys: HashMap<usize, KeySwitchKey<DEGREE>>,
}

impl<const DEGREE: usize> GaloisKeys<DEGREE> {
    pub fn generate<R: Rng>(
        secret_key: &SecretKey<DEGREE>,
        params: &GaloisKeyParams,
        steps: &[i32],
        rng: &mut R,
    ) -> Result<Self, GaloisKeyError> {
        if params.error_std <= 0.0 {
            return Err(GaloisKeyError::InvalidErrorStd(params.error_std));
        }
        if params.base_bits == 0 || params.base_bits > 64 {
            return Err(GaloisKeyError::InvalidBaseBits(params.base_bits));
        }

        let mut keys = HashMap::new();
        for &step in steps {
            let g = element_for_step::<DEGREE>(step);
            if g == 1 || keys.contains_key(&g) {
                continue;
            }
            let rotated_secret = secret_key.s.automorphism(g);
            let ksk = KeySwitchKey::generate(
                &secret_key.s,
                &rotated_secret,
                params.error_std,
                params.plain_modulus,
                params.base_bits,
                rng,
            );
            keys.insert(g, ksk);
        }
        Ok(Self { keys })
    }

    pub fn key_for_element(&self, g: usize) -> Option<&KeySwitchKey<DEGREE>> {
        self.keys.get(&g)
    }
}

/// Galois element realizing a slot rotation by `step`: 3^(step mod DEGREE/2)
/// in Z_{2·DEGREE}^*.
pub fn element_for_step<const DEGREE: usize>(step: i32) -> usize {
    let half = (DEGREE / 2) as i32;
    let m = step.rem_euclid(half) as u64;
    let two_d = (2 * DEGREE) as u64;
    let mut g = 1u64;
    let mut base = 3u64 % two_d;
    let mut exp = m;
    while exp > 0 {
        if exp & 1 == 1 {
            g = (g * base) % two_d;
        }
        exp >>= 1;
        base = (base * base) % two_d;
    }
    g as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_zero_is_identity() {
        assert_eq!(element_for_step::<16>(0), 1);
    }

    #[test]
    fn left_and_right_steps_are_inverse() {
        let two_d = 32;
        let left = element_for_step::<16>(3);
        let right = element_for_step::<16>(-3);
        assert_eq!((left * right) % two_d, 1);
    }

    #[test]
    fn full_orbit_wraps() {
        // rotating by DEGREE/2 is the identity on the slot orbit
        assert_eq!(element_for_step::<16>(8), 1);
    }
}
