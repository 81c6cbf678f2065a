//! SIMD batching encoder for the plaintext ring R_t.
//!
//! With t ≡ 1 (mod 2*DEGREE) the cyclotomic X^DEGREE + 1 splits completely
//! mod t, and a polynomial is equivalent to the vector of its evaluations at
//! the primitive 2*DEGREE-th roots of unity. Slots are ordered by powers of
//! the group generator 3: slot i corresponds to the root ζ^(3^i mod 2N), so
//! the Galois automorphism X -> X^(3^k) rotates the first DEGREE/2 slots left
//! by k. The second half of the slot matrix (roots ζ^(-3^i)) is always encoded
//! as zero; only the first DEGREE/2 slots are exposed.
//!
//! The transform is a direct O(n^2) evaluation/interpolation against a
//! precomputed root-power table. Encoding happens once per enrollment sample
//! and a handful of times per query, so no fast transform is needed.

use super::plaintext::Plaintext;
use thiserror::Error;

pub type EncodingResult<T> = Result<T, EncodingError>;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("plain modulus {modulus} does not support batching for degree {degree}: need modulus ≡ 1 (mod 2·degree)")]
    NoBatchingSupport { modulus: u64, degree: usize },

    #[error("plain modulus {modulus} has no inverse of {degree}: modulus must be prime")]
    NotInvertible { modulus: u64, degree: usize },

    #[error("input too long: got {got} values, at most {max} slots")]
    InputTooLong { got: usize, max: usize },

    #[error("value {value} out of range for plain modulus {modulus}")]
    ValueOutOfRange { value: i64, modulus: u64 },
}

pub struct BatchEncoder<const DEGREE: usize> {
    plain_modulus: u64,
    /// ζ^k mod t for k in [0, 2*DEGREE).
    zeta_pows: Vec<u64>,
    /// Root exponent assigned to each slot: 3^i for the first half, -3^i for
    /// the (always zero) second half.
    slot_exponents: Vec<usize>,
    n_inv: u64,
}

impl<const DEGREE: usize> BatchEncoder<DEGREE> {
    pub fn new(plain_modulus: u64) -> EncodingResult<Self> {
        let two_n = 2 * DEGREE as u64;
        if plain_modulus < 2 || (plain_modulus - 1) % two_n != 0 {
            return Err(EncodingError::NoBatchingSupport {
                modulus: plain_modulus,
                degree: DEGREE,
            });
        }

        let zeta = find_primitive_root(two_n, plain_modulus).ok_or(
            EncodingError::NoBatchingSupport {
                modulus: plain_modulus,
                degree: DEGREE,
            },
        )?;
        let mut zeta_pows = Vec::with_capacity(2 * DEGREE);
        let mut pow = 1u64;
        for _ in 0..2 * DEGREE {
            zeta_pows.push(pow);
            pow = mod_mul(pow, zeta, plain_modulus);
        }

        let mut slot_exponents = vec![0usize; DEGREE];
        let two_d = 2 * DEGREE;
        let mut e = 1usize;
        for i in 0..DEGREE / 2 {
            slot_exponents[i] = e;
            slot_exponents[DEGREE / 2 + i] = two_d - e;
            e = (e * 3) % two_d;
        }

        let n_inv = mod_pow(DEGREE as u64, plain_modulus - 2, plain_modulus);
        if mod_mul(n_inv, DEGREE as u64, plain_modulus) != 1 {
            return Err(EncodingError::NotInvertible {
                modulus: plain_modulus,
                degree: DEGREE,
            });
        }

        Ok(Self {
            plain_modulus,
            zeta_pows,
            slot_exponents,
            n_inv,
        })
    }

    pub fn plain_modulus(&self) -> u64 {
        self.plain_modulus
    }

    /// Number of usable slots.
    pub fn slot_count(&self) -> usize {
        DEGREE / 2
    }

    /// Pack signed values into slots `0..values.len()`, remaining slots zero.
    pub fn encode(&self, values: &[i64]) -> EncodingResult<Plaintext<DEGREE>> {
        if values.len() > self.slot_count() {
            return Err(EncodingError::InputTooLong {
                got: values.len(),
                max: self.slot_count(),
            });
        }
        let t = self.plain_modulus;
        let half_t = (t / 2) as i64;
        let mut evals = vec![0u64; DEGREE];
        for (slot, &v) in evals.iter_mut().zip(values.iter()) {
            if v > half_t || v < -half_t {
                return Err(EncodingError::ValueOutOfRange {
                    value: v,
                    modulus: t,
                });
            }
            *slot = v.rem_euclid(t as i64) as u64;
        }

        // Interpolate: c_k = n_inv * Σ_j v_j * ζ^(-e_j * k)
        let two_d = 2 * DEGREE;
        let mut coeffs = [0u64; DEGREE];
        for (k, coeff) in coeffs.iter_mut().enumerate() {
            let mut acc = 0u64;
            for (j, &v) in evals.iter().enumerate() {
                if v == 0 {
                    continue;
                }
                let exp = (self.slot_exponents[j] * k) % two_d;
                let zeta_inv = self.zeta_pows[(two_d - exp) % two_d];
                acc = mod_add(acc, mod_mul(v, zeta_inv, t), t);
            }
            *coeff = mod_mul(acc, self.n_inv, t);
        }

        Ok(Plaintext {
            coeffs,
            plain_modulus: t,
        })
    }

    /// Read back the usable slots, centered into (-t/2, t/2].
    pub fn decode(&self, plaintext: &Plaintext<DEGREE>) -> Vec<i64> {
        let t = self.plain_modulus;
        let two_d = 2 * DEGREE;
        let mut values = Vec::with_capacity(self.slot_count());
        for j in 0..self.slot_count() {
            let e_j = self.slot_exponents[j];
            let mut acc = 0u64;
            for (k, &c) in plaintext.coeffs.iter().enumerate() {
                if c == 0 {
                    continue;
                }
                let root = self.zeta_pows[(e_j * k) % two_d];
                acc = mod_add(acc, mod_mul(c, root, t), t);
            }
            values.push(center(acc, t));
        }
        values
    }
}

fn center(value: u64, modulus: u64) -> i64 {
    if value > modulus / 2 {
        -((modulus - value) as i64)
    } else {
        value as i64
    }
}

fn mod_add(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 + b as u128) % m as u128) as u64
}

fn mod_mul(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn mod_pow(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1u64;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mod_mul(result, base, m);
        }
        exp >>= 1;
        base = mod_mul(base, base, m);
    }
    result
}

/// Find an element of order exactly n in Z_t^* (n a power of two dividing
/// t-1). For prime t about half of all bases work, so a short search is
/// enough; a composite t that slips through the other checks fails here.
fn find_primitive_root(n: u64, t: u64) -> Option<u64> {
    let exp = (t - 1) / n;
    for g in 2..t.min(258) {
        let candidate = mod_pow(g, exp, t);
        // order is exactly n iff candidate^(n/2) = -1
        if mod_pow(candidate, n / 2, t) == t - 1 {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: u64 = 786433;

    #[test]
    fn encode_decode_roundtrip() {
        let encoder = BatchEncoder::<16>::new(T).unwrap();
        let values = vec![1i64, -2, 3, 0, 42, -999, 7, 5];
        let pt = encoder.encode(&values).unwrap();
        let decoded = encoder.decode(&pt);
        assert_eq!(&decoded[..values.len()], &values[..]);
        assert!(decoded[values.len()..].iter().all(|&v| v == 0));
    }

    #[test]
    fn short_input_pads_with_zeros() {
        let encoder = BatchEncoder::<16>::new(T).unwrap();
        let pt = encoder.encode(&[5]).unwrap();
        let decoded = encoder.decode(&pt);
        assert_eq!(decoded[0], 5);
        assert!(decoded[1..].iter().all(|&v| v == 0));
    }

    #[test]
    fn product_of_plaintexts_is_slotwise() {
        // multiply two encodings as polynomials mod (X^16 + 1, t) and check
        // the slots multiply pointwise
        let encoder = BatchEncoder::<16>::new(T).unwrap();
        let a = vec![1i64, 2, 3, 4, 5, 6, 7, 8];
        let b = vec![8i64, 7, 6, 5, 4, 3, 2, 1];
        let pa = encoder.encode(&a).unwrap();
        let pb = encoder.encode(&b).unwrap();

        let mut prod = [0u64; 16];
        for i in 0..16 {
            for j in 0..16 {
                let p = mod_mul(pa.coeffs[i], pb.coeffs[j], T);
                if i + j < 16 {
                    prod[i + j] = mod_add(prod[i + j], p, T);
                } else {
                    prod[(i + j) - 16] = mod_add(prod[(i + j) - 16], T - p, T);
                }
            }
        }
        let decoded = encoder.decode(&Plaintext {
            coeffs: prod,
            plain_modulus: T,
        });
        for i in 0..8 {
            assert_eq!(decoded[i], a[i] * b[i]);
        }
    }

    #[test]
    fn rejects_unsupported_modulus() {
        assert!(BatchEncoder::<16>::new(7).is_err());
    }

    #[test]
    fn rejects_oversized_input() {
        let encoder = BatchEncoder::<16>::new(T).unwrap();
        let too_long = vec![0i64; 9];
        assert!(matches!(
            encoder.encode(&too_long),
            Err(EncodingError::InputTooLong { .. })
        ));
    }
}
