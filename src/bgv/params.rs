use super::errors::{BgvError, BgvResult};

/// Scheme parameters. The ring degree is a compile-time constant on
/// [`BgvEngine`](super::BgvEngine); everything else lives here.
///
/// The defaults in [`BgvParams::deployment`]: plaintext modulus 786433
/// (≡ 1 mod 2N up to N = 2^17, large enough for worst-case accumulated
/// squared distances), a 254-bit Mersenne ciphertext modulus leaving room for
/// the protocol's single ciphertext-ciphertext multiplication, and a 32-bit
/// key-switch decomposition base.
#[derive(Debug, Clone)]
pub struct BgvParams {
    /// Ciphertext modulus is q = 2^log2_q - 1.
    pub log2_q: u32,
    /// Plaintext modulus t, prime with t ≡ 1 (mod 2·degree).
    pub plain_modulus: u64,
    /// Gaussian error standard deviation.
    pub error_std: f64,
    /// Hamming weight of secret and ephemeral ternary polynomials.
    pub hamming_weight: usize,
    /// Key-switch digit decomposition base, in bits.
    pub decomp_bits: u32,
}

impl BgvParams {
    pub fn deployment() -> Self {
        Self {
            log2_q: 254,
            plain_modulus: 786433,
            error_std: 3.2,
            hamming_weight: 64,
            decomp_bits: 32,
        }
    }

    pub fn validate(&self, degree: usize) -> BgvResult<()> {
        if !degree.is_power_of_two() || degree < 8 {
            return Err(BgvError::InvalidParameter {
                message: format!("ring degree must be a power of two >= 8, got {degree}"),
            });
        }
        if !(130..=254).contains(&self.log2_q) {
            return Err(BgvError::InvalidParameter {
                message: format!("log2_q must be in 130..=254, got {}", self.log2_q),
            });
        }
        if self.plain_modulus < 2 || self.plain_modulus % 2 == 0 {
            return Err(BgvError::InvalidParameter {
                message: format!("plain modulus must be odd and > 1, got {}", self.plain_modulus),
            });
        }
        if self.hamming_weight == 0 || self.hamming_weight > degree {
            return Err(BgvError::InvalidParameter {
                message: format!(
                    "hamming weight must be in 1..={degree}, got {}",
                    self.hamming_weight
                ),
            });
        }
        if self.decomp_bits == 0 || self.decomp_bits > 64 {
            return Err(BgvError::InvalidParameter {
                message: format!("decomp_bits must be in 1..=64, got {}", self.decomp_bits),
            });
        }
        Ok(())
    }
}
