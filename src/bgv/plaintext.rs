/// A polynomial in the plaintext ring R_t, produced by the batch encoder.
///
/// Coefficients are residues in `[0, plain_modulus)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plaintext<const DEGREE: usize> {
    pub coeffs: [u64; DEGREE],
    pub plain_modulus: u64,
}

impl<const DEGREE: usize> Plaintext<DEGREE> {
    pub fn zero(plain_modulus: u64) -> Self {
        Self {
            coeffs: [0u64; DEGREE],
            plain_modulus,
        }
    }
}
