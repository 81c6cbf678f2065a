use super::poly::ModPoly;

/// An RLWE ciphertext.
///
/// `c2` is the degree-2 component produced by ciphertext-ciphertext
/// multiplication; it is present only until relinearization brings the
/// ciphertext back to base size.
#[derive(Debug, Clone, PartialEq)]
pub struct Ciphertext<const DEGREE: usize> {
    pub c0: ModPoly<DEGREE>,
    pub c1: ModPoly<DEGREE>,
    pub c2: Option<ModPoly<DEGREE>>,
}

impl<const DEGREE: usize> Ciphertext<DEGREE> {
    pub fn is_linear(&self) -> bool {
        self.c2.is_none()
    }

    /// Wire size in bytes: each component is DEGREE coefficients of 32 bytes.
    /// Used by the sensor frontend to account for communication cost.
    pub fn serialized_size(&self) -> usize {
        let components = if self.c2.is_some() { 3 } else { 2 };
        components * DEGREE * 32
    }
}
