//! Gadget-decomposed key switching.
//!
//! A key-switch key from s' to s is a ladder of RLWE rows, one per digit
//! level j, each encrypting B^j·s' under s:
//!
//!   b_j = -(a_j·s) + t·e_j + B^j·s'
//!
//! Applying the key to a polynomial c (the component of a ciphertext that
//! multiplies s') decomposes c into base-B digits and accumulates
//! Σ digit_j(c)·(b_j, a_j). Because digits are small, the noise added per row
//! stays bounded by B instead of the full modulus.

use crate::bgv::poly::{ModPoly, RingContext};
use crypto_bigint::U256;
use rand::Rng;

pub struct KeySwitchKey<const DEGREE: usize> {
    /// (b_j, a_j) rows, least significant digit first.
    rows: Vec<(ModPoly<DEGREE>, ModPoly<DEGREE>)>,
    base_bits: u32,
}

impl<const DEGREE: usize> KeySwitchKey<DEGREE> {
    /// Number of digit levels needed to cover the ciphertext modulus.
    pub fn levels_for(ctx: &RingContext, base_bits: u32) -> usize {
        ctx.log2_q().div_ceil(base_bits) as usize
    }

    /// Build the ladder switching `source_secret` over to `target_secret`.
    pub fn generate<R: Rng>(
        target_secret: &ModPoly<DEGREE>,
        source_secret: &ModPoly<DEGREE>,
        error_std: f64,
        plain_modulus: u64,
        base_bits: u32,
        rng: &mut R,
    ) -> Self {
        let ctx = target_secret.context();
        let levels = Self::levels_for(ctx, base_bits);
        let mut rows = Vec::with_capacity(levels);

        for j in 0..levels {
            let a = ModPoly::sample_uniform(ctx, rng);
            let mut e = ModPoly::sample_gaussian(error_std, ctx, rng);
            e.scale_by_u64(plain_modulus);

            let mut a_times_s = a.clone();
            a_times_s *= target_secret;
            let mut b = -a_times_s;
            b += &e;

            let mut shifted = source_secret.clone();
            shifted.scale_by_residue(&(U256::ONE << (j as u32 * base_bits)));
            b += &shifted;

            rows.push((b, a));
        }

        Self { rows, base_bits }
    }

    /// Switch the polynomial `c` (multiplying the source secret) to the target
    /// key. Returns `(delta_c0, delta_c1)`: the first is added to the c0
    /// component, the second becomes the contribution to c1.
    pub fn apply(&self, c: &ModPoly<DEGREE>) -> (ModPoly<DEGREE>, ModPoly<DEGREE>) {
        let ctx = c.context();
        let digits = c.decompose(self.base_bits, self.rows.len());

        let mut acc_b = ModPoly::zero(ctx);
        let mut acc_a = ModPoly::zero(ctx);
        for (digit, (b, a)) in digits.iter().zip(self.rows.iter()) {
            let mut term_b = b.clone();
            term_b *= digit;
            acc_b += &term_b;

            let mut term_a = a.clone();
            term_a *= digit;
            acc_a += &term_a;
        }
        (acc_b, acc_a)
    }
}
