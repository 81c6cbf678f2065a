//! Negacyclic polynomial ring R_q = Z_q[X]/(X^DEGREE + 1) over U256 coefficients.
//!
//! The ciphertext modulus is fixed to the Mersenne form q = 2^log2_q - 1 so that
//! the 512-bit schoolbook products reduce by word-level folding instead of a full
//! wide division. Galois automorphisms permute coefficients with a sign flip,
//! since X^DEGREE = -1.

use crypto_bigint::{NonZero, U256, Zero};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::ops::{AddAssign, MulAssign, Neg, SubAssign};

/// Ring configuration shared by every polynomial: the ciphertext modulus and
/// its bit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingContext {
    q: NonZero<U256>,
    log2_q: u32,
}

impl RingContext {
    /// Build the context for q = 2^log2_q - 1.
    pub fn new(log2_q: u32) -> Self {
        assert!(
            (130..=254).contains(&log2_q),
            "log2_q must be in 130..=254, got {log2_q}"
        );
        let q_val = (U256::ONE << log2_q) - U256::ONE;
        let q = NonZero::new(q_val).expect("2^log2_q - 1 is nonzero");
        Self { q, log2_q }
    }

    pub fn modulus(&self) -> NonZero<U256> {
        self.q
    }

    pub fn log2_q(&self) -> u32 {
        self.log2_q
    }

    /// q / 2, the boundary between positive and negative residues.
    pub fn half_modulus(&self) -> U256 {
        self.q.wrapping_shr(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModPoly<const DEGREE: usize> {
    pub coeffs: [U256; DEGREE],
    ctx: RingContext,
}

impl<const DEGREE: usize> ModPoly<DEGREE> {
    pub fn zero(ctx: &RingContext) -> Self {
        Self {
            coeffs: [U256::ZERO; DEGREE],
            ctx: *ctx,
        }
    }

    pub fn context(&self) -> &RingContext {
        &self.ctx
    }

    /// Build from signed coefficients, mapping negatives to q - |c|.
    pub fn from_signed_coeffs(coeffs: &[i64], ctx: &RingContext) -> Self {
        let mut poly_coeffs = [U256::ZERO; DEGREE];
        for (slot, &coeff) in poly_coeffs.iter_mut().zip(coeffs.iter()) {
            *slot = signed_to_residue(coeff, ctx);
        }
        Self {
            coeffs: poly_coeffs,
            ctx: *ctx,
        }
    }

    /// Centered lift back to signed integers. Only meaningful when every
    /// residue is small enough to fit an i64.
    pub fn to_signed_coeffs(&self) -> [i64; DEGREE] {
        let half = self.ctx.half_modulus();
        let q = self.ctx.q;
        let mut out = [0i64; DEGREE];
        for (o, c) in out.iter_mut().zip(self.coeffs.iter()) {
            *o = if *c <= half {
                c.as_words()[0] as i64
            } else {
                let diff = q.wrapping_sub(c);
                -(diff.as_words()[0] as i64)
            };
        }
        out
    }

    /// Multiply every coefficient by a small scalar.
    pub fn scale_by_u64(&mut self, scalar: u64) {
        let s = U256::from(scalar);
        for c in self.coeffs.iter_mut() {
            *c = mul_mod_fold(c, &s, &self.ctx);
        }
    }

    /// Multiply every coefficient by an arbitrary residue.
    pub fn scale_by_residue(&mut self, scalar: &U256) {
        for c in self.coeffs.iter_mut() {
            *c = mul_mod_fold(c, scalar, &self.ctx);
        }
    }

    /// Apply the Galois automorphism X -> X^g for odd g coprime to 2*DEGREE.
    ///
    /// X^i maps to X^(g*i mod 2*DEGREE), with a sign flip whenever the reduced
    /// exponent lands in the upper half (X^DEGREE = -1).
    pub fn automorphism(&self, g: usize) -> Self {
        debug_assert!(g % 2 == 1, "galois element must be odd");
        let two_d = 2 * DEGREE;
        let q = &self.ctx.q;
        let mut result = [U256::ZERO; DEGREE];

        for (i, c) in self.coeffs.iter().enumerate() {
            if bool::from(c.is_zero()) {
                continue;
            }
            let new_idx = (g * i) % two_d;
            if new_idx < DEGREE {
                result[new_idx] = result[new_idx].add_mod(c, q);
            } else {
                result[new_idx - DEGREE] = result[new_idx - DEGREE].sub_mod(c, q);
            }
        }

        Self {
            coeffs: result,
            ctx: self.ctx,
        }
    }

    /// Base-2^base_bits digit decomposition, least significant digit first.
    /// Each returned polynomial has coefficients below 2^base_bits.
    pub fn decompose(&self, base_bits: u32, levels: usize) -> Vec<Self> {
        let mut digits = Vec::with_capacity(levels);
        for level in 0..levels {
            let mut coeffs = [U256::ZERO; DEGREE];
            for (slot, c) in coeffs.iter_mut().zip(self.coeffs.iter()) {
                *slot = U256::from(extract_digit(c.as_words(), level, base_bits));
            }
            digits.push(Self {
                coeffs,
                ctx: self.ctx,
            });
        }
        digits
    }

    /// Uniformly random polynomial in R_q.
    pub fn sample_uniform<R: Rng>(ctx: &RingContext, rng: &mut R) -> Self {
        let mut coeffs = [U256::ZERO; DEGREE];
        for coeff in &mut coeffs {
            let words = [
                rng.random::<u64>(),
                rng.random::<u64>(),
                rng.random::<u64>(),
                rng.random::<u64>(),
            ];
            *coeff = U256::from_words(words).rem(&ctx.q);
        }
        Self {
            coeffs,
            ctx: *ctx,
        }
    }

    /// Rounded centered Gaussian coefficients.
    pub fn sample_gaussian<R: Rng>(std_dev: f64, ctx: &RingContext, rng: &mut R) -> Self {
        let normal = Normal::new(0.0, std_dev).expect("invalid Gaussian std_dev");
        let mut coeffs = [U256::ZERO; DEGREE];
        for c in &mut coeffs {
            let sample = normal.sample(rng).round() as i64;
            *c = signed_to_residue(sample, ctx);
        }
        Self {
            coeffs,
            ctx: *ctx,
        }
    }

    /// Ternary polynomial with exactly `hamming_weight` nonzero entries in {-1, 1}.
    pub fn sample_ternary<R: Rng>(hamming_weight: usize, ctx: &RingContext, rng: &mut R) -> Self {
        assert!(
            hamming_weight <= DEGREE,
            "hamming_weight ({hamming_weight}) cannot exceed ring degree ({DEGREE})"
        );
        let mut signed = [0i64; DEGREE];
        let mut placed = 0;
        while placed < hamming_weight {
            let idx = rng.random_range(0..DEGREE);
            if signed[idx] == 0 {
                signed[idx] = if rng.random_bool(0.5) { 1 } else { -1 };
                placed += 1;
            }
        }
        Self::from_signed_coeffs(&signed, ctx)
    }
}

impl<const DEGREE: usize> AddAssign<&Self> for ModPoly<DEGREE> {
    fn add_assign(&mut self, rhs: &Self) {
        assert_eq!(self.ctx, rhs.ctx, "mismatched ring contexts");
        for i in 0..DEGREE {
            self.coeffs[i] = self.coeffs[i].add_mod(&rhs.coeffs[i], &self.ctx.q);
        }
    }
}

impl<const DEGREE: usize> SubAssign<&Self> for ModPoly<DEGREE> {
    fn sub_assign(&mut self, rhs: &Self) {
        assert_eq!(self.ctx, rhs.ctx, "mismatched ring contexts");
        for i in 0..DEGREE {
            self.coeffs[i] = self.coeffs[i].sub_mod(&rhs.coeffs[i], &self.ctx.q);
        }
    }
}

impl<const DEGREE: usize> MulAssign<&Self> for ModPoly<DEGREE> {
    fn mul_assign(&mut self, rhs: &Self) {
        assert_eq!(self.ctx, rhs.ctx, "mismatched ring contexts");
        let q = &self.ctx.q;
        let mut result = [U256::ZERO; DEGREE];

        for i in 0..DEGREE {
            if bool::from(self.coeffs[i].is_zero()) {
                continue;
            }
            for j in 0..DEGREE {
                if bool::from(rhs.coeffs[j].is_zero()) {
                    continue;
                }
                let product = mul_mod_fold(&self.coeffs[i], &rhs.coeffs[j], &self.ctx);
                if i + j < DEGREE {
                    result[i + j] = result[i + j].add_mod(&product, q);
                } else {
                    // X^DEGREE = -1 wraparound
                    let wrapped = (i + j) - DEGREE;
                    result[wrapped] = result[wrapped].sub_mod(&product, q);
                }
            }
        }

        self.coeffs = result;
    }
}

impl<const DEGREE: usize> Neg for ModPoly<DEGREE> {
    type Output = Self;

    fn neg(mut self) -> Self::Output {
        for coeff in &mut self.coeffs {
            *coeff = U256::ZERO.sub_mod(coeff, &self.ctx.q);
        }
        self
    }
}

fn signed_to_residue(value: i64, ctx: &RingContext) -> U256 {
    if value >= 0 {
        U256::from(value as u64)
    } else {
        let abs = U256::from(value.unsigned_abs());
        ctx.q.wrapping_sub(&abs)
    }
}

/// 256x256 -> 512-bit schoolbook word multiplication.
fn mul_wide_words(a: &U256, b: &U256) -> [u64; 8] {
    let aw = a.as_words();
    let bw = b.as_words();
    let mut out = [0u64; 8];
    for i in 0..4 {
        let mut carry: u128 = 0;
        for j in 0..4 {
            let cur = out[i + j] as u128 + (aw[i] as u128) * (bw[j] as u128) + carry;
            out[i + j] = cur as u64;
            carry = cur >> 64;
        }
        out[i + 4] = carry as u64;
    }
    out
}

/// Modular multiplication via Mersenne folding: with q = 2^k - 1,
/// hi*2^k + lo == hi + lo (mod q), so the 512-bit product collapses in a few
/// shift-and-add rounds.
pub(crate) fn mul_mod_fold(a: &U256, b: &U256, ctx: &RingContext) -> U256 {
    let k = ctx.log2_q;
    let mut buf = mul_wide_words(a, b);
    while !high_bits_clear(&buf, k) {
        let lo = mask_low(&buf, k);
        let hi = shift_right(&buf, k);
        buf = add_words(&lo, &hi);
    }
    let mut r = U256::from_words([buf[0], buf[1], buf[2], buf[3]]);
    if r == ctx.q.get() {
        r = U256::ZERO;
    }
    r
}

fn high_bits_clear(buf: &[u64; 8], k: u32) -> bool {
    let word = (k / 64) as usize;
    let bit = k % 64;
    for (i, &w) in buf.iter().enumerate() {
        if i < word {
            continue;
        }
        let masked = if i == word && bit > 0 { w >> bit } else { w };
        if masked != 0 {
            return false;
        }
    }
    true
}

fn mask_low(buf: &[u64; 8], k: u32) -> [u64; 8] {
    let word = (k / 64) as usize;
    let bit = k % 64;
    let mut out = [0u64; 8];
    for i in 0..8 {
        if i < word {
            out[i] = buf[i];
        } else if i == word && bit > 0 {
            out[i] = buf[i] & ((1u64 << bit) - 1);
        }
    }
    out
}

fn shift_right(buf: &[u64; 8], k: u32) -> [u64; 8] {
    let word = (k / 64) as usize;
    let bit = k % 64;
    let mut out = [0u64; 8];
    for i in 0..8 {
        let src = word + i;
        if src >= 8 {
            break;
        }
        let mut v = if bit > 0 { buf[src] >> bit } else { buf[src] };
        if bit > 0 && src + 1 < 8 {
            v |= buf[src + 1] << (64 - bit);
        }
        out[i] = v;
    }
    out
}

fn add_words(a: &[u64; 8], b: &[u64; 8]) -> [u64; 8] {
    let mut out = [0u64; 8];
    let mut carry: u128 = 0;
    for i in 0..8 {
        let cur = a[i] as u128 + b[i] as u128 + carry;
        out[i] = cur as u64;
        carry = cur >> 64;
    }
    debug_assert_eq!(carry, 0, "fold addition cannot overflow 512 bits");
    out
}

fn extract_digit(words: &[u64; 4], level: usize, base_bits: u32) -> u64 {
    let start = level * base_bits as usize;
    let word = start / 64;
    if word >= 4 {
        return 0;
    }
    let offset = (start % 64) as u32;
    let mut val = words[word] >> offset;
    if offset > 0 && offset + base_bits > 64 && word + 1 < 4 {
        val |= words[word + 1] << (64 - offset);
    }
    if base_bits < 64 {
        val &= (1u64 << base_bits) - 1;
    }
    val
}
