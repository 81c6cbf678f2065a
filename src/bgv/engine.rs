//! The engine: parameter/context owner, key generation entry points and all
//! homomorphic operations.
//!
//! Decryption is the only operation touching a [`SecretKey`]; every other
//! operation works from public or evaluation key material. Components that
//! should not be able to decrypt simply never receive a secret key — the
//! bundle handed to an evaluator, [`EvaluationKeys`], cannot be used to
//! recover plaintexts.

use super::ciphertext::Ciphertext;
use super::encoding::BatchEncoder;
use super::errors::{BgvError, BgvResult};
use super::keys::galois_key::{GaloisKeyParams, element_for_step};
use super::keys::{
    EvaluationKeys, GaloisKeys, PublicKey, PublicKeyParams, RelinearizationKey,
    RelinearizationKeyParams, SecretKey, SecretKeyParams,
};
use super::params::BgvParams;
use super::plaintext::Plaintext;
use super::poly::{ModPoly, RingContext};
use crypto_bigint::NonZero;
use crypto_bigint::U256;
use rand::Rng;

pub struct BgvEngine<const DEGREE: usize> {
    ctx: RingContext,
    params: BgvParams,
    encoder: BatchEncoder<DEGREE>,
}

impl<const DEGREE: usize> BgvEngine<DEGREE> {
    pub fn new(params: BgvParams) -> BgvResult<Self> {
        params.validate(DEGREE)?;
        let ctx = RingContext::new(params.log2_q);
        let encoder = BatchEncoder::new(params.plain_modulus)?;
        Ok(Self {
            ctx,
            params,
            encoder,
        })
    }

    pub fn context(&self) -> &RingContext {
        &self.ctx
    }

    pub fn params(&self) -> &BgvParams {
        &self.params
    }

    pub fn encoder(&self) -> &BatchEncoder<DEGREE> {
        &self.encoder
    }

    pub fn slot_count(&self) -> usize {
        self.encoder.slot_count()
    }

    pub fn encode(&self, values: &[i64]) -> BgvResult<Plaintext<DEGREE>> {
        Ok(self.encoder.encode(values)?)
    }

    pub fn decode(&self, plaintext: &Plaintext<DEGREE>) -> Vec<i64> {
        self.encoder.decode(plaintext)
    }

    // ---- key generation -------------------------------------------------

    pub fn generate_secret_key<R: Rng>(&self, rng: &mut R) -> BgvResult<SecretKey<DEGREE>> {
        let sk_params = SecretKeyParams {
            hamming_weight: self.params.hamming_weight,
        };
        Ok(SecretKey::generate(&sk_params, &self.ctx, rng)?)
    }

    pub fn generate_public_key<R: Rng>(
        &self,
        secret_key: &SecretKey<DEGREE>,
        rng: &mut R,
    ) -> BgvResult<PublicKey<DEGREE>> {
        let pk_params = PublicKeyParams {
            error_std: self.params.error_std,
            plain_modulus: self.params.plain_modulus,
        };
        Ok(PublicKey::generate(secret_key, &pk_params, &self.ctx, rng)?)
    }

    pub fn generate_relinearization_key<R: Rng>(
        &self,
        secret_key: &SecretKey<DEGREE>,
        rng: &mut R,
    ) -> BgvResult<RelinearizationKey<DEGREE>> {
        let relin_params = RelinearizationKeyParams {
            error_std: self.params.error_std,
            plain_modulus: self.params.plain_modulus,
            base_bits: self.params.decomp_bits,
        };
        Ok(RelinearizationKey::generate(secret_key, &relin_params, rng)?)
    }

    /// Generate rotation keys for exactly the given steps (positive = left,
    /// negative = right).
    pub fn generate_galois_keys<R: Rng>(
        &self,
        secret_key: &SecretKey<DEGREE>,
        steps: &[i32],
        rng: &mut R,
    ) -> BgvResult<GaloisKeys<DEGREE>> {
        let gk_params = GaloisKeyParams {
            error_std: self.params.error_std,
            plain_modulus: self.params.plain_modulus,
            base_bits: self.params.decomp_bits,
        };
        Ok(GaloisKeys::generate(secret_key, &gk_params, steps, rng)?)
    }

    /// The full evaluator bundle handed to the access manager.
    pub fn generate_evaluation_keys<R: Rng>(
        &self,
        secret_key: &SecretKey<DEGREE>,
        rotation_steps: &[i32],
        rng: &mut R,
    ) -> BgvResult<EvaluationKeys<DEGREE>> {
        Ok(EvaluationKeys {
            public: self.generate_public_key(secret_key, rng)?,
            relin: self.generate_relinearization_key(secret_key, rng)?,
            galois: self.generate_galois_keys(secret_key, rotation_steps, rng)?,
        })
    }

    // ---- encryption / decryption ----------------------------------------

    pub fn encrypt<R: Rng>(
        &self,
        plaintext: &Plaintext<DEGREE>,
        public_key: &PublicKey<DEGREE>,
        rng: &mut R,
    ) -> Ciphertext<DEGREE> {
        let t = self.params.plain_modulus;
        let u = ModPoly::sample_ternary(self.params.hamming_weight, &self.ctx, rng);
        let mut e0 = ModPoly::sample_gaussian(self.params.error_std, &self.ctx, rng);
        e0.scale_by_u64(t);
        let mut e1 = ModPoly::sample_gaussian(self.params.error_std, &self.ctx, rng);
        e1.scale_by_u64(t);

        // c0 = b·u + t·e0 + m
        let mut c0 = public_key.b.clone();
        c0 *= &u;
        c0 += &e0;
        c0 += &self.lift_message(plaintext);

        // c1 = a·u + t·e1
        let mut c1 = public_key.a.clone();
        c1 *= &u;
        c1 += &e1;

        Ciphertext { c0, c1, c2: None }
    }

    /// Recover the plaintext. Handles degree-2 ciphertexts as well, so a
    /// secret-key holder never needs evaluation keys just to read a result.
    pub fn decrypt(
        &self,
        ciphertext: &Ciphertext<DEGREE>,
        secret_key: &SecretKey<DEGREE>,
    ) -> Plaintext<DEGREE> {
        // w = c0 + c1·s (+ c2·s²)
        let mut w = ciphertext.c1.clone();
        w *= &secret_key.s;
        w += &ciphertext.c0;
        if let Some(c2) = &ciphertext.c2 {
            let mut s_squared = secret_key.s.clone();
            s_squared *= &secret_key.s;
            let mut term = c2.clone();
            term *= &s_squared;
            w += &term;
        }

        let t = self.params.plain_modulus;
        let t_wide = NonZero::new(U256::from(t)).expect("plain modulus is nonzero");
        let q = self.ctx.modulus();
        let half = self.ctx.half_modulus();

        let mut coeffs = [0u64; DEGREE];
        for (out, c) in coeffs.iter_mut().zip(w.coeffs.iter()) {
            *out = if *c <= half {
                c.rem(&t_wide).as_words()[0]
            } else {
                // negative residue: -(q - c) mod t
                let magnitude = q.wrapping_sub(c);
                let m = magnitude.rem(&t_wide).as_words()[0];
                (t - m) % t
            };
        }
        Plaintext {
            coeffs,
            plain_modulus: t,
        }
    }

    // ---- arithmetic ------------------------------------------------------

    pub fn add(&self, lhs: &Ciphertext<DEGREE>, rhs: &Ciphertext<DEGREE>) -> Ciphertext<DEGREE> {
        let mut c0 = lhs.c0.clone();
        c0 += &rhs.c0;
        let mut c1 = lhs.c1.clone();
        c1 += &rhs.c1;
        let c2 = match (&lhs.c2, &rhs.c2) {
            (None, None) => None,
            (Some(x), None) => Some(x.clone()),
            (None, Some(y)) => Some(y.clone()),
            (Some(x), Some(y)) => {
                let mut z = x.clone();
                z += y;
                Some(z)
            }
        };
        Ciphertext { c0, c1, c2 }
    }

    pub fn sub(&self, lhs: &Ciphertext<DEGREE>, rhs: &Ciphertext<DEGREE>) -> Ciphertext<DEGREE> {
        let mut c0 = lhs.c0.clone();
        c0 -= &rhs.c0;
        let mut c1 = lhs.c1.clone();
        c1 -= &rhs.c1;
        let c2 = match (&lhs.c2, &rhs.c2) {
            (None, None) => None,
            (Some(x), None) => Some(x.clone()),
            (None, Some(y)) => Some(-y.clone()),
            (Some(x), Some(y)) => {
                let mut z = x.clone();
                z -= y;
                Some(z)
            }
        };
        Ciphertext { c0, c1, c2 }
    }

    pub fn add_plain(
        &self,
        ciphertext: &Ciphertext<DEGREE>,
        plaintext: &Plaintext<DEGREE>,
    ) -> Ciphertext<DEGREE> {
        let mut result = ciphertext.clone();
        result.c0 += &self.lift_centered(plaintext);
        result
    }

    pub fn sub_plain(
        &self,
        ciphertext: &Ciphertext<DEGREE>,
        plaintext: &Plaintext<DEGREE>,
    ) -> Ciphertext<DEGREE> {
        let mut result = ciphertext.clone();
        result.c0 -= &self.lift_centered(plaintext);
        result
    }

    /// Slot-wise multiplication by an encoded plaintext.
    pub fn mul_plain(
        &self,
        ciphertext: &Ciphertext<DEGREE>,
        plaintext: &Plaintext<DEGREE>,
    ) -> Ciphertext<DEGREE> {
        let lifted = self.lift_centered(plaintext);
        let mut result = ciphertext.clone();
        result.c0 *= &lifted;
        result.c1 *= &lifted;
        if let Some(c2) = result.c2.as_mut() {
            *c2 *= &lifted;
        }
        result
    }

    /// Tensor multiplication; the result carries a degree-2 component until
    /// [`Self::relinearize`] is applied.
    pub fn mul(
        &self,
        lhs: &Ciphertext<DEGREE>,
        rhs: &Ciphertext<DEGREE>,
    ) -> BgvResult<Ciphertext<DEGREE>> {
        if !lhs.is_linear() || !rhs.is_linear() {
            return Err(BgvError::NonLinearOperand { op: "multiply" });
        }

        let mut d0 = lhs.c0.clone();
        d0 *= &rhs.c0;

        let mut d1_a = lhs.c0.clone();
        d1_a *= &rhs.c1;
        let mut d1_b = lhs.c1.clone();
        d1_b *= &rhs.c0;
        let mut d1 = d1_a;
        d1 += &d1_b;

        let mut d2 = lhs.c1.clone();
        d2 *= &rhs.c1;

        Ok(Ciphertext {
            c0: d0,
            c1: d1,
            c2: Some(d2),
        })
    }

    /// Squaring, the distance step of the matching protocol. Saves one ring
    /// multiplication over `mul(ct, ct)`.
    pub fn square(&self, ciphertext: &Ciphertext<DEGREE>) -> BgvResult<Ciphertext<DEGREE>> {
        if !ciphertext.is_linear() {
            return Err(BgvError::NonLinearOperand { op: "square" });
        }

        let mut d0 = ciphertext.c0.clone();
        d0 *= &ciphertext.c0;

        let mut cross = ciphertext.c0.clone();
        cross *= &ciphertext.c1;
        let mut d1 = cross.clone();
        d1 += &cross;

        let mut d2 = ciphertext.c1.clone();
        d2 *= &ciphertext.c1;

        Ok(Ciphertext {
            c0: d0,
            c1: d1,
            c2: Some(d2),
        })
    }

    /// Fold the degree-2 component back into a base-size ciphertext.
    pub fn relinearize(
        &self,
        ciphertext: &Ciphertext<DEGREE>,
        relin_key: &RelinearizationKey<DEGREE>,
    ) -> Ciphertext<DEGREE> {
        let Some(c2) = &ciphertext.c2 else {
            return ciphertext.clone();
        };
        let (delta_c0, delta_c1) = relin_key.ksk.apply(c2);
        let mut c0 = ciphertext.c0.clone();
        c0 += &delta_c0;
        let mut c1 = ciphertext.c1.clone();
        c1 += &delta_c1;
        Ciphertext { c0, c1, c2: None }
    }

    /// Rotate the usable slots by `steps` (positive = left, negative = right).
    pub fn rotate(
        &self,
        ciphertext: &Ciphertext<DEGREE>,
        steps: i32,
        galois_keys: &GaloisKeys<DEGREE>,
    ) -> BgvResult<Ciphertext<DEGREE>> {
        if !ciphertext.is_linear() {
            return Err(BgvError::NonLinearOperand { op: "rotate" });
        }
        let g = element_for_step::<DEGREE>(steps);
        if g == 1 {
            return Ok(ciphertext.clone());
        }
        let ksk = galois_keys
            .key_for_element(g)
            .ok_or(BgvError::MissingRotationKey {
                step: steps,
                element: g,
            })?;

        let rotated_c0 = ciphertext.c0.automorphism(g);
        let rotated_c1 = ciphertext.c1.automorphism(g);

        let (delta_c0, new_c1) = ksk.apply(&rotated_c1);
        let mut c0 = rotated_c0;
        c0 += &delta_c0;
        Ok(Ciphertext {
            c0,
            c1: new_c1,
            c2: None,
        })
    }

    pub fn rotate_left(
        &self,
        ciphertext: &Ciphertext<DEGREE>,
        steps: usize,
        galois_keys: &GaloisKeys<DEGREE>,
    ) -> BgvResult<Ciphertext<DEGREE>> {
        self.rotate(ciphertext, steps as i32, galois_keys)
    }

    pub fn rotate_right(
        &self,
        ciphertext: &Ciphertext<DEGREE>,
        steps: usize,
        galois_keys: &GaloisKeys<DEGREE>,
    ) -> BgvResult<Ciphertext<DEGREE>> {
        self.rotate(ciphertext, -(steps as i32), galois_keys)
    }

    // ---- lifting ---------------------------------------------------------

    /// Embed message residues [0, t) into R_q as-is.
    fn lift_message(&self, plaintext: &Plaintext<DEGREE>) -> ModPoly<DEGREE> {
        let mut signed = [0i64; DEGREE];
        for (s, &c) in signed.iter_mut().zip(plaintext.coeffs.iter()) {
            *s = c as i64;
        }
        ModPoly::from_signed_coeffs(&signed, &self.ctx)
    }

    /// Embed with centered representatives, keeping multiplicand magnitudes
    /// at t/2 instead of t.
    fn lift_centered(&self, plaintext: &Plaintext<DEGREE>) -> ModPoly<DEGREE> {
        let t = plaintext.plain_modulus;
        let half_t = t / 2;
        let mut signed = [0i64; DEGREE];
        for (s, &c) in signed.iter_mut().zip(plaintext.coeffs.iter()) {
            *s = if c > half_t {
                c as i64 - t as i64
            } else {
                c as i64
            };
        }
        ModPoly::from_signed_coeffs(&signed, &self.ctx)
    }
}
