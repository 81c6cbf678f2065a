//! The access manager: executes matching queries entirely on encrypted data.
//!
//! It holds only evaluation key material — there is no decryption capability
//! anywhere in this type, so a compromised manager can expose nothing beyond
//! ciphertexts. The template store is never mutated by queries; any number of
//! queries may run concurrently over shared references.

use crate::access::enroll::EncodedProjectionModel;
use crate::access::errors::{AccessError, AccessResult};
use crate::access::reduction::{inner_sum, sum_leading_slots};
use crate::access::store::{TemplateStore, UserId};
use crate::bgv::{BgvEngine, Ciphertext, EvaluationKeys, Plaintext};
use tracing::debug;

pub struct AccessManager<'a, const DEGREE: usize> {
    engine: &'a BgvEngine<DEGREE>,
    keys: EvaluationKeys<DEGREE>,
    model: EncodedProjectionModel<DEGREE>,
    store: TemplateStore<DEGREE>,
    /// Slot-0 indicator, shared by every masking step.
    mask0: Plaintext<DEGREE>,
}

impl<'a, const DEGREE: usize> AccessManager<'a, DEGREE> {
    pub fn new(
        engine: &'a BgvEngine<DEGREE>,
        keys: EvaluationKeys<DEGREE>,
        model: EncodedProjectionModel<DEGREE>,
        store: TemplateStore<DEGREE>,
    ) -> AccessResult<Self> {
        if model.raw_dim > engine.slot_count() || model.components.len() > engine.slot_count() {
            return Err(AccessError::DimensionMismatch {
                expected: engine.slot_count(),
                got: model.raw_dim.max(model.components.len()),
            });
        }
        let mask0 = engine.encode(&[1])?;
        Ok(Self {
            engine,
            keys,
            model,
            store,
            mask0,
        })
    }

    pub fn store(&self) -> &TemplateStore<DEGREE> {
        &self.store
    }

    /// Match an encrypted probe against every template enrolled for
    /// `claimed_user`.
    ///
    /// Returns a ciphertext whose slot 0 holds the sum over templates of the
    /// squared distance in projected space, and whose other slots are all
    /// zero. The claimed identity is validated before any homomorphic work.
    pub fn query(
        &self,
        probe: &Ciphertext<DEGREE>,
        claimed_user: UserId,
    ) -> AccessResult<Ciphertext<DEGREE>> {
        let templates = self.store.templates_for(claimed_user)?;
        let engine = self.engine;
        let galois = &self.keys.galois;
        debug!(
            user = claimed_user,
            templates = templates.len(),
            "running access query"
        );

        // Step 1: center the probe on the encoded mean.
        let centered = engine.sub_plain(probe, &self.model.mean);

        // Step 2: one dot product per component, each collapsed into slot 0.
        // The component encodings are zero beyond the raw dimension, so the
        // products satisfy the inner sum's zero-padding precondition.
        let mut partials = Vec::with_capacity(self.model.components.len());
        for component in &self.model.components {
            let product = engine.mul_plain(&centered, component);
            let partial = inner_sum(engine, galois, &self.mask0, &product, self.model.raw_dim)?;
            partials.push(partial);
        }

        // Step 3: repack the K single-slot sums into slots 0..K. Each partial
        // is zero outside slot 0, so rotate-right-by-index and add packs them
        // without interference.
        let mut partials_iter = partials.into_iter();
        let mut projected = partials_iter
            .next()
            .ok_or(AccessError::EmptyReduction)?;
        for (index, partial) in partials_iter.enumerate() {
            let shifted = engine.rotate_right(&partial, index + 1, galois)?;
            projected = engine.add(&projected, &shifted);
        }

        // Steps 4 and 5: per-template squared difference, relinearized back to
        // base size, accumulated across the identity's templates.
        let mut total: Option<Ciphertext<DEGREE>> = None;
        for template in templates {
            let difference = engine.sub(template, &projected);
            let squared = engine.square(&difference)?;
            let squared = engine.relinearize(&squared, &self.keys.relin);
            total = Some(match total {
                None => squared,
                Some(accumulated) => engine.add(&accumulated, &squared),
            });
        }
        let total = total.ok_or(AccessError::UnknownIdentity(claimed_user))?;

        // Step 6: collapse the K projected-coordinate slots into slot 0 and
        // mask, so only the final scalar is ever disclosed.
        let reduced = sum_leading_slots(engine, galois, &total, self.model.components.len())?;
        Ok(engine.mul_plain(&reduced, &self.mask0))
    }
}
