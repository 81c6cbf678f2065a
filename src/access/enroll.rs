//! Enrollment: the one-time plaintext pipeline that turns a training set into
//! the encrypted template store and the encoded projection model.
//!
//! Templates are projected in the clear before encryption. This asymmetry is
//! intrinsic to the protocol: enrollment data is plaintext-visible to the
//! enrolling party anyway, so projecting it homomorphically would only burn
//! ciphertext-domain work, while probes arrive encrypted and must be projected
//! under encryption. After enrollment only the encoded model and the encrypted
//! store persist; no plaintext biometric is retained anywhere.

use crate::access::errors::{AccessError, AccessResult};
use crate::access::projection::ProjectionModel;
use crate::access::store::{TemplateStore, UserId};
use crate::bgv::{BgvEngine, Plaintext, PublicKey};
use rand::Rng;
use tracing::debug;

/// Plaintext-polynomial encodings of the projection model, held by the access
/// manager. Contains no secret material.
pub struct EncodedProjectionModel<const DEGREE: usize> {
    pub mean: Plaintext<DEGREE>,
    pub components: Vec<Plaintext<DEGREE>>,
    pub raw_dim: usize,
}

pub struct TemplateEncoder<'a, const DEGREE: usize> {
    engine: &'a BgvEngine<DEGREE>,
    public_key: &'a PublicKey<DEGREE>,
    model: ProjectionModel,
}

impl<'a, const DEGREE: usize> TemplateEncoder<'a, DEGREE> {
    pub fn new(
        engine: &'a BgvEngine<DEGREE>,
        public_key: &'a PublicKey<DEGREE>,
        model: ProjectionModel,
    ) -> AccessResult<Self> {
        if model.raw_dim() > engine.slot_count() {
            return Err(AccessError::DimensionMismatch {
                expected: engine.slot_count(),
                got: model.raw_dim(),
            });
        }
        Ok(Self {
            engine,
            public_key,
            model,
        })
    }

    pub fn model(&self) -> &ProjectionModel {
        &self.model
    }

    /// Enroll the whole training set at once: preprocess, project in the
    /// clear, encode, encrypt, group per identity.
    pub fn enroll_all<R: Rng>(
        &self,
        samples: &[Vec<i64>],
        user_ids: &[UserId],
        rng: &mut R,
    ) -> AccessResult<(EncodedProjectionModel<DEGREE>, TemplateStore<DEGREE>)> {
        if samples.len() != user_ids.len() {
            return Err(AccessError::DimensionMismatch {
                expected: samples.len(),
                got: user_ids.len(),
            });
        }

        let encoded_model = self.encode_model()?;

        let mut store = TemplateStore::new();
        for (sample, &user) in samples.iter().zip(user_ids.iter()) {
            if sample.len() != self.model.raw_dim() {
                return Err(AccessError::DimensionMismatch {
                    expected: self.model.raw_dim(),
                    got: sample.len(),
                });
            }
            let reduced = self.model.preprocess(sample);
            let projected = self.model.project(&reduced)?;
            let plaintext = self.engine.encode(&projected)?;
            let template = self.engine.encrypt(&plaintext, self.public_key, rng);
            store.insert(user, template);
            debug!(user, templates = store.template_count(user), "enrolled sample");
        }

        Ok((encoded_model, store))
    }

    fn encode_model(&self) -> AccessResult<EncodedProjectionModel<DEGREE>> {
        let mean = self.engine.encode(self.model.mean())?;
        let components = self
            .model
            .components()
            .iter()
            .map(|row| self.engine.encode(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EncodedProjectionModel {
            mean,
            components,
            raw_dim: self.model.raw_dim(),
        })
    }
}
