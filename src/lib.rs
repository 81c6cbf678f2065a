//! chromagate — privacy-preserving biometric access control on encrypted
//! chromatogram feature vectors.
//!
//! A sensor encrypts a preprocessed feature vector; the access manager, which
//! stores only encrypted enrollment templates, homomorphically projects the
//! probe through a quantized linear model, computes squared distances against
//! the claimed identity's templates, and reduces everything to a single
//! encrypted scalar. Only the sensor/door side can decrypt it.

pub mod access;
pub mod bgv;

pub use access::{
    AccessError, AccessManager, AccessResult, AuthOutcome, EncodedProjectionModel, LatencyBudget,
    ProjectionFit, ProjectionModel, QuantizerConfig, SensorFrontend, TemplateEncoder,
    TemplateStore, UserId, inner_sum, rotation_steps, sum_leading_slots,
};
pub use bgv::{
    BatchEncoder, BgvEngine, BgvError, BgvParams, BgvResult, Ciphertext, EvaluationKeys,
    GaloisKeys, Plaintext, PublicKey, RelinearizationKey, SecretKey,
};
