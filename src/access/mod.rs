//! The privacy-preserving access-control protocol: enrollment pipeline,
//! encrypted template store, homomorphic matching query, and the sensor/door
//! frontend.
//!
//! Capability layout: the access manager side ([`TemplateEncoder`],
//! [`AccessManager`]) works exclusively from public and evaluation keys; the
//! [`SensorFrontend`] is the sole holder of the secret key and the only place
//! decryption happens.

pub mod enroll;
pub mod errors;
pub mod projection;
pub mod query;
pub mod reduction;
pub mod sensor;
pub mod store;

pub use enroll::{EncodedProjectionModel, TemplateEncoder};
pub use errors::{AccessError, AccessResult};
pub use projection::{ProjectionFit, ProjectionModel, QuantizerConfig};
pub use query::AccessManager;
pub use reduction::{chain_rotations, inner_sum, rotation_steps, sum_leading_slots};
pub use sensor::{AuthOutcome, LatencyBudget, SensorFrontend};
pub use store::{TemplateStore, UserId};
