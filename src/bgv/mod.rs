//! Exact integer BGV-style homomorphic encryption over R_q = Z_q[X]/(X^N + 1).
//!
//! The access-control protocol needs a small, fixed capability set: batching
//! encode/decode, encrypt/decrypt, additions, plaintext multiplication, one
//! ciphertext-ciphertext multiplication with relinearization, and slot
//! rotations. All operations are exact modulo the plaintext modulus as long as
//! the accumulated noise stays under q/2, which the protocol's bounded
//! operation sequence guarantees by parameter choice.

pub mod ciphertext;
pub mod encoding;
pub mod engine;
pub mod errors;
pub mod keys;
pub mod params;
pub mod plaintext;
pub mod poly;

pub use ciphertext::Ciphertext;
pub use encoding::{BatchEncoder, EncodingError};
pub use engine::BgvEngine;
pub use errors::{BgvError, BgvResult};
pub use keys::{EvaluationKeys, GaloisKeys, PublicKey, RelinearizationKey, SecretKey};
pub use params::BgvParams;
pub use plaintext::Plaintext;
pub use poly::{ModPoly, RingContext};
