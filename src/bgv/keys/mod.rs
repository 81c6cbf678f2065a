pub mod galois_key;
pub mod kswitch;
pub mod public_key;
pub mod relin_key;
pub mod secret_key;

pub use galois_key::{GaloisKeyError, GaloisKeys};
pub use kswitch::KeySwitchKey;
pub use public_key::{PublicKey, PublicKeyError, PublicKeyParams};
pub use relin_key::{RelinearizationKey, RelinearizationKeyError, RelinearizationKeyParams};
pub use secret_key::{SecretKey, SecretKeyError, SecretKeyParams};

/// Everything the access manager is allowed to hold: encryption and
/// evaluation capability, but no way to decrypt.
///
/// The secret key is deliberately not part of this bundle; decryption
/// capability stays with the sensor/door frontend, which receives the
/// [`SecretKey`] directly at setup time.
pub struct EvaluationKeys<const DEGREE: usize> {
    pub public: PublicKey<DEGREE>,
    pub relin: RelinearizationKey<DEGREE>,
    pub galois: GaloisKeys<DEGREE>,
}
