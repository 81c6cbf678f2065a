use crate::access::store::UserId;
use crate::bgv::{BgvError, EncodingError};
use thiserror::Error;

/// Protocol-level failures. Caller mistakes (unknown identity, wrong
/// dimensions) are rejected synchronously before any homomorphic work;
/// backend failures abort the current query only and never touch the
/// template store. A latency budget overrun is *not* an error — it is a
/// flag on [`AuthOutcome`](crate::access::sensor::AuthOutcome).
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("identity {0} has no enrolled templates")]
    UnknownIdentity(UserId),

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("invalid projection fit: {message}")]
    InvalidProjectionFit { message: String },

    #[error("reduction requires at least one packed value")]
    EmptyReduction,

    #[error("encryption backend failure: {source}")]
    Backend {
        #[from]
        source: BgvError,
    },
}

impl From<EncodingError> for AccessError {
    fn from(source: EncodingError) -> Self {
        AccessError::Backend {
            source: source.into(),
        }
    }
}

pub type AccessResult<T> = Result<T, AccessError>;
