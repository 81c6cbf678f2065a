//! Sensor/door frontend: the only component holding the secret key.
//!
//! Preprocesses a raw sample exactly the way enrollment did, encrypts it,
//! runs the query against the access manager, decrypts the returned scalar,
//! and checks the combined compute + communication cost against a deadline.
//! An overrun does not abort the query — the scalar is still returned, with
//! the overrun flagged on the outcome and logged; deployments decide what to
//! do with repeated overruns.

use crate::access::errors::{AccessError, AccessResult};
use crate::access::query::AccessManager;
use crate::access::store::UserId;
use crate::bgv::{BgvEngine, PublicKey, SecretKey};
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::warn;

/// Deadline model: `compute_seconds + bytes / bandwidth <= ceiling`.
#[derive(Debug, Clone)]
pub struct LatencyBudget {
    pub bandwidth_bytes_per_sec: f64,
    pub ceiling_secs: f64,
}

impl Default for LatencyBudget {
    fn default() -> Self {
        Self {
            bandwidth_bytes_per_sec: (8 * 1024 * 1024) as f64,
            ceiling_secs: 1.0,
        }
    }
}

impl LatencyBudget {
    pub fn total_cost(&self, compute_secs: f64, bytes_exchanged: usize) -> f64 {
        compute_secs + bytes_exchanged as f64 / self.bandwidth_bytes_per_sec
    }

    pub fn is_exceeded(&self, compute_secs: f64, bytes_exchanged: usize) -> bool {
        self.total_cost(compute_secs, bytes_exchanged) > self.ceiling_secs
    }
}

/// Result of one authentication attempt. The score is the decrypted squared
/// distance; lower means a better match, and the caller applies its own
/// acceptance threshold.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub score: i64,
    pub compute_time: Duration,
    pub bytes_exchanged: usize,
    pub budget_exceeded: bool,
}

pub struct SensorFrontend<'a, const DEGREE: usize> {
    engine: &'a BgvEngine<DEGREE>,
    public_key: PublicKey<DEGREE>,
    secret_key: SecretKey<DEGREE>,
    downscale: i64,
    raw_dim: usize,
    budget: LatencyBudget,
}

impl<'a, const DEGREE: usize> SensorFrontend<'a, DEGREE> {
    pub fn new(
        engine: &'a BgvEngine<DEGREE>,
        public_key: PublicKey<DEGREE>,
        secret_key: SecretKey<DEGREE>,
        downscale: i64,
        raw_dim: usize,
        budget: LatencyBudget,
    ) -> Self {
        Self {
            engine,
            public_key,
            secret_key,
            downscale,
            raw_dim,
            budget,
        }
    }

    /// Run one access attempt for `claimed_user` with a raw sensor sample.
    pub fn authenticate<R: Rng>(
        &self,
        raw_sample: &[i64],
        claimed_user: UserId,
        manager: &AccessManager<'_, DEGREE>,
        rng: &mut R,
    ) -> AccessResult<AuthOutcome> {
        if raw_sample.len() != self.raw_dim {
            return Err(AccessError::DimensionMismatch {
                expected: self.raw_dim,
                got: raw_sample.len(),
            });
        }

        let start = Instant::now();

        // Same lossy downscaling as enrollment; the sensor never needs the
        // enrolled data for this.
        let reduced: Vec<i64> = raw_sample
            .iter()
            .map(|v| v.div_euclid(self.downscale))
            .collect();
        let plaintext = self.engine.encode(&reduced)?;
        let probe = self.engine.encrypt(&plaintext, &self.public_key, rng);

        let response = manager.query(&probe, claimed_user)?;

        let decrypted = self.engine.decrypt(&response, &self.secret_key);
        let score = self.engine.decode(&decrypted)[0];

        let compute_time = start.elapsed();
        let bytes_exchanged = probe.serialized_size() + response.serialized_size();
        let budget_exceeded = self
            .budget
            .is_exceeded(compute_time.as_secs_f64(), bytes_exchanged);
        if budget_exceeded {
            warn!(
                user = claimed_user,
                total_cost = self
                    .budget
                    .total_cost(compute_time.as_secs_f64(), bytes_exchanged),
                compute_secs = compute_time.as_secs_f64(),
                bytes_exchanged,
                "query exceeded its latency budget"
            );
        }

        Ok(AuthOutcome {
            score,
            compute_time,
            bytes_exchanged,
            budget_exceeded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_arithmetic_at_the_boundary() {
        let budget = LatencyBudget::default();
        // 0.3 + 2_000_000 / 8_388_608 ≈ 0.538
        assert!(!budget.is_exceeded(0.3, 2_000_000));
        // 0.6 + 0.238 ≈ 0.838
        assert!(!budget.is_exceeded(0.6, 2_000_000));
        // 0.9 + 0.238 ≈ 1.138
        assert!(budget.is_exceeded(0.9, 2_000_000));
    }

    #[test]
    fn budget_counts_communication() {
        let budget = LatencyBudget {
            bandwidth_bytes_per_sec: 1000.0,
            ceiling_secs: 1.0,
        };
        assert!(!budget.is_exceeded(0.0, 1000));
        assert!(budget.is_exceeded(0.0, 1001));
    }
}
