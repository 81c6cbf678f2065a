//! Plaintext projection model: sensor preprocessing, quantization of an
//! externally trained linear projection, and clear-domain projection for
//! enrollment.
//!
//! The quantization pipeline bounds every magnitude that later flows through
//! the encrypted computation: samples are floor-divided by a fixed factor,
//! each component row keeps only its largest entries, and coefficients are
//! floor-quantized to integers. Enrollment and query MUST share one integer
//! model — the projection of a sample is computed with the rounded mean and
//! quantized components on both paths, which is what makes a self-match come
//! out as exactly zero after decryption.

use crate::access::errors::{AccessError, AccessResult};

/// Tunable quantization policy. Defaults: divide raw features by 20, keep the
/// 90 largest entries per component row, scale coefficients by 10 before
/// flooring.
#[derive(Debug, Clone)]
pub struct QuantizerConfig {
    /// Floor-division factor applied to every raw feature vector.
    pub downscale: i64,
    /// Multiplier applied to component coefficients before flooring.
    pub component_scale: f64,
    /// Entries kept (by magnitude) per component row; the rest are zeroed.
    pub keep_per_component: usize,
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            downscale: 20,
            component_scale: 10.0,
            keep_per_component: 90,
        }
    }
}

/// An externally trained linear projection (e.g. PCA output): a mean feature
/// vector and K component rows, all still floating point.
#[derive(Debug, Clone)]
pub struct ProjectionFit {
    pub mean: Vec<f64>,
    pub components: Vec<Vec<f64>>,
}

/// The immutable integer projection model shared by enrollment and query.
#[derive(Debug, Clone)]
pub struct ProjectionModel {
    mean: Vec<i64>,
    components: Vec<Vec<i64>>,
    downscale: i64,
}

impl ProjectionModel {
    pub fn from_fit(fit: &ProjectionFit, config: &QuantizerConfig) -> AccessResult<Self> {
        let dim = fit.mean.len();
        if dim == 0 || fit.components.is_empty() {
            return Err(AccessError::InvalidProjectionFit {
                message: "empty mean or component set".into(),
            });
        }
        if config.downscale < 1 {
            return Err(AccessError::InvalidProjectionFit {
                message: format!("downscale must be >= 1, got {}", config.downscale),
            });
        }
        for row in &fit.components {
            if row.len() != dim {
                return Err(AccessError::DimensionMismatch {
                    expected: dim,
                    got: row.len(),
                });
            }
        }
        if fit.mean.iter().any(|v| !v.is_finite())
            || fit
                .components
                .iter()
                .any(|row| row.iter().any(|v| !v.is_finite()))
        {
            return Err(AccessError::InvalidProjectionFit {
                message: "non-finite coefficient in fit".into(),
            });
        }

        let mean = fit.mean.iter().map(|v| v.round() as i64).collect();

        let mut components = Vec::with_capacity(fit.components.len());
        for row in &fit.components {
            let mut order: Vec<usize> = (0..dim).collect();
            order.sort_by(|&a, &b| row[b].abs().total_cmp(&row[a].abs()));
            let mut keep = vec![false; dim];
            for &idx in order.iter().take(config.keep_per_component) {
                keep[idx] = true;
            }
            let quantized: Vec<i64> = row
                .iter()
                .zip(keep.iter())
                .map(|(&v, &kept)| {
                    if kept {
                        (v * config.component_scale).floor() as i64
                    } else {
                        0
                    }
                })
                .collect();
            components.push(quantized);
        }

        Ok(Self {
            mean,
            components,
            downscale: config.downscale,
        })
    }

    /// Build directly from already-integer data; used by tests and by
    /// deployments that quantize elsewhere.
    pub fn from_integer_parts(
        mean: Vec<i64>,
        components: Vec<Vec<i64>>,
        downscale: i64,
    ) -> AccessResult<Self> {
        let dim = mean.len();
        if dim == 0 || components.is_empty() || downscale < 1 {
            return Err(AccessError::InvalidProjectionFit {
                message: "empty model or invalid downscale".into(),
            });
        }
        for row in &components {
            if row.len() != dim {
                return Err(AccessError::DimensionMismatch {
                    expected: dim,
                    got: row.len(),
                });
            }
        }
        Ok(Self {
            mean,
            components,
            downscale,
        })
    }

    pub fn raw_dim(&self) -> usize {
        self.mean.len()
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    pub fn mean(&self) -> &[i64] {
        &self.mean
    }

    pub fn components(&self) -> &[Vec<i64>] {
        &self.components
    }

    /// The fixed sensor preprocessing: lossy integer downscaling. Applied
    /// identically at enrollment and query time.
    pub fn preprocess(&self, raw: &[i64]) -> Vec<i64> {
        raw.iter().map(|v| v.div_euclid(self.downscale)).collect()
    }

    pub fn downscale(&self) -> i64 {
        self.downscale
    }

    /// Clear-domain projection of a preprocessed sample: K dot products
    /// against the mean-centered sample.
    pub fn project(&self, sample: &[i64]) -> AccessResult<Vec<i64>> {
        if sample.len() != self.raw_dim() {
            return Err(AccessError::DimensionMismatch {
                expected: self.raw_dim(),
                got: sample.len(),
            });
        }
        Ok(self
            .components
            .iter()
            .map(|row| {
                row.iter()
                    .zip(sample.iter().zip(self.mean.iter()))
                    .map(|(&c, (&x, &m))| c * (x - m))
                    .sum()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_floor_divides() {
        let model =
            ProjectionModel::from_integer_parts(vec![0; 4], vec![vec![1, 0, 0, 0]], 20).unwrap();
        assert_eq!(model.preprocess(&[39, 40, 41, 19]), vec![1, 2, 2, 0]);
    }

    #[test]
    fn quantization_keeps_largest_entries() {
        let fit = ProjectionFit {
            mean: vec![0.0; 4],
            components: vec![vec![0.11, -0.92, 0.5, -0.04]],
        };
        let config = QuantizerConfig {
            downscale: 20,
            component_scale: 10.0,
            keep_per_component: 2,
        };
        let model = ProjectionModel::from_fit(&fit, &config).unwrap();
        // -0.92 and 0.5 survive; floor(-9.2) = -10, floor(5.0) = 5
        assert_eq!(model.components()[0], vec![0, -10, 5, 0]);
    }

    #[test]
    fn mean_is_rounded() {
        let fit = ProjectionFit {
            mean: vec![1.4, 1.5, -2.6],
            components: vec![vec![1.0, 1.0, 1.0]],
        };
        let model = ProjectionModel::from_fit(&fit, &QuantizerConfig::default()).unwrap();
        assert_eq!(model.mean(), &[1, 2, -3]);
    }

    #[test]
    fn projection_is_centered_dot_product() {
        let model = ProjectionModel::from_integer_parts(
            vec![1, 1, 1],
            vec![vec![2, 0, -1], vec![0, 3, 0]],
            1,
        )
        .unwrap();
        let projected = model.project(&[4, 2, 0]).unwrap();
        // component 0: 2*(4-1) + 0*(2-1) + (-1)*(0-1) = 7
        // component 1: 3*(2-1) = 3
        assert_eq!(projected, vec![7, 3]);
    }

    #[test]
    fn rejects_ragged_fit() {
        let fit = ProjectionFit {
            mean: vec![0.0; 3],
            components: vec![vec![0.0; 2]],
        };
        assert!(ProjectionModel::from_fit(&fit, &QuantizerConfig::default()).is_err());
    }

    #[test]
    fn rejects_wrong_sample_length() {
        let model =
            ProjectionModel::from_integer_parts(vec![0; 3], vec![vec![1, 1, 1]], 1).unwrap();
        assert!(matches!(
            model.project(&[1, 2]),
            Err(AccessError::DimensionMismatch { expected: 3, got: 2 })
        ));
    }
}
