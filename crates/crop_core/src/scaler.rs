//! Per-feature standardization
//!
//! `z = (x - mean) / std` with the population standard deviation. Constant
//! features keep a divisor of 1.0 so they map to zero instead of NaN.

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-feature mean
    pub mean: Vec<f64>,
    /// Per-feature divisor (population std, or 1.0 for constant features)
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Learn mean and standard deviation from a row-major feature matrix
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let first = rows.first().ok_or_else(|| {
            CoreError::InvalidParameters("cannot fit a scaler on zero rows".to_string())
        })?;
        let width = first.len();
        if width == 0 {
            return Err(CoreError::InvalidParameters(
                "cannot fit a scaler on zero features".to_string(),
            ));
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(CoreError::InvalidParameters(format!(
                    "row {} has {} features, expected {}",
                    row_idx,
                    row.len(),
                    width
                )));
            }
            for (acc, value) in mean.iter_mut().zip(row) {
                *acc += value;
            }
        }
        for acc in &mut mean {
            *acc /= n;
        }

        let mut variance = vec![0.0; width];
        for row in rows {
            for ((acc, value), mu) in variance.iter_mut().zip(row).zip(&mean) {
                let delta = value - mu;
                *acc += delta * delta;
            }
        }

        let scale = variance
            .into_iter()
            .map(|sum| {
                let std = (sum / n).sqrt();
                if std == 0.0 || !std.is_finite() {
                    1.0
                } else {
                    std
                }
            })
            .collect();

        Ok(Self { mean, scale })
    }

    /// Number of features this scaler was fit on
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardize one sample with the stored statistics
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features() {
            return Err(CoreError::InvalidInput(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                row.len()
            )));
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mu, sigma))| (value - mu) / sigma)
            .collect())
    }

    /// Standardize every row of a matrix
    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|row| self.transform(row)).collect()
    }

    /// Structural checks used when loading a persisted scaler
    pub fn validate(&self) -> Result<()> {
        if self.mean.len() != self.scale.len() {
            return Err(CoreError::IncompatibleArtifact(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(CoreError::IncompatibleArtifact(
                "scaler contains non-finite statistics".to_string(),
            ));
        }
        if self.scale.iter().any(|s| *s <= 0.0) {
            return Err(CoreError::IncompatibleArtifact(
                "scaler contains a non-positive scale".to_string(),
            ));
        }
        Ok(())
    }
}
