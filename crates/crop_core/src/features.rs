//! Feature schema and feature vectors
//!
//! The classifier consumes seven soil and climate measurements in a fixed
//! order. The order below is the training column order and is recorded in
//! every artifact manifest.

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Number of features in a sample
pub const FEATURE_COUNT: usize = 7;

/// Canonical feature names in training column order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// Name of the label column in the dataset
pub const LABEL_COLUMN: &str = "label";

/// Application-level bounds and default for one feature.
///
/// The predictor never enforces these; input sources (the CLI form) do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRange {
    pub name: &'static str,
    pub description: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl FeatureRange {
    /// Check a value against the bounds (inclusive)
    pub fn check(&self, value: f64) -> Result<f64> {
        if !value.is_finite() || value < self.min || value > self.max {
            return Err(CoreError::InvalidInput(format!(
                "{} must be between {} and {}, got {}",
                self.description, self.min, self.max, value
            )));
        }
        Ok(value)
    }
}

/// Entry-form ranges, in feature order
pub const FEATURE_RANGES: [FeatureRange; FEATURE_COUNT] = [
    FeatureRange { name: "N", description: "Nitrogen (N)", min: 0.0, max: 150.0, default: 50.0 },
    FeatureRange { name: "P", description: "Phosphorus (P)", min: 0.0, max: 150.0, default: 50.0 },
    FeatureRange { name: "K", description: "Potassium (K)", min: 0.0, max: 210.0, default: 50.0 },
    FeatureRange { name: "temperature", description: "Temperature (°C)", min: 0.0, max: 50.0, default: 25.0 },
    FeatureRange { name: "humidity", description: "Humidity (%)", min: 0.0, max: 100.0, default: 60.0 },
    FeatureRange { name: "ph", description: "Soil pH", min: 0.0, max: 14.0, default: 6.5 },
    FeatureRange { name: "rainfall", description: "Rainfall (mm)", min: 0.0, max: 300.0, default: 100.0 },
];

/// One ordered sample of the seven raw features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build a vector from named measurements
    pub fn new(
        nitrogen: f64,
        phosphorus: f64,
        potassium: f64,
        temperature: f64,
        humidity: f64,
        ph: f64,
        rainfall: f64,
    ) -> Self {
        Self([nitrogen, phosphorus, potassium, temperature, humidity, ph, rainfall])
    }

    /// Build a vector from an ordered slice, rejecting wrong dimensionality
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let array: [f64; FEATURE_COUNT] = values.try_into().map_err(|_| {
            CoreError::InvalidInput(format!(
                "expected {} features, got {}",
                FEATURE_COUNT,
                values.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Reject NaN and infinities before they reach the scaler
    pub fn ensure_finite(&self) -> Result<()> {
        for (name, value) in FEATURE_NAMES.iter().zip(self.0.iter()) {
            if !value.is_finite() {
                return Err(CoreError::InvalidInput(format!(
                    "feature {name} is not a finite number: {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn nitrogen(&self) -> f64 {
        self.0[0]
    }

    pub fn temperature(&self) -> f64 {
        self.0[3]
    }

    pub fn humidity(&self) -> f64 {
        self.0[4]
    }
}

impl Default for FeatureVector {
    /// The entry form defaults
    fn default() -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, range) in values.iter_mut().zip(FEATURE_RANGES.iter()) {
            *slot = range.default;
        }
        Self(values)
    }
}

/// Ordered feature names persisted with each artifact set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub features: Vec<String>,
}

impl FeatureSchema {
    /// The schema every trainer in this crate writes
    pub fn canonical() -> Self {
        Self {
            features: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// Fail unless the schema lists exactly the canonical features in order
    pub fn ensure_canonical(&self) -> Result<()> {
        let expected = Self::canonical();
        if *self != expected {
            return Err(CoreError::ManifestMismatch(format!(
                "feature order {:?} does not match expected {:?}",
                self.features, expected.features
            )));
        }
        Ok(())
    }
}
