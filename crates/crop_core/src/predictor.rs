//! Crop prediction from a loaded artifact set
//!
//! A [`Predictor`] owns the artifacts for its whole lifetime and never
//! mutates them; construct it once at startup and pass it by reference.

use std::path::Path;
use tracing::debug;

use crate::artifacts::{ArtifactSet, Manifest};
use crate::crop_info::{display_name, CropInfo};
use crate::errors::Result;
use crate::features::FeatureVector;

/// One crop recommendation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    /// Crop name exactly as it appears in the training labels
    pub crop: String,
    /// Class code inside the encoder that produced it
    pub code: usize,
    pub info: CropInfo,
}

impl Recommendation {
    /// Crop name for display ("Rice")
    pub fn display_name(&self) -> String {
        display_name(&self.crop)
    }
}

#[derive(Debug, Clone)]
pub struct Predictor {
    artifacts: ArtifactSet,
    manifest: Option<Manifest>,
}

impl Predictor {
    /// Wrap an in-memory artifact set after checking it is consistent
    pub fn new(artifacts: ArtifactSet) -> Result<Self> {
        artifacts.validate()?;
        Ok(Self {
            artifacts,
            manifest: None,
        })
    }

    /// Load the artifact set in `dir`, verifying it against its manifest
    pub fn load(dir: &Path) -> Result<Self> {
        let (artifacts, manifest) = ArtifactSet::load(dir)?;
        Ok(Self {
            artifacts,
            manifest: Some(manifest),
        })
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    pub fn artifacts(&self) -> &ArtifactSet {
        &self.artifacts
    }

    /// Every crop this predictor can return
    pub fn labels(&self) -> &[String] {
        self.artifacts.encoder.classes()
    }

    /// Scale, classify and decode one sample
    pub fn predict(&self, features: &FeatureVector) -> Result<Recommendation> {
        features.ensure_finite()?;

        let scaled = self.artifacts.scaler.transform(features.as_slice())?;
        let code = self.artifacts.forest.predict(&scaled)?;
        let crop = self.artifacts.encoder.inverse_transform(code)?.to_string();
        let info = CropInfo::lookup(&crop);

        debug!(code, crop = %crop, "prediction");
        Ok(Recommendation { crop, code, info })
    }

    /// Predict from an ordered slice, rejecting the wrong dimensionality
    pub fn predict_slice(&self, values: &[f64]) -> Result<Recommendation> {
        self.predict(&FeatureVector::from_slice(values)?)
    }
}
