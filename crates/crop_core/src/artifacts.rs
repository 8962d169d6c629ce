//! Artifact contract between the trainer and the predictor
//!
//! A model directory holds three independently serialized artifacts and a
//! manifest that ties them together:
//!
//! ```text
//! models/crop/
//!   scaler.json          StandardScaler
//!   label_encoder.json   LabelEncoder
//!   classifier.json      RandomForest
//!   manifest.json        schema, label set, Blake3 digests, training summary
//! ```
//!
//! Every file is canonical JSON. The manifest records the digest of the exact
//! bytes of each artifact, so replacing one artifact without the others is
//! detected at load time instead of producing silently wrong predictions.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{CoreError, Result};
use crate::features::{FeatureSchema, FEATURE_COUNT};
use crate::forest::RandomForest;
use crate::label_encoder::LabelEncoder;
use crate::scaler::StandardScaler;
use crate::serde_canon::{digest_hex, to_canonical_json};

pub const SCALER_FILE: &str = "scaler.json";
pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Current manifest format version
pub const MANIFEST_FORMAT_VERSION: u32 = 1;

const STAGING_DIR: &str = ".staging";

/// Blake3 digests (hex) of each artifact file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDigests {
    pub scaler: String,
    pub label_encoder: String,
    pub classifier: String,
}

/// Parameters and outcome of the training run that produced an artifact set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Unix timestamp (seconds)
    pub created_at: u64,
    pub n_trees: usize,
    pub seed: u64,
    pub test_ratio: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Held-out accuracy in [0, 1]
    pub accuracy: f64,
}

/// Schema descriptor written next to the artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub schema: FeatureSchema,
    pub labels: Vec<String>,
    pub digests: ArtifactDigests,
    pub training: TrainingSummary,
}

/// The scaler, label encoder and classifier produced by one training run
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSet {
    pub scaler: StandardScaler,
    pub encoder: LabelEncoder,
    pub forest: RandomForest,
}

/// Outcome of checking one artifact file against the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCheck {
    pub file: &'static str,
    pub expected: String,
    /// `None` when the file is missing
    pub actual: Option<String>,
}

impl ArtifactCheck {
    pub fn is_ok(&self) -> bool {
        self.actual.as_deref() == Some(self.expected.as_str())
    }
}

impl ArtifactSet {
    /// Check that the three artifacts agree with each other and with the feature schema
    pub fn validate(&self) -> Result<()> {
        self.scaler.validate()?;
        self.encoder.validate()?;
        self.forest.validate()?;

        if self.scaler.n_features() != FEATURE_COUNT {
            return Err(CoreError::IncompatibleArtifact(format!(
                "scaler was fit on {} features, expected {}",
                self.scaler.n_features(),
                FEATURE_COUNT
            )));
        }
        if self.forest.n_features != FEATURE_COUNT {
            return Err(CoreError::IncompatibleArtifact(format!(
                "classifier was fit on {} features, expected {}",
                self.forest.n_features, FEATURE_COUNT
            )));
        }
        if self.forest.n_classes != self.encoder.len() {
            return Err(CoreError::IncompatibleArtifact(format!(
                "classifier has {} classes but label encoder has {}",
                self.forest.n_classes,
                self.encoder.len()
            )));
        }
        Ok(())
    }

    /// Persist all artifacts and the manifest into `dir`
    ///
    /// Files are written to a staging directory first and moved into place
    /// with the manifest last.
    pub fn save(&self, dir: &Path, training: TrainingSummary) -> Result<Manifest> {
        self.validate()?;

        let scaler_json = to_canonical_json(&self.scaler)?;
        let encoder_json = to_canonical_json(&self.encoder)?;
        let forest_json = to_canonical_json(&self.forest)?;

        let manifest = Manifest {
            format_version: MANIFEST_FORMAT_VERSION,
            schema: FeatureSchema::canonical(),
            labels: self.encoder.classes().to_vec(),
            digests: ArtifactDigests {
                scaler: digest_hex(scaler_json.as_bytes()),
                label_encoder: digest_hex(encoder_json.as_bytes()),
                classifier: digest_hex(forest_json.as_bytes()),
            },
            training,
        };
        let manifest_json = to_canonical_json(&manifest)?;

        fs::create_dir_all(dir)?;
        let staging = dir.join(STAGING_DIR);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        let files = [
            (SCALER_FILE, &scaler_json),
            (LABEL_ENCODER_FILE, &encoder_json),
            (CLASSIFIER_FILE, &forest_json),
            (MANIFEST_FILE, &manifest_json),
        ];
        for (name, contents) in files {
            fs::write(staging.join(name), contents)?;
            debug!("Staged {} ({} bytes)", name, contents.len());
        }
        for (name, _) in files {
            fs::rename(staging.join(name), dir.join(name))?;
        }
        fs::remove_dir(&staging)?;

        info!("Saved artifact set to {}", dir.display());
        Ok(manifest)
    }

    /// Load and cross-check an artifact set written by [`ArtifactSet::save`]
    pub fn load(dir: &Path) -> Result<(Self, Manifest)> {
        let manifest = read_manifest(dir)?;

        let scaler: StandardScaler =
            load_verified(&dir.join(SCALER_FILE), &manifest.digests.scaler)?;
        let encoder: LabelEncoder =
            load_verified(&dir.join(LABEL_ENCODER_FILE), &manifest.digests.label_encoder)?;
        let forest: RandomForest =
            load_verified(&dir.join(CLASSIFIER_FILE), &manifest.digests.classifier)?;

        let set = Self {
            scaler,
            encoder,
            forest,
        };
        set.validate()?;

        if set.encoder.classes() != manifest.labels.as_slice() {
            return Err(CoreError::ManifestMismatch(format!(
                "label set {:?} does not match encoder classes {:?}",
                manifest.labels,
                set.encoder.classes()
            )));
        }

        info!(
            "Loaded artifact set from {} ({} trees, {} labels)",
            dir.display(),
            set.forest.num_trees(),
            set.encoder.len()
        );
        Ok((set, manifest))
    }
}

/// Read the manifest and check its format version and feature schema
pub fn read_manifest(dir: &Path) -> Result<Manifest> {
    let bytes = read_artifact(&dir.join(MANIFEST_FILE))?;
    let manifest: Manifest = serde_json::from_slice(&bytes)?;

    if manifest.format_version != MANIFEST_FORMAT_VERSION {
        return Err(CoreError::ManifestMismatch(format!(
            "unsupported manifest version {}",
            manifest.format_version
        )));
    }
    manifest.schema.ensure_canonical()?;
    Ok(manifest)
}

/// Compare every artifact file's digest against the manifest without parsing it
pub fn verify_digests(dir: &Path) -> Result<Vec<ArtifactCheck>> {
    let manifest = read_manifest(dir)?;
    let expected = [
        (SCALER_FILE, manifest.digests.scaler),
        (LABEL_ENCODER_FILE, manifest.digests.label_encoder),
        (CLASSIFIER_FILE, manifest.digests.classifier),
    ];

    let mut checks = Vec::with_capacity(expected.len());
    for (file, digest) in expected {
        let actual = match read_artifact(&dir.join(file)) {
            Ok(bytes) => Some(digest_hex(&bytes)),
            Err(CoreError::MissingArtifact(_)) => None,
            Err(err) => return Err(err),
        };
        checks.push(ArtifactCheck {
            file,
            expected: digest,
            actual,
        });
    }
    Ok(checks)
}

fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|err| match err.kind() {
        IoErrorKind::NotFound => CoreError::MissingArtifact(PathBuf::from(path)),
        _ => CoreError::Io(err),
    })
}

fn load_verified<T: DeserializeOwned>(path: &Path, expected_digest: &str) -> Result<T> {
    let bytes = read_artifact(path)?;
    let actual = digest_hex(&bytes);
    if !actual.eq_ignore_ascii_case(expected_digest) {
        return Err(CoreError::ManifestMismatch(format!(
            "{} digest {} does not match manifest {}",
            path.display(),
            actual,
            expected_digest
        )));
    }
    serde_json::from_slice(&bytes).map_err(|err| {
        CoreError::IncompatibleArtifact(format!("{}: {}", path.display(), err))
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::{sample_set, sample_summary};
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let set = sample_set();

        let saved = set.save(dir.path(), sample_summary()).unwrap();
        let (loaded, manifest) = ArtifactSet::load(dir.path()).unwrap();

        assert_eq!(set, loaded);
        assert_eq!(saved, manifest);
        assert_eq!(manifest.labels, vec!["maize", "rice"]);
        assert!(!dir.path().join(STAGING_DIR).exists());
    }

    #[test]
    fn test_missing_artifact_is_reported() {
        let dir = TempDir::new().unwrap();
        sample_set().save(dir.path(), sample_summary()).unwrap();
        fs::remove_file(dir.path().join(SCALER_FILE)).unwrap();

        let err = ArtifactSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::MissingArtifact(ref p) if p.ends_with(SCALER_FILE)));
    }

    #[test]
    fn test_empty_directory_is_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = ArtifactSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::MissingArtifact(ref p) if p.ends_with(MANIFEST_FILE)));
    }

    #[test]
    fn test_swapped_artifact_is_rejected() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        sample_set().save(first.path(), sample_summary()).unwrap();

        let mut other = sample_set();
        other.scaler.mean[6] += 1.0;
        other.save(second.path(), sample_summary()).unwrap();

        fs::copy(
            second.path().join(SCALER_FILE),
            first.path().join(SCALER_FILE),
        )
        .unwrap();

        let err = ArtifactSet::load(first.path()).unwrap_err();
        assert!(matches!(err, CoreError::ManifestMismatch(_)));

        let checks = verify_digests(first.path()).unwrap();
        assert!(!checks[0].is_ok());
        assert!(checks[1].is_ok());
        assert!(checks[2].is_ok());
    }

    #[test]
    fn test_inconsistent_set_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let mut set = sample_set();
        set.forest.n_classes = 3;

        assert!(set.save(dir.path(), sample_summary()).is_err());
        assert!(!dir.path().join(MANIFEST_FILE).exists());
    }

    #[test]
    fn test_reordered_schema_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut manifest = sample_set().save(dir.path(), sample_summary()).unwrap();
        manifest.schema.features.swap(0, 1);
        fs::write(
            dir.path().join(MANIFEST_FILE),
            to_canonical_json(&manifest).unwrap(),
        )
        .unwrap();

        assert!(matches!(
            ArtifactSet::load(dir.path()),
            Err(CoreError::ManifestMismatch(_))
        ));
    }

    #[test]
    fn test_relabeled_manifest_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut manifest = sample_set().save(dir.path(), sample_summary()).unwrap();
        manifest.labels = vec!["maize".to_string(), "wheat".to_string()];
        fs::write(
            dir.path().join(MANIFEST_FILE),
            to_canonical_json(&manifest).unwrap(),
        )
        .unwrap();

        assert!(verify_digests(dir.path()).unwrap().iter().all(|c| c.is_ok()));
        let err = ArtifactSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::ManifestMismatch(ref msg) if msg.contains("label set")));
    }
}
