//! Crop Recommendation Core
//!
//! Everything the offline trainer and the online predictor must agree on:
//! the feature schema, the fitted preprocessing artifacts, the forest model
//! format and the manifest that binds them together.
//!
//! Modules:
//! - `features`: Feature order, entry-form ranges and feature vectors
//! - `scaler`: Per-feature standardization
//! - `label_encoder`: Crop name to class code bijection
//! - `forest`: Random forest classifier inference
//! - `artifacts`: Persisted artifact set and manifest
//! - `predictor`: Single-sample crop prediction
//! - `crop_info`: Static crop descriptions
//! - `serde_canon`: Canonical JSON and Blake3 digests

pub mod artifacts;
pub mod crop_info;
pub mod errors;
pub mod features;
pub mod forest;
pub mod label_encoder;
pub mod predictor;
pub mod scaler;
pub mod serde_canon;

pub use artifacts::{ArtifactSet, Manifest, TrainingSummary};
pub use crop_info::{CropInfo, UNKNOWN_CROP_INFO};
pub use errors::{CoreError, ErrorKind, Result};
pub use features::{FeatureRange, FeatureSchema, FeatureVector, FEATURE_COUNT, FEATURE_NAMES, FEATURE_RANGES};
pub use forest::{Node, RandomForest, Tree};
pub use label_encoder::LabelEncoder;
pub use predictor::{Predictor, Recommendation};
pub use scaler::StandardScaler;
