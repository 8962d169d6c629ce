//! Crop Recommendation Trainer - Deterministic offline random forest trainer
//!
//! Turns a labeled agronomic CSV into a scaler, a label encoder and a random
//! forest, persisted as a manifest-bound artifact set. A fixed seed yields
//! byte-identical artifacts across runs and thread counts.

pub mod cart;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod forest;
pub mod insights;
pub mod split;
pub mod trainer;

pub use cart::{CartBuilder, TreeConfig};
pub use dataset::Dataset;
pub use deterministic::{derive_seed, LcgRng};
pub use errors::TrainerError;
pub use forest::{ForestParams, ForestTrainer};
pub use split::{train_test_split, TrainTestSplit};
pub use trainer::{train_and_persist, CropTrainer, TrainingOutcome, TrainingParams};
