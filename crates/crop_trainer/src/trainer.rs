//! End-to-end training pipeline
//!
//! encode labels -> scale features -> seeded split -> fit forest -> score held-out rows

use chrono::Utc;
use croprec_core::{
    ArtifactSet, LabelEncoder, Manifest, StandardScaler, TrainingSummary, FEATURE_NAMES,
};
use std::path::Path;
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::errors::Result;
use crate::forest::{ForestParams, ForestTrainer};
use crate::split::train_test_split;

/// Parameters for one training run
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingParams {
    pub forest: ForestParams,
    /// Fraction of rows held out for evaluation
    pub test_ratio: f64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            forest: ForestParams::default(),
            test_ratio: 0.2,
        }
    }
}

/// Artifacts plus the summary recorded in the manifest
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifacts: ArtifactSet,
    pub summary: TrainingSummary,
}

/// Crop recommendation trainer
pub struct CropTrainer {
    params: TrainingParams,
}

impl CropTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    /// Train a model on the given dataset
    ///
    /// The encoder and scaler are fit on every row before the split; the
    /// same seed drives both the split and the forest.
    pub fn train(&self, dataset: &Dataset) -> Result<TrainingOutcome> {
        let encoder = LabelEncoder::fit(&dataset.labels)?;
        let codes = encoder.transform_all(&dataset.labels)?;
        debug!("Encoded {} classes: {:?}", encoder.len(), encoder.classes());

        let scaler = StandardScaler::fit(&dataset.features)?;
        let scaled = scaler.transform_all(&dataset.features)?;

        let seed = self.params.forest.seed;
        let split = train_test_split(dataset.len(), self.params.test_ratio, seed)?;
        let (train_x, train_y) = gather(&scaled, &codes, &split.train);
        let (test_x, test_y) = gather(&scaled, &codes, &split.test);
        info!(
            "Split {} rows into {} train / {} test (seed {})",
            dataset.len(),
            train_x.len(),
            test_x.len(),
            seed
        );

        let forest = ForestTrainer::new(self.params.forest.clone()).fit(
            &train_x,
            &train_y,
            encoder.len(),
        )?;
        let accuracy = forest.accuracy(&test_x, &test_y)?;
        info!("Held-out accuracy: {:.4}", accuracy);

        let summary = TrainingSummary {
            created_at: Utc::now().timestamp().max(0) as u64,
            n_trees: forest.num_trees(),
            seed,
            test_ratio: self.params.test_ratio,
            train_rows: train_x.len(),
            test_rows: test_x.len(),
            accuracy,
        };

        Ok(TrainingOutcome {
            artifacts: ArtifactSet {
                scaler,
                encoder,
                forest,
            },
            summary,
        })
    }
}

fn gather(rows: &[Vec<f64>], codes: &[usize], idx: &[usize]) -> (Vec<Vec<f64>>, Vec<usize>) {
    idx.iter().map(|&i| (rows[i].clone(), codes[i])).unzip()
}

/// Load `input`, train, and persist the artifacts into `output`
///
/// The dataset is fully validated before anything is written, so a bad
/// input leaves `output` untouched.
pub fn train_and_persist(input: &Path, output: &Path, params: TrainingParams) -> Result<Manifest> {
    info!("Loading dataset from {}", input.display());
    let dataset = Dataset::from_csv(input)?;
    info!(
        "Loaded {} samples across {} labels",
        dataset.len(),
        dataset.label_counts().len()
    );
    info!("Feature statistics:");
    for (name, (min, max)) in FEATURE_NAMES.iter().zip(dataset.feature_stats()) {
        info!("  {:<12} min={}, max={}", name, min, max);
    }

    let outcome = CropTrainer::new(params).train(&dataset)?;

    info!("Saving artifacts to {}", output.display());
    let manifest = outcome.artifacts.save(output, outcome.summary)?;
    Ok(manifest)
}
