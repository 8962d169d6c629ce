//! Seeded train/test partition

use crate::deterministic::LcgRng;
use crate::errors::{Result, TrainerError};

/// Row indices for the two partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(n * test_ratio)` rows.
///
/// Both partitions must be non-empty; a ratio outside (0, 1) or a dataset too
/// small to leave a training row is an error.
pub fn train_test_split(n: usize, test_ratio: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(TrainerError::Training(format!(
            "test ratio must be between 0 and 1, got {test_ratio}"
        )));
    }

    let n_test = (n as f64 * test_ratio).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(TrainerError::Training(format!(
            "{n} rows cannot be split with test ratio {test_ratio}"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    LcgRng::new(seed).shuffle(&mut order);

    let train = order.split_off(n_test);
    Ok(TrainTestSplit { train, test: order })
}
