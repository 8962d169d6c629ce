//! Dataset and model insights for reporting

use croprec_core::{RandomForest, FEATURE_COUNT, FEATURE_NAMES};

use crate::dataset::Dataset;

/// Rows per label, most frequent first, ties by name
pub fn label_distribution(dataset: &Dataset) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = dataset.label_counts().into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Feature names paired with their importance, most important first
pub fn feature_importance_ranking(forest: &RandomForest) -> Vec<(&'static str, f64)> {
    let mut ranking: Vec<(&'static str, f64)> = FEATURE_NAMES
        .iter()
        .copied()
        .zip(forest.feature_importances.iter().copied())
        .collect();
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranking
}

/// Pearson correlation between every pair of feature columns
///
/// Entries involving a zero-variance column are NaN.
pub fn correlation_matrix(dataset: &Dataset) -> [[f64; FEATURE_COUNT]; FEATURE_COUNT] {
    let n = dataset.len() as f64;
    let means: Vec<f64> = (0..FEATURE_COUNT)
        .map(|i| dataset.column(i).sum::<f64>() / n)
        .collect();

    let mut matrix = [[f64::NAN; FEATURE_COUNT]; FEATURE_COUNT];
    for i in 0..FEATURE_COUNT {
        for j in i..FEATURE_COUNT {
            let (mut cov, mut var_i, mut var_j) = (0.0, 0.0, 0.0);
            for row in &dataset.features {
                let di = row[i] - means[i];
                let dj = row[j] - means[j];
                cov += di * dj;
                var_i += di * di;
                var_j += dj * dj;
            }
            let r = if var_i > 0.0 && var_j > 0.0 {
                (cov / (var_i.sqrt() * var_j.sqrt())).clamp(-1.0, 1.0)
            } else {
                f64::NAN
            };
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}
