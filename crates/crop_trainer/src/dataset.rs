//! CSV dataset loading
//!
//! Reads the labeled agronomic dataset (`N,P,K,temperature,humidity,ph,rainfall,label`).
//! Columns are located by header name, case-insensitively, so `pH` and `ph`
//! both resolve to the same feature and column position does not matter.

use croprec_core::features::{FEATURE_COUNT, FEATURE_NAMES, LABEL_COLUMN};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::errors::{Result, TrainerError};

/// Labeled samples with features in canonical order
#[derive(Clone, Debug)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<String>,
}

/// Position of each required column in the file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    features: [usize; FEATURE_COUNT],
    label: usize,
    width: usize,
}

impl ColumnMap {
    fn from_header(header: &StringRecord) -> Result<Self> {
        let names: Vec<String> = header
            .iter()
            .map(|name| name.trim_start_matches('\u{feff}').trim().to_ascii_lowercase())
            .collect();

        let find = |wanted: &str| -> Result<usize> {
            let wanted = wanted.to_ascii_lowercase();
            let mut hits = names
                .iter()
                .enumerate()
                .filter(|(_, name)| **name == wanted)
                .map(|(idx, _)| idx);
            let first = hits
                .next()
                .ok_or_else(|| TrainerError::MissingColumn(wanted.clone()))?;
            if hits.next().is_some() {
                return Err(TrainerError::Dataset(format!(
                    "column `{wanted}` appears more than once in the header"
                )));
            }
            Ok(first)
        };

        let mut features = [0usize; FEATURE_COUNT];
        for (slot, name) in features.iter_mut().zip(FEATURE_NAMES.iter()) {
            *slot = find(name)?;
        }
        let label = find(LABEL_COLUMN)?;

        Ok(Self {
            features,
            label,
            width: names.len(),
        })
    }
}

impl Dataset {
    /// Load dataset from CSV file
    /// Expected format: header row, then one sample per line
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|err| {
            TrainerError::Dataset(format!("failed to read {}: {}", path.display(), err))
        })?;
        Self::from_reader(file)
    }

    /// Parse CSV text with a header row
    pub fn parse(content: &str) -> Result<Self> {
        Self::from_reader(content.as_bytes())
    }

    fn from_reader<R: Read>(source: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(source);

        let header = reader.headers()?.clone();
        if header.iter().all(str::is_empty) {
            return Err(TrainerError::Dataset("Dataset is empty".to_string()));
        }
        let columns = ColumnMap::from_header(&header)?;

        let mut features = Vec::new();
        let mut labels = Vec::new();

        for record in reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line_no = record.position().map_or(0, |pos| pos.line());
            if record.len() != columns.width {
                return Err(TrainerError::Dataset(format!(
                    "Line {}: expected {} columns, got {}",
                    line_no,
                    columns.width,
                    record.len()
                )));
            }

            let mut row = Vec::with_capacity(FEATURE_COUNT);
            for (&col, name) in columns.features.iter().zip(FEATURE_NAMES.iter()) {
                let field = &record[col];
                let value: f64 = field.parse().map_err(|_| {
                    TrainerError::Dataset(format!(
                        "Line {}, column {}: invalid number `{}`",
                        line_no, name, field
                    ))
                })?;
                if !value.is_finite() {
                    return Err(TrainerError::Dataset(format!(
                        "Line {}, column {}: value is not finite",
                        line_no, name
                    )));
                }
                row.push(value);
            }

            let label = &record[columns.label];
            if label.is_empty() {
                return Err(TrainerError::Dataset(format!("Line {}: empty label", line_no)));
            }

            features.push(row);
            labels.push(label.to_string());
        }

        if features.is_empty() {
            return Err(TrainerError::Dataset("Dataset has no rows".to_string()));
        }

        Ok(Self { features, labels })
    }

    /// Get number of samples
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if dataset is empty
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Values of one feature column
    pub fn column(&self, idx: usize) -> impl Iterator<Item = f64> + '_ {
        self.features.iter().map(move |row| row[idx])
    }

    /// Per-feature (min, max) for logging and sanity checks
    pub fn feature_stats(&self) -> Vec<(f64, f64)> {
        let mut stats = vec![(f64::INFINITY, f64::NEG_INFINITY); FEATURE_COUNT];

        for row in &self.features {
            for (i, &val) in row.iter().enumerate() {
                stats[i].0 = stats[i].0.min(val);
                stats[i].1 = stats[i].1.max(val);
            }
        }

        stats
    }

    /// Number of rows per label
    pub fn label_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
N,P,K,temperature,humidity,ph,rainfall,label
90,42,43,20.87,82.00,6.50,202.93,rice
85,58,41,21.77,80.31,7.03,226.65,rice
60,55,44,23.00,82.32,7.84,263.96,rice
71,54,16,22.61,63.69,5.74,87.75,maize
";

    #[test]
    fn test_load_csv() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(SAMPLE.as_bytes())?;
        file.flush()?;

        let dataset = Dataset::from_csv(file.path())?;

        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.features[0], vec![90.0, 42.0, 43.0, 20.87, 82.0, 6.5, 202.93]);
        assert_eq!(dataset.labels[3], "maize");
        Ok(())
    }

    #[test]
    fn test_header_is_case_insensitive_and_order_free() -> anyhow::Result<()> {
        let csv = "label,rainfall,pH,Humidity,Temperature,k,p,n\nrice,202.9,6.5,82,20.9,43,42,90\n";
        let dataset = Dataset::parse(csv)?;

        assert_eq!(dataset.features[0], vec![90.0, 42.0, 43.0, 20.9, 82.0, 6.5, 202.9]);
        assert_eq!(dataset.labels[0], "rice");
        Ok(())
    }

    #[test]
    fn test_missing_column() {
        let csv = "N,P,K,temperature,humidity,rainfall,label\n1,2,3,4,5,6,rice\n";
        let err = Dataset::parse(csv).unwrap_err();
        assert!(matches!(err, TrainerError::MissingColumn(ref col) if col == "ph"));

        let csv = "N,P,K,temperature,humidity,ph,rainfall\n1,2,3,4,5,6,7\n";
        let err = Dataset::parse(csv).unwrap_err();
        assert!(matches!(err, TrainerError::MissingColumn(ref col) if col == "label"));
    }

    #[test]
    fn test_invalid_number_names_line_and_column() {
        let csv = "N,P,K,temperature,humidity,ph,rainfall,label\n1,2,x,4,5,6,7,rice\n";
        let err = Dataset::parse(csv).unwrap_err().to_string();
        assert!(err.contains("Line 2"));
        assert!(err.contains("column K"));
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let csv = "N,P,K,temperature,humidity,ph,rainfall,label\n1,2,3,4,5,6,rice\n";
        assert!(Dataset::parse(csv).is_err());
    }

    #[test]
    fn test_header_only_is_rejected() {
        assert!(Dataset::parse("N,P,K,temperature,humidity,ph,rainfall,label\n").is_err());
        assert!(Dataset::parse("").is_err());
    }

    #[test]
    fn test_quoted_labels_keep_commas_and_quotes() -> anyhow::Result<()> {
        let csv = "\
N,P,K,temperature,humidity,ph,rainfall,label
90,42,43,20.9,82,6.5,202.9,\"rice, paddy\"
85,58,41,21.8,80.3,7.0,226.7,\"rice \"\"basmati\"\"\"
";
        let dataset = Dataset::parse(csv)?;

        assert_eq!(dataset.labels, vec!["rice, paddy", "rice \"basmati\""]);
        assert_eq!(dataset.features[1][6], 226.7);
        Ok(())
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() -> anyhow::Result<()> {
        let csv = "\u{feff}N, P, K, temperature, humidity, ph, rainfall, label

# first batch
90, 42, 43, 20.9, 82, 6.5, 202.9, rice
   
";
        let dataset = Dataset::parse(csv)?;

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.labels[0], "rice");
        Ok(())
    }

    #[test]
    fn test_error_line_counts_skipped_lines() {
        let csv = "N,P,K,temperature,humidity,ph,rainfall,label\n\n1,2,3,4,5,6,7,rice\n1,2,3,4,5,oops,7,rice\n";
        let err = Dataset::parse(csv).unwrap_err().to_string();
        assert!(err.contains("Line 4"), "{err}");
        assert!(err.contains("column ph"), "{err}");
    }

    #[test]
    fn test_feature_stats_and_counts() -> anyhow::Result<()> {
        let dataset = Dataset::parse(SAMPLE)?;

        let stats = dataset.feature_stats();
        assert_eq!(stats.len(), FEATURE_COUNT);
        assert_eq!(stats[0], (60.0, 90.0));
        assert_eq!(stats[6], (87.75, 263.96));

        let counts = dataset.label_counts();
        assert_eq!(counts.get("rice"), Some(&3));
        assert_eq!(counts.get("maize"), Some(&1));
        Ok(())
    }
}
