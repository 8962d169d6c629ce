//! Bijection between crop names and class codes
//!
//! Codes are positions in the sorted list of distinct labels seen at fit
//! time. They carry no meaning outside the encoder that produced them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::errors::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Sorted distinct labels; the index is the code
    pub classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on every label present in the dataset
    pub fn fit<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();

        if classes.is_empty() {
            return Err(CoreError::InvalidParameters(
                "cannot fit a label encoder without labels".to_string(),
            ));
        }

        Ok(Self {
            classes: classes.into_iter().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Code for a label seen at fit time
    pub fn transform(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map_err(|_| CoreError::InvalidInput(format!("unknown label: {label}")))
    }

    /// Codes for a batch of labels
    pub fn transform_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|label| self.transform(label.as_ref()))
            .collect()
    }

    /// Label for a code produced by this encoder
    pub fn inverse_transform(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| {
                CoreError::IncompatibleArtifact(format!(
                    "class code {} outside encoder range 0..{}",
                    code,
                    self.classes.len()
                ))
            })
    }

    /// Structural checks used when loading a persisted encoder
    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(CoreError::IncompatibleArtifact(
                "label encoder has no classes".to_string(),
            ));
        }
        if self.classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(CoreError::IncompatibleArtifact(
                "label encoder classes are not sorted and unique".to_string(),
            ));
        }
        Ok(())
    }
}
