//! Error types for the crop recommendation core

use std::path::PathBuf;
use thiserror::Error;

use crate::serde_canon::CanonicalError;

/// How a caller should react to a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Artifacts are missing or inconsistent; regenerate them with the trainer.
    Configuration,
    /// The request itself is malformed; fix the input and call again.
    CallerInput,
}

/// Errors that can occur in the core module
#[derive(Error, Debug)]
pub enum CoreError {
    /// An artifact file does not exist
    #[error("Missing artifact: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// An artifact was readable but does not fit the expected shape
    #[error("Incompatible artifact: {0}")]
    IncompatibleArtifact(String),

    /// The manifest disagrees with the artifacts next to it
    #[error("Manifest mismatch: {0}")]
    ManifestMismatch(String),

    /// Malformed feature vector or label
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid fitting parameters or training data
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Canonical serialization error
    #[error("Canonical serialization error: {0}")]
    Canonical(#[from] CanonicalError),
}

impl CoreError {
    /// Classify the error for callers deciding whether a retry with new input makes sense.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidInput(_) => ErrorKind::CallerInput,
            _ => ErrorKind::Configuration,
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_caller_errors() {
        assert_eq!(
            CoreError::InvalidInput("x".into()).kind(),
            ErrorKind::CallerInput
        );
        assert_eq!(
            CoreError::MissingArtifact(PathBuf::from("scaler.json")).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            CoreError::ManifestMismatch("digest".into()).kind(),
            ErrorKind::Configuration
        );
    }
}
