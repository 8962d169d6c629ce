use croprec_core::CoreError;
use thiserror::Error;

/// Errors returned by the deterministic trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("dataset is missing required column `{0}`")]
    MissingColumn(String),

    #[error("training error: {0}")]
    Training(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
