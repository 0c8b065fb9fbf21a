use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BankError {
    #[error("Subtype '{0}' not found in the dataset.")]
    NotFound(String),

    #[error("Conversion rate cannot be zero.")]
    DivisionByZero { subtype: String },

    #[error("Estimate for '{subtype}' is out of range.")]
    OutOfRange { subtype: String },

    #[error("CO2 emission dataset file not found.")]
    DatasetMissing(PathBuf),

    #[error("Dataset read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset parse failed: {0}")]
    Csv(#[from] csv::Error),
}

impl BankError {
    /// Failures caused by what the caller asked for, as opposed to a broken dataset.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            BankError::NotFound(_) | BankError::DivisionByZero { .. } | BankError::OutOfRange { .. }
        )
    }
}
