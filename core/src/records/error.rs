//! Error types for dataset loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors while reading one of the tabular datasets.
///
/// Individual malformed rows never produce an error; they are dropped and
/// counted in [`LoadReport`](super::LoadReport).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset {}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required column \"{column}\"")]
    MissingColumn { column: &'static str },

    #[error("dataset has no header row")]
    MissingHeader,

    #[error("failed to parse csv header")]
    Header(#[source] csv::Error),
}
