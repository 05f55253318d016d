//! Grid loading error types.

use std::path::PathBuf;

/// Errors that can occur while loading a grid or workbook.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Reading the underlying file failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A workbook had fewer sheets than the pipeline needs
    #[error("expected at least {expected} sheet(s), found {found}")]
    MissingSheet { expected: usize, found: usize },
}
