//! Error types for rh-io.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: {source}")]
    Json {
        file:   &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{file}: {source}")]
    Csv {
        file:   &'static str,
        #[source]
        source: csv::Error,
    },

    /// A row parsed as CSV but its content is unusable.
    #[error("{file} line {line}: {message}")]
    Row {
        file:    &'static str,
        line:    u64,
        message: String,
    },
}

/// Alias for `Result<T, LoadError>`.
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors that can occur when writing run output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
