use std::path::PathBuf;

use thiserror::Error;

use crate::wfdb::DecodeError;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Everything that can go wrong while building or reading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed metadata CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The metadata table is readable but does not have the expected shape.
    #[error("invalid metadata table: {0}")]
    Metadata(String),

    #[error("unknown channel '{0}' (expected one of i, ii, iii, avr, avl, avf, V1-V6)")]
    UnknownChannel(String),

    #[error("unknown reference column '{0}'")]
    UnknownColumn(String),

    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("transform failed for {path}: {message}")]
    Transform { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}
