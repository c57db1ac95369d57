//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a [`DatasetConfig`](crate::DatasetConfig),
/// or while compiling its tables into samplers.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid YAML for this schema.
    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// The date range ends before it starts.
    #[error("Invalid date range: end {end} precedes start {start}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// A table or population that must have at least one entry is empty.
    #[error("{0} must not be empty")]
    EmptyTable(String),

    /// A weight table cannot be sampled from.
    #[error("Invalid weights for {table}: {reason}")]
    InvalidWeights { table: String, reason: String },

    /// An inclusive range has min > max (or a non-finite bound).
    #[error("Invalid range for {field}: [{min}, {max}]")]
    InvalidRange {
        field: String,
        min: String,
        max: String,
    },

    /// A probability outside [0, 1].
    #[error("Invalid probability for {field}: {value}")]
    InvalidProbability { field: String, value: f64 },

    /// Any other out-of-domain parameter.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    /// Create an empty table error.
    pub fn empty(table: impl Into<String>) -> Self {
        Self::EmptyTable(table.into())
    }

    /// Create an invalid weights error.
    pub fn weights(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidWeights {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid range error.
    pub fn range(
        field: impl Into<String>,
        min: impl std::fmt::Display,
        max: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidRange {
            field: field.into(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Create an invalid value error.
    pub fn value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
