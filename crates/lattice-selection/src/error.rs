//! Error types for the selection crate.
//!
//! The loader operations themselves are total. Errors only come from building
//! the row collection and from loading configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::RowId;

/// Errors from row collection management.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// A row with this id is already in the collection.
    #[error("duplicate row id: {0}")]
    DuplicateId(RowId),
}

/// Errors from loading a [`LoaderConfig`](crate::LoaderConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but a value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for row operations.
pub type RowResult<T> = Result<T, RowError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
