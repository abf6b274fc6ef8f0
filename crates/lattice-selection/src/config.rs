//! Loader configuration: TOML file with defaults for every field.
//!
//! ```toml
//! load_delay_ms = 1000
//! seed_counts = [1, 42, 100]
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::logging::targets;
use crate::rows::RowCollection;

/// Default delay before a selected row's detail loads.
pub const DEFAULT_LOAD_DELAY_MS: u64 = 1_000;

/// Configuration for a [`SelectionLoader`](crate::SelectionLoader).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoaderConfig {
    /// How long a selection stays in the loading phase, in milliseconds.
    pub load_delay_ms: u64,
    /// Counts of the rows the loader starts with, in display order.
    pub seed_counts: Vec<i64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            load_delay_ms: DEFAULT_LOAD_DELAY_MS,
            seed_counts: vec![1, 42, 100],
        }
    }
}

impl LoaderConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            target: targets::CONFIG,
            path = %path.display(),
            load_delay_ms = config.load_delay_ms,
            rows = config.seed_counts.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Reject values the loader cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.load_delay_ms == 0 {
            return Err(ConfigError::Invalid(
                "load_delay_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    /// Fresh rows for the configured seed counts.
    pub fn seed_rows(&self) -> RowCollection {
        RowCollection::from_counts(self.seed_counts.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.load_delay(), Duration::from_secs(1));
        assert_eq!(config.seed_rows().len(), 3);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = LoaderConfig::from_toml_str("load_delay_ms = 250").unwrap();
        assert_eq!(config.load_delay(), Duration::from_millis(250));
        assert_eq!(config.seed_counts, vec![1, 42, 100]);

        let config = LoaderConfig::from_toml_str("").unwrap();
        assert_eq!(config, LoaderConfig::default());
    }

    #[test]
    fn test_zero_delay_is_invalid() {
        let err = LoaderConfig::from_toml_str("load_delay_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = LoaderConfig::from_toml_str("seed_counts = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "load_delay_ms = 10\nseed_counts = [7, 8]").unwrap();

        let config = LoaderConfig::load(file.path()).unwrap();
        assert_eq!(config.load_delay_ms, 10);
        assert_eq!(config.seed_counts, vec![7, 8]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LoaderConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
