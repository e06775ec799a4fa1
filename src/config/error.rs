//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file or folder could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax error or a value of the wrong type.
    #[error("invalid TOML in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    /// A required setting is absent.
    #[error("missing required setting: {0}")]
    MissingKey(&'static str),

    /// A setting is present but unusable.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// A folder contains no configuration files.
    #[error("no configuration files found in {0}")]
    NoConfigs(PathBuf),
}

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
