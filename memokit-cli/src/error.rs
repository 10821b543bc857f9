//! Error types for the memo command-line tool.

use std::io;
use std::path::PathBuf;

/// Errors that can occur while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file exists but cannot be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The configuration is not valid TOML or has invalid values.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors that abort a command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Output could not be written.
    #[error("cannot write output: {0}")]
    Io(#[from] io::Error),

    /// Output could not be rendered as JSON.
    #[error("cannot render output: {0}")]
    Json(#[from] serde_json::Error),
}
