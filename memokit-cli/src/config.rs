//! Memo tool configuration.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! protocol_version = "2.0.0"
//! max_affiliates = 5
//! max_affiliate_bps = 1000
//! max_compact_name_len = 2
//!
//! [names]
//! flash = "thor1flashaddress"
//! treasury = "$TREASURY_ADDRESS"
//! ```
//!
//! # Environment Variables
//!
//! - `MEMOKIT_CONFIG` - Path to configuration file (default: `memokit.toml`)
//! - `MEMOKIT_PROTOCOL_VERSION` - Override the protocol version
//! - Addresses referenced by `$VAR` in the config file

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use memokit::affiliate::DEFAULT_MAX_COMPACT_NAME_LEN;
use memokit::types::Address;
use memokit::{MemoLimits, ProtocolVersion, StaticKeeper};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "memokit.toml";

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z0-9_]+)\}|([A-Za-z0-9_]+))").expect("valid env var regex")
});

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemokitConfig {
    /// Protocol version memos are decoded at (default: newest known).
    #[serde(default = "default_protocol_version")]
    pub protocol_version: ProtocolVersion,

    /// Most affiliates a memo may name.
    #[serde(default = "default_max_affiliates")]
    pub max_affiliates: usize,

    /// Most basis points all affiliates may take together.
    #[serde(default = "default_max_affiliate_bps")]
    pub max_affiliate_bps: u64,

    /// Longest name the compact affiliate grammar accepts.
    #[serde(default = "default_max_compact_name_len")]
    pub max_compact_name_len: usize,

    /// Registered names and the addresses they resolve to.
    #[serde(default)]
    pub names: BTreeMap<String, Address>,
}

const fn default_protocol_version() -> ProtocolVersion {
    ProtocolVersion::LATEST
}

const fn default_max_affiliates() -> usize {
    MemoLimits::DEFAULT_MAX_AFFILIATES
}

const fn default_max_affiliate_bps() -> u64 {
    MemoLimits::DEFAULT_MAX_AFFILIATE_BPS
}

const fn default_max_compact_name_len() -> usize {
    DEFAULT_MAX_COMPACT_NAME_LEN
}

impl Default for MemokitConfig {
    fn default() -> Self {
        Self {
            protocol_version: default_protocol_version(),
            max_affiliates: default_max_affiliates(),
            max_affiliate_bps: default_max_affiliate_bps(),
            max_compact_name_len: default_max_compact_name_len(),
            names: BTreeMap::new(),
        }
    }
}

impl MemokitConfig {
    /// Loads configuration from the path given by the `MEMOKIT_CONFIG`
    /// environment variable, falling back to `memokit.toml` in the current
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("MEMOKIT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        Self::load_from(path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the defaults. After loading,
    /// `MEMOKIT_PROTOCOL_VERSION` overrides the file's protocol version.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            String::new()
        };

        let mut config = Self::from_toml(&content)?;

        if let Ok(version) = std::env::var("MEMOKIT_PROTOCOL_VERSION") {
            match version.parse() {
                Ok(version) => config.protocol_version = version,
                Err(e) => tracing::warn!("Ignoring MEMOKIT_PROTOCOL_VERSION: {e}"),
            }
        }

        Ok(config)
    }

    /// Parses configuration text, expanding environment variables first.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(&expand_env_vars(content))?)
    }

    /// Returns the decode limits.
    #[must_use]
    pub const fn limits(&self) -> MemoLimits {
        MemoLimits {
            max_affiliates: self.max_affiliates,
            max_affiliate_bps: self.max_affiliate_bps,
            max_compact_name_len: self.max_compact_name_len,
        }
    }

    /// Builds a keeper serving the configured names, version and limits.
    #[must_use]
    pub fn keeper(&self) -> StaticKeeper {
        self.names.iter().fold(
            StaticKeeper::new()
                .with_version(self.protocol_version)
                .with_limits(self.limits()),
            |keeper, (name, address)| keeper.with_name(name, address.clone()),
        )
    }
}

/// Expands `$VAR` and `${VAR}` references from the process environment.
///
/// Unresolved references are left as written.
fn expand_env_vars(input: &str) -> String {
    ENV_VAR_RE
        .replace_all(input, |caps: &Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            std::env::var(name).unwrap_or_else(|_| caps[0].to_owned())
        })
        .into_owned()
}
