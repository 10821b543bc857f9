//! Protocol version type.
//!
//! Provides [`ProtocolVersion`], the externally supplied network version that
//! selects which memo grammar a decoder applies. Versions serialize as their
//! dotted string form (e.g., `"2.0.0"`) and compare in semantic-version order.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;

/// A `major.minor.patch` protocol version.
///
/// Ordering is lexicographic over `(major, minor, patch)`, which is the
/// semantic-version precedence for release versions.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl ProtocolVersion {
    /// The first version with a memo grammar.
    pub const GENESIS: Self = Self::new(1, 0, 0);

    /// The version introducing streaming swaps, refund addresses and
    /// multi-affiliate swaps.
    pub const STREAMING: Self = Self::new(2, 0, 0);

    /// The newest grammar version known to this crate.
    pub const LATEST: Self = Self::STREAMING;

    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns the major component.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Returns the minor component.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// Returns the patch component.
    #[must_use]
    pub const fn patch(&self) -> u32 {
        self.patch
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Error returned when parsing an invalid protocol version string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid protocol version '{0}'")]
pub struct VersionError(String);

impl FromStr for ProtocolVersion {
    type Err = VersionError;

    /// Parses `M`, `M.m` or `M.m.p`; missing components default to zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut parts = [0u32; 3];
        let mut count = 0;
        for part in trimmed.split('.') {
            if count == parts.len() || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(VersionError(s.into()));
            }
            parts[count] = part.parse().map_err(|_| VersionError(s.into()))?;
            count += 1;
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl Serialize for ProtocolVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ProtocolVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_version() {
        let v: ProtocolVersion = "3.12.1".parse().unwrap();
        assert_eq!(v, ProtocolVersion::new(3, 12, 1));
        assert_eq!(v.to_string(), "3.12.1");
    }

    #[test]
    fn test_parse_short_versions() {
        assert_eq!(
            "2".parse::<ProtocolVersion>().unwrap(),
            ProtocolVersion::new(2, 0, 0)
        );
        assert_eq!(
            "1.5".parse::<ProtocolVersion>().unwrap(),
            ProtocolVersion::new(1, 5, 0)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<ProtocolVersion>().is_err());
        assert!("1..2".parse::<ProtocolVersion>().is_err());
        assert!("1.2.3.4".parse::<ProtocolVersion>().is_err());
        assert!("v1.2".parse::<ProtocolVersion>().is_err());
        assert!("1.-2".parse::<ProtocolVersion>().is_err());
    }

    #[test]
    fn test_semantic_ordering() {
        let a = ProtocolVersion::new(1, 9, 0);
        let b = ProtocolVersion::new(1, 10, 0);
        let c = ProtocolVersion::new(2, 0, 0);
        assert!(a < b);
        assert!(b < c);
        assert!(ProtocolVersion::GENESIS < ProtocolVersion::LATEST);
    }

    #[test]
    fn test_serde_as_string() {
        let v = ProtocolVersion::new(2, 1, 0);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"2.1.0\"");
        let back: ProtocolVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
