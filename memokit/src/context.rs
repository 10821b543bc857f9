//! Decode-time inputs supplied by the host.
//!
//! Decoding is a pure function of the memo text and a [`DecodeContext`]: the
//! protocol version, the configured [`MemoLimits`], and a read-only
//! [`Keeper`] for name resolution. Nothing here is global, so two contexts
//! never influence each other.

use std::collections::BTreeMap;
use std::fmt;

use crate::affiliate::DEFAULT_MAX_COMPACT_NAME_LEN;
use crate::types::Address;
use crate::version::ProtocolVersion;

/// Upper bounds applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoLimits {
    /// Most affiliates a single memo may name.
    pub max_affiliates: usize,
    /// Most basis points all affiliates of a memo may take together.
    pub max_affiliate_bps: u64,
    /// Longest name the compact affiliate grammar accepts.
    pub max_compact_name_len: usize,
}

impl MemoLimits {
    /// Default affiliate count limit.
    pub const DEFAULT_MAX_AFFILIATES: usize = 5;
    /// Default total affiliate fee limit.
    pub const DEFAULT_MAX_AFFILIATE_BPS: u64 = 1_000;
}

impl Default for MemoLimits {
    fn default() -> Self {
        Self {
            max_affiliates: Self::DEFAULT_MAX_AFFILIATES,
            max_affiliate_bps: Self::DEFAULT_MAX_AFFILIATE_BPS,
            max_compact_name_len: DEFAULT_MAX_COMPACT_NAME_LEN,
        }
    }
}

/// Read-only view of chain state consulted while decoding.
pub trait Keeper: fmt::Debug + Send + Sync {
    /// Resolves a registered name to an address.
    fn resolve_name(&self, name: &str) -> Option<Address>;

    /// Returns the active protocol version.
    fn protocol_version(&self) -> ProtocolVersion {
        ProtocolVersion::LATEST
    }

    /// Returns the configured affiliate count limit.
    fn max_affiliates(&self) -> usize {
        MemoLimits::DEFAULT_MAX_AFFILIATES
    }

    /// Returns the configured total affiliate fee limit.
    fn max_affiliate_bps(&self) -> u64 {
        MemoLimits::DEFAULT_MAX_AFFILIATE_BPS
    }
}

/// A keeper with no registered names and default settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullKeeper;

impl Keeper for NullKeeper {
    fn resolve_name(&self, _name: &str) -> Option<Address> {
        None
    }
}

static NULL_KEEPER: NullKeeper = NullKeeper;

/// A keeper backed by fixed in-memory values.
///
/// Names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticKeeper {
    names: BTreeMap<String, Address>,
    version: Option<ProtocolVersion>,
    limits: MemoLimits,
}

impl StaticKeeper {
    /// Creates an empty keeper.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a name.
    #[must_use]
    pub fn with_name(mut self, name: impl AsRef<str>, address: Address) -> Self {
        self.names
            .insert(name.as_ref().to_ascii_lowercase(), address);
        self
    }

    /// Sets the protocol version reported by the keeper.
    #[must_use]
    pub fn with_version(mut self, version: ProtocolVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the limits reported by the keeper.
    #[must_use]
    pub fn with_limits(mut self, limits: MemoLimits) -> Self {
        self.limits = limits;
        self
    }
}

impl Keeper for StaticKeeper {
    fn resolve_name(&self, name: &str) -> Option<Address> {
        self.names.get(&name.to_ascii_lowercase()).cloned()
    }

    fn protocol_version(&self) -> ProtocolVersion {
        self.version.unwrap_or(ProtocolVersion::LATEST)
    }

    fn max_affiliates(&self) -> usize {
        self.limits.max_affiliates
    }

    fn max_affiliate_bps(&self) -> u64 {
        self.limits.max_affiliate_bps
    }
}

/// Everything a decode call depends on besides the memo text.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    version: ProtocolVersion,
    limits: MemoLimits,
    keeper: &'a dyn Keeper,
}

impl<'a> DecodeContext<'a> {
    /// Creates a context at the given protocol version with default limits
    /// and no name resolution.
    #[must_use]
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            version,
            limits: MemoLimits::default(),
            keeper: &NULL_KEEPER,
        }
    }

    /// Creates a context whose version and limits are read from a keeper.
    #[must_use]
    pub fn from_keeper(keeper: &'a dyn Keeper) -> Self {
        Self {
            version: keeper.protocol_version(),
            limits: MemoLimits {
                max_affiliates: keeper.max_affiliates(),
                max_affiliate_bps: keeper.max_affiliate_bps(),
                max_compact_name_len: DEFAULT_MAX_COMPACT_NAME_LEN,
            },
            keeper,
        }
    }

    /// Replaces the protocol version.
    #[must_use]
    pub const fn with_version(mut self, version: ProtocolVersion) -> Self {
        self.version = version;
        self
    }

    /// Replaces the limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: MemoLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replaces the keeper used for name resolution.
    #[must_use]
    pub fn with_keeper(mut self, keeper: &'a dyn Keeper) -> Self {
        self.keeper = keeper;
        self
    }

    /// Returns the protocol version.
    #[must_use]
    pub const fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Returns the limits.
    #[must_use]
    pub const fn limits(&self) -> &MemoLimits {
        &self.limits
    }

    /// Returns the keeper.
    #[must_use]
    pub fn keeper(&self) -> &'a dyn Keeper {
        self.keeper
    }
}

impl Default for DecodeContext<'_> {
    fn default() -> Self {
        Self::new(ProtocolVersion::LATEST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let ctx = DecodeContext::default();
        assert_eq!(ctx.version(), ProtocolVersion::LATEST);
        assert_eq!(ctx.limits(), &MemoLimits::default());
        assert!(ctx.keeper().resolve_name("anything").is_none());
    }

    #[test]
    fn test_static_keeper_resolves_case_insensitively() {
        let addr: Address = "thor1abc".parse().unwrap();
        let keeper = StaticKeeper::new().with_name("Flash", addr.clone());
        assert_eq!(keeper.resolve_name("flash"), Some(addr.clone()));
        assert_eq!(keeper.resolve_name("FLASH"), Some(addr));
        assert_eq!(keeper.resolve_name("other"), None);
    }

    #[test]
    fn test_context_from_keeper() {
        let limits = MemoLimits {
            max_affiliates: 2,
            max_affiliate_bps: 300,
            ..MemoLimits::default()
        };
        let keeper = StaticKeeper::new()
            .with_version(ProtocolVersion::GENESIS)
            .with_limits(limits);
        let ctx = DecodeContext::from_keeper(&keeper);
        assert_eq!(ctx.version(), ProtocolVersion::GENESIS);
        assert_eq!(ctx.limits().max_affiliates, 2);
        assert_eq!(ctx.limits().max_affiliate_bps, 300);
    }
}
