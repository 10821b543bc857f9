//! Validated value types carried by memos.
//!
//! - [`Chain`] - A chain identifier (e.g., `BTC`, `btc_test`)
//! - [`Asset`] - A `CHAIN.SYMBOL` or `CHAIN~SYMBOL` asset identifier
//! - [`Address`] - An opaque on-chain address
//! - [`TxId`] - A 32-byte transaction hash in hex
//!
//! Every type parses from and displays to its exact wire text, so a value
//! decoded from a memo re-encodes byte-for-byte.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static CHAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,15}$").expect("valid chain regex"));

static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*$").expect("valid symbol regex"));

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,128}$").expect("valid address regex"));

static TX_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0x)?[0-9A-Fa-f]{64}$").expect("valid tx id regex"));

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_+-]{1,30}$").expect("valid name regex"));

/// Returns `true` if `name` is a syntactically valid registered-name label.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Implements string serialization through `Display` / `FromStr`.
macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_str(&s).map_err(de::Error::custom)
            }
        }
    };
}

/// A chain identifier.
///
/// Case is preserved as written; use [`Chain::is_same`] for a
/// case-insensitive comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chain(String);

impl Chain {
    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if both identifiers name the same chain, ignoring case.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

/// Error returned when parsing an invalid chain identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid chain identifier '{0}'")]
pub struct ChainError(String);

impl FromStr for Chain {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if CHAIN_RE.is_match(s) {
            Ok(Self(s.into()))
        } else {
            Err(ChainError(s.into()))
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

string_serde!(Chain);

/// An asset identifier.
///
/// Layer-1 assets are written `CHAIN.SYMBOL`, trade-account assets
/// `CHAIN~SYMBOL`. Both components are upper-cased on parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Asset {
    chain: Chain,
    symbol: String,
    trade: bool,
}

impl Asset {
    /// Returns the chain the asset lives on.
    #[must_use]
    pub const fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Returns the symbol, including any contract suffix (`USDC-0XA0B8`).
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns `true` for trade-account assets (`CHAIN~SYMBOL`).
    #[must_use]
    pub const fn is_trade(&self) -> bool {
        self.trade
    }
}

/// Errors that can occur when parsing an asset identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    /// Neither `.` nor `~` separates chain and symbol.
    #[error("asset '{0}' has no chain separator")]
    MissingSeparator(String),
    /// The chain component is malformed.
    #[error(transparent)]
    Chain(#[from] ChainError),
    /// The symbol component is malformed.
    #[error("invalid asset symbol '{0}'")]
    Symbol(String),
}

impl FromStr for Asset {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chain, symbol, trade) = if let Some((chain, symbol)) = s.split_once('.') {
            (chain, symbol, false)
        } else if let Some((chain, symbol)) = s.split_once('~') {
            (chain, symbol, true)
        } else {
            return Err(AssetError::MissingSeparator(s.into()));
        };
        let chain: Chain = chain.to_ascii_uppercase().parse()?;
        if !SYMBOL_RE.is_match(symbol) {
            return Err(AssetError::Symbol(symbol.into()));
        }
        Ok(Self {
            chain,
            symbol: symbol.to_ascii_uppercase(),
            trade,
        })
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.trade { '~' } else { '.' };
        write!(f, "{}{sep}{}", self.chain, self.symbol)
    }
}

string_serde!(Asset);

/// An on-chain address.
///
/// Chain-specific checksum validation happens outside the memo codec; here an
/// address is any run of 1 to 128 ASCII alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// Returns the address text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Error returned when parsing an invalid address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address '{0}'")]
pub struct AddressError(String);

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if ADDRESS_RE.is_match(s) {
            Ok(Self(s.into()))
        } else {
            Err(AddressError(s.into()))
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

string_serde!(Address);

/// A transaction hash: 64 hex digits with an optional `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxId(String);

impl TxId {
    /// Returns the hash text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Error returned when parsing an invalid transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tx id '{0}'")]
pub struct TxIdError(String);

impl FromStr for TxId {
    type Err = TxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if TX_ID_RE.is_match(s) {
            Ok(Self(s.into()))
        } else {
            Err(TxIdError(s.into()))
        }
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

string_serde!(TxId);
