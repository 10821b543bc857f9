//! Instruction kinds and their memo prefixes.
//!
//! Every memo starts with a kind token. Each [`InstructionKind`] has one
//! canonical prefix that encoding always emits, and one or more aliases that
//! decoding accepts without regard to case.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of memo instruction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionKind {
    /// An observed inbound transaction.
    Inbound,
    /// An outbound transaction fulfilling an earlier inbound.
    Outbound,
    /// A refund of an earlier inbound.
    Refund,
    /// Add liquidity to a pool.
    AddLiquidity,
    /// Withdraw liquidity from a pool.
    WithdrawLiquidity,
    /// Swap one asset for another.
    Swap,
    /// Donate to a pool.
    Donate,
    /// Bond to a node.
    Bond,
    /// Unbond from a node.
    Unbond,
    /// Ask a node to leave.
    Leave,
    /// Vault migration.
    Migrate,
    /// Chain-wide wind-down.
    Ragnarok,
    /// Execute a contract message.
    Exec,
    /// Register or update a name record.
    ManageName,
    /// Open a loan.
    LoanOpen,
    /// Repay a loan.
    LoanRepayment,
    /// Deposit into a trade account.
    TradeAccountDeposit,
    /// Withdraw from a trade account.
    TradeAccountWithdrawal,
    /// Deposit a secured asset.
    SecuredAssetDeposit,
    /// Withdraw a secured asset.
    SecuredAssetWithdraw,
    /// Deposit into the protocol-owned pool.
    RunePoolDeposit,
    /// Withdraw from the protocol-owned pool.
    RunePoolWithdraw,
    /// Switch a native token to its protocol form.
    Switch,
    /// No recognised instruction.
    Unknown,
}

/// Alias table used for decoding. Matching is case-insensitive.
const ALIASES: &[(&str, InstructionKind)] = &[
    ("m>", InstructionKind::Inbound),
    ("inbound", InstructionKind::Inbound),
    ("out", InstructionKind::Outbound),
    ("outbound", InstructionKind::Outbound),
    ("m<", InstructionKind::Refund),
    ("refund", InstructionKind::Refund),
    ("+", InstructionKind::AddLiquidity),
    ("a", InstructionKind::AddLiquidity),
    ("add", InstructionKind::AddLiquidity),
    ("-", InstructionKind::WithdrawLiquidity),
    ("wd", InstructionKind::WithdrawLiquidity),
    ("withdraw", InstructionKind::WithdrawLiquidity),
    ("=", InstructionKind::Swap),
    ("s", InstructionKind::Swap),
    ("swap", InstructionKind::Swap),
    ("d", InstructionKind::Donate),
    ("donate", InstructionKind::Donate),
    ("bond", InstructionKind::Bond),
    ("unbond", InstructionKind::Unbond),
    ("leave", InstructionKind::Leave),
    ("migrate", InstructionKind::Migrate),
    ("ragnarok", InstructionKind::Ragnarok),
    ("x", InstructionKind::Exec),
    ("exec", InstructionKind::Exec),
    ("~", InstructionKind::ManageName),
    ("n", InstructionKind::ManageName),
    ("name", InstructionKind::ManageName),
    ("loan+", InstructionKind::LoanOpen),
    ("$+", InstructionKind::LoanOpen),
    ("loan-", InstructionKind::LoanRepayment),
    ("$-", InstructionKind::LoanRepayment),
    ("trade+", InstructionKind::TradeAccountDeposit),
    ("trade-", InstructionKind::TradeAccountWithdrawal),
    ("secure+", InstructionKind::SecuredAssetDeposit),
    ("secure-", InstructionKind::SecuredAssetWithdraw),
    ("pool+", InstructionKind::RunePoolDeposit),
    ("pool-", InstructionKind::RunePoolWithdraw),
    ("switch", InstructionKind::Switch),
];

impl InstructionKind {
    /// Every decodable kind, in declaration order.
    pub const ALL: [Self; 23] = [
        Self::Inbound,
        Self::Outbound,
        Self::Refund,
        Self::AddLiquidity,
        Self::WithdrawLiquidity,
        Self::Swap,
        Self::Donate,
        Self::Bond,
        Self::Unbond,
        Self::Leave,
        Self::Migrate,
        Self::Ragnarok,
        Self::Exec,
        Self::ManageName,
        Self::LoanOpen,
        Self::LoanRepayment,
        Self::TradeAccountDeposit,
        Self::TradeAccountWithdrawal,
        Self::SecuredAssetDeposit,
        Self::SecuredAssetWithdraw,
        Self::RunePoolDeposit,
        Self::RunePoolWithdraw,
        Self::Switch,
    ];

    /// Returns the canonical memo prefix.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Inbound => "M>",
            Self::Outbound => "OUT",
            Self::Refund => "M<",
            Self::AddLiquidity => "+",
            Self::WithdrawLiquidity => "-",
            Self::Swap => "=",
            Self::Donate => "DONATE",
            Self::Bond => "BOND",
            Self::Unbond => "UNBOND",
            Self::Leave => "LEAVE",
            Self::Migrate => "MIGRATE",
            Self::Ragnarok => "RAGNAROK",
            Self::Exec => "X",
            Self::ManageName => "~",
            Self::LoanOpen => "LOAN+",
            Self::LoanRepayment => "LOAN-",
            Self::TradeAccountDeposit => "TRADE+",
            Self::TradeAccountWithdrawal => "TRADE-",
            Self::SecuredAssetDeposit => "SECURE+",
            Self::SecuredAssetWithdraw => "SECURE-",
            Self::RunePoolDeposit => "POOL+",
            Self::RunePoolWithdraw => "POOL-",
            Self::Switch => "SWITCH",
            Self::Unknown => "",
        }
    }

    /// Returns the field separator the kind encodes with.
    ///
    /// Inbound and refund memos use `|`; everything else uses `:`.
    #[must_use]
    pub const fn separator(&self) -> char {
        match self {
            Self::Inbound | Self::Refund => '|',
            _ => ':',
        }
    }

    /// Returns `true` if the kind also accepts `|` as its field separator.
    #[must_use]
    pub const fn accepts_pipe(&self) -> bool {
        matches!(self, Self::Inbound | Self::Refund)
    }

    /// Resolves a kind token, ignoring case.
    ///
    /// Returns `None` for tokens with no alias.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(token))
            .map(|(_, kind)| *kind)
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::Refund => "refund",
            Self::AddLiquidity => "add",
            Self::WithdrawLiquidity => "withdraw",
            Self::Swap => "swap",
            Self::Donate => "donate",
            Self::Bond => "bond",
            Self::Unbond => "unbond",
            Self::Leave => "leave",
            Self::Migrate => "migrate",
            Self::Ragnarok => "ragnarok",
            Self::Exec => "exec",
            Self::ManageName => "name",
            Self::LoanOpen => "loan+",
            Self::LoanRepayment => "loan-",
            Self::TradeAccountDeposit => "trade+",
            Self::TradeAccountWithdrawal => "trade-",
            Self::SecuredAssetDeposit => "secure+",
            Self::SecuredAssetWithdraw => "secure-",
            Self::RunePoolDeposit => "pool+",
            Self::RunePoolWithdraw => "pool-",
            Self::Switch => "switch",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Error returned for a kind token with no alias.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tx type: {0}")]
pub struct UnknownKindError(pub String);

impl FromStr for InstructionKind {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| UnknownKindError(s.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_are_case_insensitive() {
        use InstructionKind as K;
        let cases = [
            ("=", K::Swap),
            ("swap", K::Swap),
            ("SWAP", K::Swap),
            ("SwAp", K::Swap),
            ("m<", K::Refund),
            ("Trade+", K::TradeAccountDeposit),
        ];
        for (token, kind) in cases {
            assert_eq!(K::from_token(token), Some(kind), "{token}");
        }
    }

    #[test]
    fn test_unknown_tokens() {
        assert_eq!(InstructionKind::from_token(""), None);
        assert_eq!(InstructionKind::from_token("swapp"), None);
        assert_eq!(InstructionKind::from_token("unknown"), None);
        assert!("nope".parse::<InstructionKind>().is_err());
    }

    #[test]
    fn test_every_prefix_resolves_to_its_kind() {
        for kind in InstructionKind::ALL {
            assert_eq!(
                InstructionKind::from_token(kind.prefix()),
                Some(kind),
                "prefix of {kind}"
            );
        }
        assert_eq!(InstructionKind::Unknown.prefix(), "");
    }

    #[test]
    fn test_every_alias_is_unique() {
        for (i, (alias, _)) in ALIASES.iter().enumerate() {
            for (other, _) in &ALIASES[i + 1..] {
                assert!(
                    !alias.eq_ignore_ascii_case(other),
                    "duplicate alias {alias}"
                );
            }
        }
    }

    #[test]
    fn test_separators() {
        assert_eq!(InstructionKind::Refund.separator(), '|');
        assert_eq!(InstructionKind::Inbound.separator(), '|');
        assert_eq!(InstructionKind::Swap.separator(), ':');
        assert!(!InstructionKind::Outbound.accepts_pipe());
    }
}
