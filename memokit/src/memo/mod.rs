//! Decoded memos.
//!
//! [`Memo`] is a closed sum over every [`InstructionKind`]. Each variant holds
//! a typed record that knows how to encode itself back to canonical memo
//! text; decoders for each record are registered in
//! [`DecoderRegistry`](crate::registry::DecoderRegistry).
//!
//! Capabilities a variant does not have answer with an empty default:
//! [`Memo::amount`] is zero for anything but an unbond, [`Memo::asset`] is
//! `None` for memos that name no asset, and so on.
//!
//! # Round trip
//!
//! For every memo accepted by the decoder, `decode(encode(m)) == m`. Alias
//! tokens and optional trailing separators normalize to the canonical form.

mod account;
mod liquidity;
mod loan;
mod name;
mod node;
mod swap;
mod tx;

pub use account::{AccountMemo, ExecMemo, RunePoolWithdrawMemo};
pub use liquidity::{AddLiquidityMemo, DonateMemo, WithdrawLiquidityMemo};
pub use loan::{LoanOpenMemo, LoanRepaymentMemo};
pub use name::ManageNameMemo;
pub use node::{BondMemo, LeaveMemo, UnbondMemo};
pub use swap::SwapMemo;
pub use tx::{HeightMemo, ObservedTxMemo, OutboundMemo};

pub(crate) use account::{
    decode_account, decode_exec, decode_rune_pool_deposit, decode_rune_pool_withdraw,
};
pub(crate) use liquidity::{decode_add_liquidity, decode_donate, decode_withdraw_liquidity};
pub(crate) use loan::{decode_loan_open, decode_loan_repayment};
pub(crate) use name::decode_manage_name;
pub(crate) use node::{decode_bond, decode_leave, decode_unbond};
pub(crate) use swap::{decode_legacy_swap, decode_swap};
pub(crate) use tx::{decode_height, decode_observed_tx, decode_outbound};

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::affiliate::Affiliate;
use crate::context::DecodeContext;
use crate::error::DecodeError;
use crate::kind::InstructionKind;
use crate::types::{Address, Asset, Chain};

static ZERO: BigUint = BigUint::ZERO;

/// A decoded memo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Memo {
    /// `M>|chain|txhash`
    Inbound(ObservedTxMemo),
    /// `OUT:txid`
    Outbound(OutboundMemo),
    /// `M<|chain|txhash`
    Refund(ObservedTxMemo),
    /// `+:pool:paired:affiliate:bps`
    AddLiquidity(AddLiquidityMemo),
    /// `-:pool:bps:asset`
    WithdrawLiquidity(WithdrawLiquidityMemo),
    /// `=:asset:dest/refund:limit/interval/quantity:affiliates:bps:...`
    Swap(SwapMemo),
    /// `DONATE:pool`
    Donate(DonateMemo),
    /// `BOND:node:provider:fee`
    Bond(BondMemo),
    /// `UNBOND:node:amount:provider`
    Unbond(UnbondMemo),
    /// `LEAVE:node`
    Leave(LeaveMemo),
    /// `MIGRATE:height`
    Migrate(HeightMemo),
    /// `RAGNAROK:height`
    Ragnarok(HeightMemo),
    /// `X:contract:msg`
    Exec(ExecMemo),
    /// `~:name:chain:address:owner:asset:expiry`
    ManageName(ManageNameMemo),
    /// `LOAN+:asset:dest:min:affiliate:bps`
    LoanOpen(LoanOpenMemo),
    /// `LOAN-:asset:owner:min`
    LoanRepayment(LoanRepaymentMemo),
    /// `TRADE+:address`
    TradeAccountDeposit(AccountMemo),
    /// `TRADE-:address`
    TradeAccountWithdrawal(AccountMemo),
    /// `SECURE+:address`
    SecuredAssetDeposit(AccountMemo),
    /// `SECURE-:address`
    SecuredAssetWithdraw(AccountMemo),
    /// `POOL+`
    RunePoolDeposit,
    /// `POOL-:bps:affiliate:bps`
    RunePoolWithdraw(RunePoolWithdrawMemo),
    /// `SWITCH:address`
    Switch(AccountMemo),
}

impl Memo {
    /// Decodes a memo with the standard decoders.
    ///
    /// # Errors
    ///
    /// See [`crate::registry::decode`].
    pub fn decode(memo: &str, ctx: &DecodeContext<'_>) -> Result<Self, DecodeError> {
        crate::registry::decode(memo, ctx)
    }

    /// Returns the instruction kind.
    #[must_use]
    pub const fn kind(&self) -> InstructionKind {
        match self {
            Self::Inbound(_) => InstructionKind::Inbound,
            Self::Outbound(_) => InstructionKind::Outbound,
            Self::Refund(_) => InstructionKind::Refund,
            Self::AddLiquidity(_) => InstructionKind::AddLiquidity,
            Self::WithdrawLiquidity(_) => InstructionKind::WithdrawLiquidity,
            Self::Swap(_) => InstructionKind::Swap,
            Self::Donate(_) => InstructionKind::Donate,
            Self::Bond(_) => InstructionKind::Bond,
            Self::Unbond(_) => InstructionKind::Unbond,
            Self::Leave(_) => InstructionKind::Leave,
            Self::Migrate(_) => InstructionKind::Migrate,
            Self::Ragnarok(_) => InstructionKind::Ragnarok,
            Self::Exec(_) => InstructionKind::Exec,
            Self::ManageName(_) => InstructionKind::ManageName,
            Self::LoanOpen(_) => InstructionKind::LoanOpen,
            Self::LoanRepayment(_) => InstructionKind::LoanRepayment,
            Self::TradeAccountDeposit(_) => InstructionKind::TradeAccountDeposit,
            Self::TradeAccountWithdrawal(_) => InstructionKind::TradeAccountWithdrawal,
            Self::SecuredAssetDeposit(_) => InstructionKind::SecuredAssetDeposit,
            Self::SecuredAssetWithdraw(_) => InstructionKind::SecuredAssetWithdraw,
            Self::RunePoolDeposit => InstructionKind::RunePoolDeposit,
            Self::RunePoolWithdraw(_) => InstructionKind::RunePoolWithdraw,
            Self::Switch(_) => InstructionKind::Switch,
        }
    }

    /// Returns the asset the memo targets, if any.
    #[must_use]
    pub const fn asset(&self) -> Option<&Asset> {
        match self {
            Self::Swap(m) => Some(&m.asset),
            Self::AddLiquidity(m) => Some(&m.pool),
            Self::WithdrawLiquidity(m) => Some(&m.pool),
            Self::Donate(m) => Some(&m.pool),
            Self::LoanOpen(m) => Some(&m.target_asset),
            Self::LoanRepayment(m) => Some(&m.collateral_asset),
            Self::ManageName(m) => m.preferred_asset.as_ref(),
            _ => None,
        }
    }

    /// Returns the amount the memo carries, zero if it carries none.
    #[must_use]
    pub fn amount(&self) -> &BigUint {
        match self {
            Self::Unbond(m) => &m.amount,
            _ => &ZERO,
        }
    }

    /// Returns the address that receives the result, if any.
    #[must_use]
    pub const fn destination(&self) -> Option<&Address> {
        match self {
            Self::Swap(m) => m.destination.as_ref(),
            Self::LoanOpen(m) => Some(&m.destination),
            Self::TradeAccountDeposit(m)
            | Self::TradeAccountWithdrawal(m)
            | Self::SecuredAssetDeposit(m)
            | Self::SecuredAssetWithdraw(m)
            | Self::Switch(m) => Some(&m.address),
            _ => None,
        }
    }

    /// Returns the refund address of a swap.
    #[must_use]
    pub const fn refund_address(&self) -> Option<&Address> {
        match self {
            Self::Swap(m) => m.refund_address.as_ref(),
            _ => None,
        }
    }

    /// Returns the minimum acceptable output, zero if unset.
    #[must_use]
    pub fn slip_limit(&self) -> &BigUint {
        match self {
            Self::Swap(m) => &m.slip_limit,
            Self::LoanOpen(m) => &m.min_out,
            Self::LoanRepayment(m) => &m.min_out,
            _ => &ZERO,
        }
    }

    /// Returns every affiliate fee entry the memo names.
    #[must_use]
    pub fn affiliates(&self) -> Vec<Affiliate> {
        let single = |affiliate: Option<&Address>, bps: u64| -> Vec<Affiliate> {
            affiliate
                .map(|a| Affiliate::new(a.as_str(), bps))
                .into_iter()
                .collect()
        };
        match self {
            Self::Swap(m) => m.affiliates.clone(),
            Self::AddLiquidity(m) => single(m.affiliate.as_ref(), m.affiliate_bps),
            Self::LoanOpen(m) => single(m.affiliate.as_ref(), m.affiliate_bps),
            Self::RunePoolWithdraw(m) => single(m.affiliate.as_ref(), m.affiliate_bps),
            _ => Vec::new(),
        }
    }

    /// Returns the transaction hash the memo refers to.
    #[must_use]
    pub fn tx_id(&self) -> Option<&str> {
        match self {
            Self::Inbound(m) | Self::Refund(m) => Some(&m.tx_hash),
            Self::Outbound(m) => Some(m.tx_id.as_str()),
            _ => None,
        }
    }

    /// Returns the block height of a migrate or ragnarok memo, zero otherwise.
    #[must_use]
    pub const fn block_height(&self) -> i64 {
        match self {
            Self::Migrate(m) | Self::Ragnarok(m) => m.block_height,
            _ => 0,
        }
    }

    /// Returns the node a bond, unbond or leave memo addresses.
    #[must_use]
    pub const fn node_address(&self) -> Option<&Address> {
        match self {
            Self::Bond(m) => Some(&m.node_address),
            Self::Unbond(m) => Some(&m.node_address),
            Self::Leave(m) => Some(&m.node_address),
            _ => None,
        }
    }

    /// Returns the chain named by the memo, if any.
    #[must_use]
    pub const fn chain(&self) -> Option<&Chain> {
        match self {
            Self::Inbound(m) | Self::Refund(m) => Some(&m.chain),
            Self::ManageName(m) => Some(&m.chain),
            _ => None,
        }
    }

    /// Encodes the memo in canonical form.
    #[must_use]
    pub fn encode(&self) -> String {
        let fields = match self {
            Self::Inbound(m) | Self::Refund(m) => m.fields(),
            Self::Outbound(m) => m.fields(),
            Self::AddLiquidity(m) => m.fields(),
            Self::WithdrawLiquidity(m) => m.fields(),
            Self::Swap(m) => m.fields(),
            Self::Donate(m) => m.fields(),
            Self::Bond(m) => m.fields(),
            Self::Unbond(m) => m.fields(),
            Self::Leave(m) => m.fields(),
            Self::Migrate(m) | Self::Ragnarok(m) => m.fields(),
            Self::Exec(m) => m.fields(),
            Self::ManageName(m) => m.fields(),
            Self::LoanOpen(m) => m.fields(),
            Self::LoanRepayment(m) => m.fields(),
            Self::TradeAccountDeposit(m)
            | Self::TradeAccountWithdrawal(m)
            | Self::SecuredAssetDeposit(m)
            | Self::SecuredAssetWithdraw(m)
            | Self::Switch(m) => m.fields(),
            Self::RunePoolDeposit => Vec::new(),
            Self::RunePoolWithdraw(m) => m.fields(),
        };
        join_fields(self.kind(), &fields)
    }
}

/// Joins the kind prefix and fields, dropping trailing empty fields.
fn join_fields(kind: InstructionKind, fields: &[String]) -> String {
    let end = fields
        .iter()
        .rposition(|f| !f.is_empty())
        .map_or(0, |i| i + 1);
    let separator = kind.separator();
    let mut out = String::from(kind.prefix());
    for field in &fields[..end] {
        out.push(separator);
        out.push_str(field);
    }
    out
}

/// Renders an optional value as a field, empty when absent.
fn opt<T: fmt::Display>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// Renders a number as a field, empty when zero.
fn nonzero(value: u64) -> String {
    if value == 0 { String::new() } else { value.to_string() }
}

impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Memo {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s, &DecodeContext::default())
    }
}
