use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::serde_as;

use super::liquidity::MAX_BASIS_POINTS;
use super::{Memo, nonzero, opt};
use crate::kind::InstructionKind;
use crate::parser::MemoParser;
use crate::types::Address;

/// A memo naming a single account: trade and secured asset deposits and
/// withdrawals, and switches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountMemo {
    /// The account.
    pub address: Address,
}

impl AccountMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![self.address.to_string()]
    }
}

pub(crate) fn decode_account(p: &mut MemoParser<'_>) -> Option<Memo> {
    let memo = AccountMemo {
        address: p.get_address(1, true)?,
    };
    match p.kind() {
        InstructionKind::TradeAccountDeposit => Some(Memo::TradeAccountDeposit(memo)),
        InstructionKind::TradeAccountWithdrawal => Some(Memo::TradeAccountWithdrawal(memo)),
        InstructionKind::SecuredAssetDeposit => Some(Memo::SecuredAssetDeposit(memo)),
        InstructionKind::SecuredAssetWithdraw => Some(Memo::SecuredAssetWithdraw(memo)),
        InstructionKind::Switch => Some(Memo::Switch(memo)),
        _ => None,
    }
}

pub(crate) fn decode_rune_pool_deposit(_: &mut MemoParser<'_>) -> Option<Memo> {
    Some(Memo::RunePoolDeposit)
}

/// Withdraws a share of a protocol-owned pool position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunePoolWithdrawMemo {
    /// Share of the position to withdraw, in basis points.
    pub basis_points: u64,
    /// Affiliate taking a fee from the withdrawal.
    pub affiliate: Option<Address>,
    /// Affiliate fee in basis points.
    pub affiliate_bps: u64,
}

impl RunePoolWithdrawMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![
            self.basis_points.to_string(),
            opt(self.affiliate.as_ref()),
            nonzero(self.affiliate_bps),
        ]
    }
}

pub(crate) fn decode_rune_pool_withdraw(p: &mut MemoParser<'_>) -> Option<Memo> {
    let max_bps = p.context().limits().max_affiliate_bps;
    let basis_points = p.get_bounded_uint(1, true, 0, MAX_BASIS_POINTS);
    let affiliate = p.get_address(2, false);
    let affiliate_bps = p.get_bounded_uint(3, false, 0, max_bps);
    if affiliate_bps > 0 && affiliate.is_none() {
        p.fail("affiliate fee set without an affiliate");
    }
    Some(Memo::RunePoolWithdraw(RunePoolWithdrawMemo {
        basis_points,
        affiliate,
        affiliate_bps,
    }))
}

/// Executes a message against a contract.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecMemo {
    /// The contract.
    pub contract: Address,
    /// Raw message bytes, base64 on the wire.
    #[serde_as(as = "Base64")]
    pub msg: Vec<u8>,
}

impl ExecMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![self.contract.to_string(), b64.encode(&self.msg)]
    }
}

pub(crate) fn decode_exec(p: &mut MemoParser<'_>) -> Option<Memo> {
    let contract = p.get_address(1, true);
    let msg = p.get_base64(2, true);
    Some(Memo::Exec(ExecMemo {
        contract: contract?,
        msg,
    }))
}
