use serde::{Deserialize, Serialize};

use super::{Memo, nonzero, opt};
use crate::parser::MemoParser;
use crate::types::{Address, Asset};

/// Basis points in a whole.
pub(crate) const MAX_BASIS_POINTS: u64 = 10_000;

/// Adds liquidity to a pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddLiquidityMemo {
    /// The pool.
    pub pool: Asset,
    /// Address on the other side of a two-sided deposit.
    pub paired_address: Option<Address>,
    /// Affiliate taking a fee from the deposit.
    pub affiliate: Option<Address>,
    /// Affiliate fee in basis points.
    pub affiliate_bps: u64,
}

impl AddLiquidityMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![
            self.pool.to_string(),
            opt(self.paired_address.as_ref()),
            opt(self.affiliate.as_ref()),
            nonzero(self.affiliate_bps),
        ]
    }
}

pub(crate) fn decode_add_liquidity(p: &mut MemoParser<'_>) -> Option<Memo> {
    let max_bps = p.context().limits().max_affiliate_bps;
    let pool = p.get_asset(1, true);
    let paired_address = p.get_address(2, false);
    let affiliate = p.get_address(3, false);
    let affiliate_bps = p.get_bounded_uint(4, false, 0, max_bps);
    if affiliate_bps > 0 && affiliate.is_none() {
        p.fail("affiliate fee set without an affiliate");
    }
    Some(Memo::AddLiquidity(AddLiquidityMemo {
        pool: pool?,
        paired_address,
        affiliate,
        affiliate_bps,
    }))
}

/// Withdraws a share of a liquidity position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WithdrawLiquidityMemo {
    /// The pool.
    pub pool: Asset,
    /// Share of the position to withdraw, in basis points.
    pub basis_points: u64,
    /// Restricts the withdrawal to one side of the pool.
    pub withdraw_asset: Option<Asset>,
}

impl WithdrawLiquidityMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![
            self.pool.to_string(),
            self.basis_points.to_string(),
            opt(self.withdraw_asset.as_ref()),
        ]
    }
}

pub(crate) fn decode_withdraw_liquidity(p: &mut MemoParser<'_>) -> Option<Memo> {
    let pool = p.get_asset(1, true);
    let basis_points = p.get_bounded_uint(2, false, MAX_BASIS_POINTS, MAX_BASIS_POINTS);
    let withdraw_asset = p.get_asset(3, false);
    Some(Memo::WithdrawLiquidity(WithdrawLiquidityMemo {
        pool: pool?,
        basis_points,
        withdraw_asset,
    }))
}

/// Donates the attached funds to a pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DonateMemo {
    /// The pool.
    pub pool: Asset,
}

impl DonateMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![self.pool.to_string()]
    }
}

pub(crate) fn decode_donate(p: &mut MemoParser<'_>) -> Option<Memo> {
    let pool = p.get_asset(1, true)?;
    Some(Memo::Donate(DonateMemo { pool }))
}
