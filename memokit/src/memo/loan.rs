use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use super::{Memo, nonzero, opt};
use crate::parser::MemoParser;
use crate::types::{Address, Asset};

fn min_out_field(min_out: &BigUint) -> String {
    if min_out.is_zero() {
        String::new()
    } else {
        min_out.to_string()
    }
}

/// Opens a loan against the attached collateral.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanOpenMemo {
    /// Asset the debt is paid out in.
    pub target_asset: Asset,
    /// Address receiving the payout.
    pub destination: Address,
    /// Minimum acceptable payout.
    #[serde_as(as = "DisplayFromStr")]
    pub min_out: BigUint,
    /// Affiliate taking a fee from the loan.
    pub affiliate: Option<Address>,
    /// Affiliate fee in basis points.
    pub affiliate_bps: u64,
}

impl LoanOpenMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![
            self.target_asset.to_string(),
            self.destination.to_string(),
            min_out_field(&self.min_out),
            opt(self.affiliate.as_ref()),
            nonzero(self.affiliate_bps),
        ]
    }
}

pub(crate) fn decode_loan_open(p: &mut MemoParser<'_>) -> Option<Memo> {
    let max_bps = p.context().limits().max_affiliate_bps;
    let target_asset = p.get_asset(1, true);
    let destination = p.get_address(2, true);
    let min_out = p.get_amount(3);
    let affiliate = p.get_address(4, false);
    let affiliate_bps = p.get_bounded_uint(5, false, 0, max_bps);
    if affiliate_bps > 0 && affiliate.is_none() {
        p.fail("affiliate fee set without an affiliate");
    }
    Some(Memo::LoanOpen(LoanOpenMemo {
        target_asset: target_asset?,
        destination: destination?,
        min_out,
        affiliate,
        affiliate_bps,
    }))
}

/// Repays a loan with the attached funds.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanRepaymentMemo {
    /// Collateral asset of the loan.
    pub collateral_asset: Asset,
    /// Owner of the loan.
    pub owner: Address,
    /// Minimum collateral to receive back.
    #[serde_as(as = "DisplayFromStr")]
    pub min_out: BigUint,
}

impl LoanRepaymentMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![
            self.collateral_asset.to_string(),
            self.owner.to_string(),
            min_out_field(&self.min_out),
        ]
    }
}

pub(crate) fn decode_loan_repayment(p: &mut MemoParser<'_>) -> Option<Memo> {
    let collateral_asset = p.get_asset(1, true);
    let owner = p.get_address(2, true);
    let min_out = p.get_amount(3);
    Some(Memo::LoanRepayment(LoanRepaymentMemo {
        collateral_asset: collateral_asset?,
        owner: owner?,
        min_out,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_open() {
        let memo: Memo = "LOAN+:ETH.ETH:0xDEST:1e6:thor1aff:25".parse().unwrap();
        assert_eq!(memo.slip_limit(), &BigUint::from(1_000_000u32));
        assert_eq!(memo.destination().map(Address::as_str), Some("0xDEST"));
        assert_eq!(memo.encode(), "LOAN+:ETH.ETH:0xDEST:1000000:thor1aff:25");
    }

    #[test]
    fn test_loan_open_bad_min_out_is_zero() {
        let memo: Memo = "$+:BTC.BTC:bc1qdest:lots".parse().unwrap();
        assert_eq!(memo.slip_limit(), &BigUint::ZERO);
        assert_eq!(memo.encode(), "LOAN+:BTC.BTC:bc1qdest");
    }

    #[test]
    fn test_loan_repayment() {
        let raw = "LOAN-:BTC.BTC:thor1owner:500";
        let memo: Memo = raw.parse().unwrap();
        assert_eq!(memo.encode(), raw);
        let err = "LOAN-:BTC.BTC".parse::<Memo>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("not enough parameters: got 2 / want 3"));
    }
}
