use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use super::liquidity::MAX_BASIS_POINTS;
use super::{Memo, opt};
use crate::parser::MemoParser;
use crate::types::Address;

/// Bonds the attached funds to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BondMemo {
    /// The node.
    pub node_address: Address,
    /// Bond provider whitelisted by the operator.
    pub provider: Option<Address>,
    /// Operator fee charged to providers, in basis points.
    pub operator_fee_bps: Option<u64>,
}

impl BondMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![
            self.node_address.to_string(),
            opt(self.provider.as_ref()),
            opt(self.operator_fee_bps.as_ref()),
        ]
    }
}

pub(crate) fn decode_bond(p: &mut MemoParser<'_>) -> Option<Memo> {
    let node_address = p.get_address(1, true);
    let provider = p.get_address(2, false);
    let operator_fee_bps = if p.get(3).is_empty() {
        None
    } else {
        Some(p.get_bounded_uint(3, false, 0, MAX_BASIS_POINTS))
    };
    Some(Memo::Bond(BondMemo {
        node_address: node_address?,
        provider,
        operator_fee_bps,
    }))
}

/// Unbonds funds from a node.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnbondMemo {
    /// The node.
    pub node_address: Address,
    /// Amount to unbond, in base units.
    #[serde_as(as = "DisplayFromStr")]
    pub amount: BigUint,
    /// Bond provider to unbond for.
    pub provider: Option<Address>,
}

impl UnbondMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![
            self.node_address.to_string(),
            self.amount.to_string(),
            opt(self.provider.as_ref()),
        ]
    }
}

pub(crate) fn decode_unbond(p: &mut MemoParser<'_>) -> Option<Memo> {
    let node_address = p.get_address(1, true);
    let amount = p.get_uint(2, true, BigUint::ZERO);
    let provider = p.get_address(3, false);
    Some(Memo::Unbond(UnbondMemo {
        node_address: node_address?,
        amount,
        provider,
    }))
}

/// Asks a node to leave the active set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaveMemo {
    /// The node.
    pub node_address: Address,
}

impl LeaveMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![self.node_address.to_string()]
    }
}

pub(crate) fn decode_leave(p: &mut MemoParser<'_>) -> Option<Memo> {
    let node_address = p.get_address(1, true)?;
    Some(Memo::Leave(LeaveMemo { node_address }))
}
