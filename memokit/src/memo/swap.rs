//! Swap memos.
//!
//! Two grammars are registered:
//!
//! - **Legacy** (`1.0.0`): `=:asset:dest:limit:affiliate:fee`, one affiliate,
//!   no streaming, no refund address
//! - **Streaming** (`2.0.0`):
//!   `=:asset:dest/refund:limit/interval/quantity:aff1/aff2:bps1/bps2:aggregator:target:min`
//!
//! Both decode into the same [`SwapMemo`], which always encodes with the
//! streaming grammar. A memo accepted by the legacy grammar encodes to text
//! the streaming grammar reads back identically.

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use super::{Memo, opt};
use crate::affiliate::Affiliate;
use crate::context::MemoLimits;
use crate::parser::{MemoParser, SUB_SEPARATOR};
use crate::types::{Address, Asset, is_valid_name};

/// Swaps the attached funds for another asset.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapMemo {
    /// Asset to swap to.
    pub asset: Asset,
    /// Address receiving the output.
    pub destination: Option<Address>,
    /// Address receiving a refund if the swap fails.
    pub refund_address: Option<Address>,
    /// Minimum acceptable output. Zero means no limit.
    #[serde_as(as = "DisplayFromStr")]
    pub slip_limit: BigUint,
    /// Blocks between streaming sub-swaps.
    pub stream_interval: u64,
    /// Number of streaming sub-swaps. Zero lets the protocol choose.
    pub stream_quantity: u64,
    /// Affiliate fee entries.
    pub affiliates: Vec<Affiliate>,
    /// Aggregator contract to route the output through.
    pub aggregator: Option<Address>,
    /// Final token address at the aggregator.
    pub aggregator_target: Option<Address>,
    /// Minimum output of the aggregator leg.
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub aggregator_min_out: Option<BigUint>,
}

impl SwapMemo {
    /// Returns `true` if the swap streams over multiple blocks.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.stream_interval > 0 || self.stream_quantity > 0
    }

    pub(super) fn fields(&self) -> Vec<String> {
        let destination = match (&self.destination, &self.refund_address) {
            (Some(dest), Some(refund)) => format!("{dest}{SUB_SEPARATOR}{refund}"),
            (Some(dest), None) => dest.to_string(),
            (None, _) => String::new(),
        };
        let limit = if self.is_streaming() {
            format!(
                "{}{SUB_SEPARATOR}{}{SUB_SEPARATOR}{}",
                self.slip_limit, self.stream_interval, self.stream_quantity
            )
        } else if self.slip_limit.is_zero() {
            String::new()
        } else {
            self.slip_limit.to_string()
        };
        let separator = SUB_SEPARATOR.to_string();
        let names = self
            .affiliates
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(&separator);
        let bps = self
            .affiliates
            .iter()
            .map(|a| a.basis_points.to_string())
            .collect::<Vec<_>>()
            .join(&separator);
        vec![
            self.asset.to_string(),
            destination,
            limit,
            names,
            bps,
            opt(self.aggregator.as_ref()),
            opt(self.aggregator_target.as_ref()),
            opt(self.aggregator_min_out.as_ref()),
        ]
    }
}

fn is_valid_affiliate(name: &str) -> bool {
    is_valid_name(name) || name.parse::<Address>().is_ok()
}

/// Decodes the streaming grammar.
pub(crate) fn decode_swap(p: &mut MemoParser<'_>) -> Option<Memo> {
    let limits = *p.context().limits();
    let asset = p.get_asset(1, true);

    let destination = p.get_sub_address(2, 0);
    let refund_address = p.get_sub_address(2, 1);
    if p.get_sub(2, 0).is_empty() && !p.get_sub(2, 1).is_empty() {
        p.fail("refund address set without a destination");
    }

    let slip_limit = p.get_sub_amount(3, 0);
    let stream_interval = p.get_sub_uint(3, 1, 0);
    let stream_quantity = p.get_sub_uint(3, 2, 0);

    let affiliates = decode_affiliates(p, &limits);

    let aggregator = p.get_address(6, false);
    let aggregator_target = p.get_address(7, false);
    let aggregator_min_out = if p.get(8).is_empty() {
        None
    } else {
        Some(p.get_amount(8))
    };

    Some(Memo::Swap(SwapMemo {
        asset: asset?,
        destination,
        refund_address,
        slip_limit,
        stream_interval,
        stream_quantity,
        affiliates,
        aggregator,
        aggregator_target,
        aggregator_min_out,
    }))
}

/// Reads the parallel affiliate name and basis point arrays in fields 4
/// and 5.
fn decode_affiliates(p: &mut MemoParser<'_>, limits: &MemoLimits) -> Vec<Affiliate> {
    let names = p.get_string_array(4, SUB_SEPARATOR);
    let bps = p.get_uint_array(5, SUB_SEPARATOR);
    let bps_given = !p.get(5).is_empty();

    if names.is_empty() {
        if bps.iter().any(|b| *b > 0) {
            p.fail("affiliate fee set without an affiliate");
        }
        return Vec::new();
    }
    let mut valid = true;
    for name in names.iter().filter(|n| !is_valid_affiliate(n)) {
        p.fail(format!("invalid affiliate '{name}'"));
        valid = false;
    }
    if names.len() > limits.max_affiliates {
        p.fail(format!(
            "too many affiliates: {} exceeds maximum {}",
            names.len(),
            limits.max_affiliates
        ));
        valid = false;
    }

    let bps = match (bps_given, bps.len()) {
        (false, _) => vec![0; names.len()],
        // The malformed array was already recorded.
        (true, 0) => return Vec::new(),
        (true, 1) => vec![bps[0]; names.len()],
        (true, n) if n == names.len() => bps,
        (true, n) => {
            p.fail(format!(
                "affiliate count {} does not match fee count {n}",
                names.len()
            ));
            return Vec::new();
        }
    };
    let total = bps.iter().fold(0u64, |acc, b| acc.saturating_add(*b));
    if total > limits.max_affiliate_bps {
        p.fail(format!(
            "total affiliate fee {total} exceeds maximum {}",
            limits.max_affiliate_bps
        ));
        valid = false;
    }
    if !valid {
        return Vec::new();
    }
    names
        .into_iter()
        .zip(bps)
        .map(|(name, bps)| Affiliate::new(name, bps))
        .collect()
}

/// Decodes the legacy single-affiliate grammar.
pub(crate) fn decode_legacy_swap(p: &mut MemoParser<'_>) -> Option<Memo> {
    let max_bps = p.context().limits().max_affiliate_bps;
    let asset = p.get_asset(1, true);
    let destination = p.get_address(2, false);
    let slip_limit = p.get_amount(3);
    let affiliate = p.get(4);
    let fee = p.get_bounded_uint(5, false, 0, max_bps);

    let affiliates = if affiliate.is_empty() {
        if fee > 0 {
            p.fail("affiliate fee set without an affiliate");
        }
        Vec::new()
    } else if is_valid_affiliate(affiliate) {
        vec![Affiliate::new(affiliate, fee)]
    } else {
        p.fail(format!("invalid affiliate '{affiliate}'"));
        Vec::new()
    };

    Some(Memo::Swap(SwapMemo {
        asset: asset?,
        destination,
        refund_address: None,
        slip_limit,
        stream_interval: 0,
        stream_quantity: 0,
        affiliates,
        aggregator: None,
        aggregator_target: None,
        aggregator_min_out: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DecodeContext;
    use crate::version::ProtocolVersion;

    fn swap(raw: &str) -> SwapMemo {
        match raw.parse::<Memo>() {
            Ok(Memo::Swap(swap)) => swap,
            other => panic!("expected swap, got {other:?}"),
        }
    }

    fn decode_err(raw: &str) -> String {
        raw.parse::<Memo>().unwrap_err().to_string()
    }

    #[test]
    fn test_destination_with_refund() {
        let memo = swap("=:BTC.BTC:dest1/refund1:100/10/20");
        let destination = memo.destination.as_ref().map(Address::as_str);
        let refund = memo.refund_address.as_ref().map(Address::as_str);
        assert_eq!(destination, Some("dest1"));
        assert_eq!(refund, Some("refund1"));
        assert_eq!(memo.slip_limit, BigUint::from(100u8));
        assert_eq!(memo.stream_interval, 10);
        assert_eq!(memo.stream_quantity, 20);
        assert!(memo.is_streaming());
    }

    #[test]
    fn test_streaming_round_trip() {
        let raw = "=:ETH.ETH:0xDEST:100/10/20";
        let memo: Memo = raw.parse().unwrap();
        assert_eq!(memo.encode(), raw);
        assert_eq!(memo.slip_limit(), &BigUint::from(100u8));
    }

    #[test]
    fn test_empty_stream_parts_default_to_zero() {
        let memo = swap("=:ETH.ETH:0xDEST://5");
        assert!(memo.slip_limit.is_zero());
        assert_eq!(memo.stream_interval, 0);
        assert_eq!(memo.stream_quantity, 5);
        assert_eq!(Memo::Swap(memo).encode(), "=:ETH.ETH:0xDEST:0/0/5");
    }

    #[test]
    fn test_scientific_limit() {
        let memo = swap("s:BTC.BTC:bc1qdest:12345e8");
        assert_eq!(memo.slip_limit, BigUint::from(1_234_500_000_000u64));
        assert_eq!(
            Memo::Swap(memo).encode(),
            "=:BTC.BTC:bc1qdest:1234500000000"
        );
    }

    #[test]
    fn test_refund_without_destination() {
        let err = decode_err("=:BTC.BTC:/refund1");
        assert!(err.contains("refund address set without a destination"));
    }

    #[test]
    fn test_affiliate_arrays() {
        let memo = swap("=:BTC.BTC:dest::t1/t2:10/20");
        assert_eq!(
            memo.affiliates,
            vec![Affiliate::new("t1", 10), Affiliate::new("t2", 20)]
        );
        assert_eq!(Memo::Swap(memo).encode(), "=:BTC.BTC:dest::t1/t2:10/20");
    }

    #[test]
    fn test_single_fee_broadcasts() {
        let memo = swap("=:BTC.BTC:dest::a/b/c:15");
        assert!(memo.affiliates.iter().all(|a| a.basis_points == 15));
        assert_eq!(memo.affiliates.len(), 3);
    }

    #[test]
    fn test_missing_fees_are_zero() {
        let memo = swap("=:BTC.BTC:dest::a/b");
        assert!(memo.affiliates.iter().all(|a| a.basis_points == 0));
    }

    #[test]
    fn test_affiliate_count_mismatch() {
        let err = decode_err("=:BTC.BTC:dest::a/b/c:10/20");
        assert!(err.contains("does not match fee count 2"));
    }

    #[test]
    fn test_affiliate_limits() {
        let too_many = decode_err("=:BTC.BTC:dest::a/b/c/d/e/f:1");
        assert!(too_many.contains("too many affiliates"));
        let over_fee = decode_err("=:BTC.BTC:dest::a/b:600/500");
        assert!(over_fee.contains("total affiliate fee 1100"));
        let orphan_fee = decode_err("=:BTC.BTC:dest:::0/10");
        assert!(orphan_fee.contains("fee set without an affiliate"));
        let empty_name = decode_err("=:BTC.BTC:dest::a//b:1");
        assert!(empty_name.contains("invalid affiliate ''"));
    }

    #[test]
    fn test_zero_fee_without_affiliate() {
        let memo = swap("=:BTC.BTC:dest:::0");
        assert!(memo.affiliates.is_empty());
        assert_eq!(Memo::Swap(memo).encode(), "=:BTC.BTC:dest");
    }

    #[test]
    fn test_affiliate_limits_from_context() {
        let limits = MemoLimits {
            max_affiliates: 1,
            ..MemoLimits::default()
        };
        let ctx = DecodeContext::new(ProtocolVersion::LATEST).with_limits(limits);
        assert!(Memo::decode("=:BTC.BTC:dest::a:5", &ctx).is_ok());
        assert!(Memo::decode("=:BTC.BTC:dest::a/b:5", &ctx).is_err());
    }

    #[test]
    fn test_aggregator_fields() {
        let raw = "=:ETH.ETH:0xDEST:0/1/0:t:5:0xAGG:0xTOKEN:1e3";
        let memo = swap(raw);
        assert_eq!(memo.aggregator.as_ref().map(Address::as_str), Some("0xAGG"));
        assert_eq!(memo.aggregator_min_out, Some(BigUint::from(1000u16)));
        assert_eq!(
            Memo::Swap(memo).encode(),
            "=:ETH.ETH:0xDEST:0/1/0:t:5:0xAGG:0xTOKEN:1000"
        );
    }

    #[test]
    fn test_errors_accumulate() {
        let err = "=:BTC:bad-dest:100/x:a/b:1/2/3".parse::<Memo>().unwrap_err();
        assert_eq!(err.failures().len(), 4);
    }

    #[test]
    fn test_legacy_grammar() {
        let ctx = DecodeContext::new(ProtocolVersion::GENESIS);
        let memo = Memo::decode("SWAP:BTC.BTC:bc1qdest:1e3:thor1aff:30", &ctx).unwrap();
        let Memo::Swap(swap) = &memo else {
            panic!("expected swap, got {memo:?}");
        };
        assert_eq!(swap.slip_limit, BigUint::from(1000u16));
        assert_eq!(swap.affiliates, vec![Affiliate::new("thor1aff", 30)]);
        assert!(!swap.is_streaming());

        let encoded = memo.encode();
        assert_eq!(encoded, "=:BTC.BTC:bc1qdest:1000:thor1aff:30");
        assert_eq!(Memo::decode(&encoded, &ctx).unwrap(), memo);
        assert_eq!(encoded.parse::<Memo>().unwrap(), memo);
    }

    #[test]
    fn test_legacy_grammar_rejects_multi_value_fields() {
        let ctx = DecodeContext::new(ProtocolVersion::GENESIS);
        assert!(Memo::decode("=:BTC.BTC:dest/refund", &ctx).is_err());
        assert!(Memo::decode("=:BTC.BTC:dest:0:a/b:10", &ctx).is_err());
        assert!(Memo::decode("=:BTC.BTC:dest:0::10", &ctx).is_err());
    }

    #[test]
    fn test_legacy_grammar_reads_stream_limit_as_zero() {
        let ctx = DecodeContext::new(ProtocolVersion::GENESIS);
        let memo = Memo::decode("=:BTC.BTC:dest:100/10/20", &ctx).unwrap();
        let Memo::Swap(swap) = &memo else {
            panic!("expected swap, got {memo:?}");
        };
        assert!(swap.slip_limit.is_zero());
        assert!(!swap.is_streaming());
        assert_eq!(memo.encode(), "=:BTC.BTC:dest");
    }
}
