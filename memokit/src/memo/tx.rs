use serde::{Deserialize, Serialize};

use super::Memo;
use crate::kind::InstructionKind;
use crate::parser::MemoParser;
use crate::types::{Chain, TxId};

/// An observed inbound or refund transaction.
///
/// The hash is kept as written: its format depends on the source chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservedTxMemo {
    /// Chain the transaction was observed on.
    pub chain: Chain,
    /// Transaction hash on that chain.
    pub tx_hash: String,
}

impl ObservedTxMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![self.chain.to_string(), self.tx_hash.clone()]
    }
}

pub(crate) fn decode_observed_tx(p: &mut MemoParser<'_>) -> Option<Memo> {
    let chain = p.get_chain(1, true);
    let tx_hash = p.get_string(2, true);
    if let Some(hash) = tx_hash.as_deref().filter(|h| h.contains(['|', ':'])) {
        p.fail(format!("tx hash '{hash}' contains a field separator"));
    }
    let memo = ObservedTxMemo {
        chain: chain?,
        tx_hash: tx_hash?,
    };
    Some(match p.kind() {
        InstructionKind::Refund => Memo::Refund(memo),
        _ => Memo::Inbound(memo),
    })
}

/// An outbound transaction settling an earlier inbound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutboundMemo {
    /// Hash of the inbound transaction being settled.
    pub tx_id: TxId,
}

impl OutboundMemo {
    pub(super) fn fields(&self) -> Vec<String> {
        vec![self.tx_id.to_string()]
    }
}

pub(crate) fn decode_outbound(p: &mut MemoParser<'_>) -> Option<Memo> {
    let tx_id = p.get_tx_id(1, true)?;
    Some(Memo::Outbound(OutboundMemo { tx_id }))
}

/// A memo that only carries a block height: migrate and ragnarok.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeightMemo {
    /// Block height the instruction applies to.
    pub block_height: i64,
}

impl HeightMemo {
    pub(super) fn fields(self) -> Vec<String> {
        vec![self.block_height.to_string()]
    }
}

pub(crate) fn decode_height(p: &mut MemoParser<'_>) -> Option<Memo> {
    let memo = HeightMemo {
        block_height: p.get_int(1, true, 0),
    };
    Some(match p.kind() {
        InstructionKind::Ragnarok => Memo::Ragnarok(memo),
        _ => Memo::Migrate(memo),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    const HASH: &str = "8FA9E8C95D7AA39F63FE0D9E6D12AFBE6E2D3C1CB2D5E63D1A4C0E8F1F0C9A21";

    #[test]
    fn test_refund_with_pipes() {
        let raw = format!("M<|btc_test|0x{HASH}");
        let memo: Memo = raw.parse().unwrap();
        assert_eq!(memo.kind(), InstructionKind::Refund);
        assert_eq!(memo.chain().map(Chain::as_str), Some("btc_test"));
        assert_eq!(memo.tx_id(), Some(format!("0x{HASH}").as_str()));
        assert_eq!(memo.encode(), raw);
    }

    #[test]
    fn test_inbound_accepts_colons() {
        let memo: Memo = "inbound:BTC:abc123".parse().unwrap();
        assert_eq!(memo.kind(), InstructionKind::Inbound);
        assert_eq!(memo.encode(), "M>|BTC|abc123");
    }

    #[test]
    fn test_hash_with_separator_rejected() {
        for raw in ["M>:BTC:abc|def", "M<|BTC|abc:def"] {
            let err = raw.parse::<Memo>().unwrap_err();
            assert_eq!(err.failures().len(), 1, "{raw}");
            let message = err.to_string();
            assert!(message.contains("contains a field separator"), "{raw}");
        }
    }

    #[test]
    fn test_refund_missing_hash() {
        let err = "M<|BTC".parse::<Memo>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("not enough parameters: got 2 / want 3"));
    }

    #[test]
    fn test_outbound() {
        let memo: Memo = format!("out:{HASH}").parse().unwrap();
        assert_eq!(memo.encode(), format!("OUT:{HASH}"));
        assert!(matches!(
            "OUT:nothex".parse::<Memo>(),
            Err(DecodeError::Fields { .. })
        ));
    }

    #[test]
    fn test_heights() {
        let memo: Memo = "MIGRATE:42".parse().unwrap();
        assert_eq!(memo.kind(), InstructionKind::Migrate);
        assert_eq!(memo.block_height(), 42);
        let err = "RAGNAROK:tall".parse::<Memo>().unwrap_err();
        assert_eq!(err.failures().len(), 1);
    }
}
