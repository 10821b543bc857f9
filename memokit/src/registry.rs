//! Decoder dispatch by instruction kind and protocol version.
//!
//! [`DecoderRegistry`] maps each [`InstructionKind`] to one or more grammars,
//! each tagged with the protocol version that introduced it. Decoding picks
//! the newest grammar no newer than the context's protocol version.
//!
//! [`decode`] runs against the standard registry. Decoding never panics
//! across this boundary: an unexpected fault inside a decoder is contained
//! and reported as [`DecodeError::Internal`].

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;

use crate::context::DecodeContext;
use crate::error::DecodeError;
use crate::kind::InstructionKind;
use crate::memo::{self, Memo};
use crate::parser::MemoParser;
use crate::version::ProtocolVersion;

/// A grammar decoder.
///
/// Reads fields through the parser, which records every problem. Returns
/// `None` only if a required value is missing, in which case the parser
/// already holds an error.
pub type DecodeFn = fn(&mut MemoParser<'_>) -> Option<Memo>;

static STANDARD: LazyLock<DecoderRegistry> = LazyLock::new(DecoderRegistry::standard);

/// Decodes a memo with the standard registry.
///
/// # Errors
///
/// - [`DecodeError::Empty`] for an empty memo
/// - [`DecodeError::InvalidTxType`] if the kind token matches no alias
/// - [`DecodeError::Unsupported`] if no decoder is registered for the kind
/// - [`DecodeError::UnsupportedVersion`] if every grammar for the kind is
///   newer than the context's protocol version
/// - [`DecodeError::Fields`] with every field problem found
/// - [`DecodeError::Internal`] if the decoder faulted
pub fn decode(memo: &str, ctx: &DecodeContext<'_>) -> Result<Memo, DecodeError> {
    STANDARD.decode(memo, ctx)
}

/// Returns the shared standard registry.
#[must_use]
pub fn standard_registry() -> &'static DecoderRegistry {
    &STANDARD
}

/// Registry of memo decoders keyed by kind.
#[derive(Clone, Default)]
pub struct DecoderRegistry(HashMap<InstructionKind, Vec<(ProtocolVersion, DecodeFn)>>);

impl Debug for DecoderRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<String> = self
            .0
            .iter()
            .map(|(kind, grammars)| {
                let versions: Vec<String> =
                    grammars.iter().map(|(v, _)| v.to_string()).collect();
                format!("{kind}@{}", versions.join(","))
            })
            .collect();
        kinds.sort();
        f.debug_tuple("DecoderRegistry").field(&kinds).finish()
    }
}

impl DecoderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Creates a registry with every built-in grammar.
    #[must_use]
    pub fn standard() -> Self {
        use InstructionKind as K;
        let genesis = ProtocolVersion::GENESIS;
        let mut registry = Self::new();
        registry
            .register(K::Inbound, genesis, memo::decode_observed_tx)
            .register(K::Outbound, genesis, memo::decode_outbound)
            .register(K::Refund, genesis, memo::decode_observed_tx)
            .register(K::AddLiquidity, genesis, memo::decode_add_liquidity)
            .register(K::WithdrawLiquidity, genesis, memo::decode_withdraw_liquidity)
            .register(K::Swap, genesis, memo::decode_legacy_swap)
            .register(K::Swap, ProtocolVersion::STREAMING, memo::decode_swap)
            .register(K::Donate, genesis, memo::decode_donate)
            .register(K::Bond, genesis, memo::decode_bond)
            .register(K::Unbond, genesis, memo::decode_unbond)
            .register(K::Leave, genesis, memo::decode_leave)
            .register(K::Migrate, genesis, memo::decode_height)
            .register(K::Ragnarok, genesis, memo::decode_height)
            .register(K::Exec, genesis, memo::decode_exec)
            .register(K::ManageName, genesis, memo::decode_manage_name)
            .register(K::LoanOpen, genesis, memo::decode_loan_open)
            .register(K::LoanRepayment, genesis, memo::decode_loan_repayment)
            .register(K::TradeAccountDeposit, genesis, memo::decode_account)
            .register(K::TradeAccountWithdrawal, genesis, memo::decode_account)
            .register(K::SecuredAssetDeposit, genesis, memo::decode_account)
            .register(K::SecuredAssetWithdraw, genesis, memo::decode_account)
            .register(K::RunePoolDeposit, genesis, memo::decode_rune_pool_deposit)
            .register(K::RunePoolWithdraw, genesis, memo::decode_rune_pool_withdraw)
            .register(K::Switch, genesis, memo::decode_account);
        registry
    }

    /// Registers a grammar for `kind`, effective from protocol version
    /// `since`. Replaces any grammar registered at the same version.
    pub fn register(
        &mut self,
        kind: InstructionKind,
        since: ProtocolVersion,
        decoder: DecodeFn,
    ) -> &mut Self {
        let grammars = self.0.entry(kind).or_default();
        match grammars.binary_search_by_key(&since, |(v, _)| *v) {
            Ok(i) => grammars[i].1 = decoder,
            Err(i) => grammars.insert(i, (since, decoder)),
        }
        self
    }

    /// Removes every grammar for `kind`. Returns `true` if any existed.
    pub fn remove(&mut self, kind: InstructionKind) -> bool {
        self.0.remove(&kind).is_some_and(|g| !g.is_empty())
    }

    /// Returns the versions at which grammars for `kind` are registered,
    /// oldest first.
    pub fn versions(&self, kind: InstructionKind) -> impl Iterator<Item = ProtocolVersion> + '_ {
        self.0.get(&kind).into_iter().flatten().map(|(v, _)| *v)
    }

    /// Picks the grammar for `kind` at protocol version `version`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Unsupported`] if nothing is registered for the
    /// kind and [`DecodeError::UnsupportedVersion`] if every registered
    /// grammar is newer than `version`.
    pub fn select(
        &self,
        kind: InstructionKind,
        version: ProtocolVersion,
    ) -> Result<DecodeFn, DecodeError> {
        let grammars = self
            .0
            .get(&kind)
            .filter(|g| !g.is_empty())
            .ok_or(DecodeError::Unsupported(kind))?;
        grammars
            .iter()
            .rev()
            .find(|(since, _)| *since <= version)
            .map(|(_, decoder)| *decoder)
            .ok_or_else(|| DecodeError::UnsupportedVersion {
                kind,
                version,
                minimum: grammars[0].0,
            })
    }

    /// Decodes a memo.
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn decode(&self, memo: &str, ctx: &DecodeContext<'_>) -> Result<Memo, DecodeError> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.decode_unguarded(memo, ctx)))
            .unwrap_or_else(|payload| {
                Err(DecodeError::Internal {
                    memo: memo.into(),
                    reason: panic_reason(payload.as_ref()),
                })
            });

        #[cfg(feature = "telemetry")]
        match &result {
            Ok(decoded) => {
                tracing::debug!(kind = %decoded.kind(), version = %ctx.version(), "Decoded memo");
            }
            Err(DecodeError::Internal { reason, .. }) => {
                tracing::error!(memo, %reason, "Memo decoder faulted");
            }
            Err(e) => {
                tracing::debug!(memo, reason = e.reason(), error = %e, "Rejected memo");
            }
        }

        result
    }

    fn decode_unguarded(&self, memo: &str, ctx: &DecodeContext<'_>) -> Result<Memo, DecodeError> {
        let mut parser = MemoParser::new(memo, *ctx)?;
        let kind = parser.kind();
        let decoder = self.select(kind, ctx.version())?;
        let decoded = decoder(&mut parser);
        parser
            .finish(decoded)?
            .ok_or_else(|| DecodeError::Internal {
                memo: memo.into(),
                reason: format!("{kind} decoder produced no memo"),
            })
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "decoder panicked".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{MemoLimits, StaticKeeper};
    use crate::error::FieldError;
    use crate::types::Address;

    const HASH: &str = "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855";

    fn latest() -> DecodeContext<'static> {
        DecodeContext::default()
    }

    #[test]
    fn test_ragnarok_round_trip() {
        let memo = decode("RAGNAROK:1024", &latest()).unwrap();
        assert_eq!(
            memo,
            Memo::Ragnarok(memo::HeightMemo { block_height: 1024 })
        );
        assert_eq!(memo.block_height(), 1024);
        assert_eq!(memo.encode(), "RAGNAROK:1024");
    }

    #[test]
    fn test_refund_round_trip() {
        let raw = "M<|btc_test|0x8fa9...";
        let memo = decode(raw, &latest()).unwrap();
        assert_eq!(memo.kind(), InstructionKind::Refund);
        assert_eq!(memo.chain().map(|c| c.as_str()), Some("btc_test"));
        assert_eq!(memo.tx_id(), Some("0x8fa9..."));
        assert_eq!(memo.encode(), raw);
    }

    #[test]
    fn test_streaming_swap_with_refund() {
        let memo = decode("=:BTC.BTC:dest1/refund1:100/10/20", &latest()).unwrap();
        let Memo::Swap(swap) = &memo else {
            panic!("expected swap, got {memo:?}");
        };
        assert_eq!(memo.destination().map(Address::as_str), Some("dest1"));
        assert_eq!(memo.refund_address().map(Address::as_str), Some("refund1"));
        assert_eq!(memo.slip_limit(), &num_bigint::BigUint::from(100u8));
        assert_eq!(swap.stream_interval, 10);
        assert_eq!(swap.stream_quantity, 20);
        assert_eq!(memo.encode(), "=:BTC.BTC:dest1/refund1:100/10/20");
    }

    #[test]
    fn test_observed_examples() {
        for raw in [
            "=:ETH.ETH:0xDEST:100/10/20".to_owned(),
            "+:BTC.BTC:addr:affAddr:500".to_owned(),
            format!("OUT:{HASH}"),
        ] {
            let memo = decode(&raw, &latest()).unwrap();
            assert_eq!(memo.encode(), raw);
        }
    }

    #[test]
    fn test_round_trip_every_kind() {
        let memos = [
            format!("M>|BTC|{HASH}"),
            format!("OUT:0x{HASH}"),
            "M<|ETH|0xabc".to_owned(),
            "+:BTC.BTC:thor1paired:thor1aff:25".to_owned(),
            "-:BTC.BTC:5000:BTC.BTC".to_owned(),
            "=:BTC~BTC:thor1dest/bc1qrefund:0/3/0:a/b:5/10:0xAGG:0xTOKEN:42".to_owned(),
            "DONATE:ETH.ETH".to_owned(),
            "BOND:thor1node:thor1provider:500".to_owned(),
            "UNBOND:thor1node:100000000000000000000000:thor1provider".to_owned(),
            "LEAVE:thor1node".to_owned(),
            "MIGRATE:77".to_owned(),
            "RAGNAROK:9".to_owned(),
            "X:thor1contract:aGVsbG8=".to_owned(),
            "~:flash:BTC:bc1qflash:thor1owner:BTC.BTC:100".to_owned(),
            "LOAN+:ETH.ETH:0xDEST:10:thor1aff:5".to_owned(),
            "LOAN-:BTC.BTC:thor1owner:1".to_owned(),
            "TRADE+:thor1acct".to_owned(),
            "TRADE-:bc1qacct".to_owned(),
            "SECURE+:thor1acct".to_owned(),
            "SECURE-:bc1qacct".to_owned(),
            "POOL+".to_owned(),
            "POOL-:10000".to_owned(),
            "SWITCH:thor1acct".to_owned(),
        ];
        let mut seen = std::collections::HashSet::new();
        for raw in &memos {
            let memo = decode(raw, &latest()).unwrap_or_else(|e| panic!("{raw}: {e}"));
            seen.insert(memo.kind());
            let encoded = memo.encode();
            assert_eq!(&encoded, raw);
            assert_eq!(decode(&encoded, &latest()).unwrap(), memo);
        }
        assert_eq!(seen.len(), InstructionKind::ALL.len());
    }

    #[test]
    fn test_aliases_normalize() {
        for (raw, canonical) in [
            ("swap:btc.btc:bc1qdest", "=:BTC.BTC:bc1qdest"),
            ("S:BTC.BTC:bc1qdest::a:1", "=:BTC.BTC:bc1qdest::a:1"),
            ("refund:BTC:abc", "M<|BTC|abc"),
            ("withdraw:BTC.BTC", "-:BTC.BTC:10000"),
            ("name:flash:BTC:bc1q", "~:flash:BTC:bc1q"),
            ("=:BTC.BTC:bc1qdest:::::", "=:BTC.BTC:bc1qdest"),
        ] {
            assert_eq!(decode(raw, &latest()).unwrap().encode(), canonical, "{raw}");
        }
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(decode("", &latest()), Err(DecodeError::Empty));
        assert_eq!(
            decode("HODL:BTC.BTC", &latest()),
            Err(DecodeError::InvalidTxType("HODL".into()))
        );
    }

    #[test]
    fn test_count_error_reports_required_fields() {
        let err = decode("~:flash", &latest()).unwrap_err();
        assert!(
            err.failures()
                .contains(&FieldError::NotEnoughParameters { got: 2, want: 4 })
        );
        let message = err.to_string();
        assert!(message.starts_with("MEMO: ~:flash\nPARSE FAILURE(S): "));
        assert!(message.ends_with("not enough parameters: got 2 / want 4"));
    }

    #[test]
    fn test_unregistered_kind() {
        let mut registry = DecoderRegistry::standard();
        assert!(registry.remove(InstructionKind::Ragnarok));
        assert!(!registry.remove(InstructionKind::Ragnarok));
        assert_eq!(
            registry.decode("RAGNAROK:1", &latest()),
            Err(DecodeError::Unsupported(InstructionKind::Ragnarok))
        );
    }

    #[test]
    fn test_version_selection() {
        let registry = DecoderRegistry::standard();
        assert_eq!(
            registry.versions(InstructionKind::Swap).collect::<Vec<_>>(),
            vec![ProtocolVersion::GENESIS, ProtocolVersion::STREAMING]
        );
        let streaming = "=:BTC.BTC:dest/refund";
        assert!(registry.decode(streaming, &latest()).is_ok());
        let at = |v: ProtocolVersion| registry.decode(streaming, &DecodeContext::new(v));
        assert!(at(ProtocolVersion::new(3, 1, 0)).is_ok());
        assert!(at(ProtocolVersion::new(1, 9, 9)).is_err());
        assert!(at(ProtocolVersion::GENESIS).is_err());
    }

    #[test]
    fn test_version_too_old() {
        let ctx = DecodeContext::new(ProtocolVersion::new(0, 9, 0));
        assert_eq!(
            decode("LEAVE:thor1node", &ctx),
            Err(DecodeError::UnsupportedVersion {
                kind: InstructionKind::Leave,
                version: ProtocolVersion::new(0, 9, 0),
                minimum: ProtocolVersion::GENESIS,
            })
        );
    }

    #[test]
    fn test_shared_registry_covers_every_kind() {
        let registry = standard_registry();
        for kind in [
            InstructionKind::Swap,
            InstructionKind::Refund,
            InstructionKind::RunePoolWithdraw,
            InstructionKind::Switch,
        ] {
            assert!(registry.versions(kind).next().is_some(), "{kind}");
        }
        assert!(registry.versions(InstructionKind::Unknown).next().is_none());
    }

    #[test]
    fn test_register_replaces_same_version() {
        fn leave_everywhere(_: &mut MemoParser<'_>) -> Option<Memo> {
            Some(Memo::RunePoolDeposit)
        }
        let mut registry = DecoderRegistry::new();
        registry.register(InstructionKind::Leave, ProtocolVersion::GENESIS, memo::decode_leave);
        registry.register(InstructionKind::Leave, ProtocolVersion::GENESIS, leave_everywhere);
        assert_eq!(registry.versions(InstructionKind::Leave).count(), 1);
        assert_eq!(
            registry.decode("LEAVE:x", &latest()),
            Ok(Memo::RunePoolDeposit)
        );
    }

    #[test]
    fn test_decoder_fault_is_contained() {
        fn exploding(_: &mut MemoParser<'_>) -> Option<Memo> {
            panic!("boom")
        }
        let mut registry = DecoderRegistry::standard();
        registry.register(InstructionKind::Donate, ProtocolVersion::GENESIS, exploding);
        let err = registry.decode("DONATE:BTC.BTC", &latest()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Internal {
                memo: "DONATE:BTC.BTC".into(),
                reason: "boom".into(),
            }
        );
        assert_eq!(err.reason(), "internal_fault");
        assert!(registry.decode("LEAVE:thor1node", &latest()).is_ok());
    }

    #[test]
    fn test_keeper_resolves_names_per_context() {
        let first = StaticKeeper::new().with_name("flash", "thor1first".parse().unwrap());
        let second = StaticKeeper::new().with_name("flash", "thor1second".parse().unwrap());
        let a = DecodeContext::from_keeper(&first);
        let b = DecodeContext::from_keeper(&second);
        std::thread::scope(|s| {
            let ha = s.spawn(|| decode("SWITCH:flash", &a));
            let hb = s.spawn(|| decode("SWITCH:flash", &b));
            let ma = ha.join().unwrap().unwrap();
            let mb = hb.join().unwrap().unwrap();
            assert_eq!(ma.destination().map(Address::as_str), Some("thor1first"));
            assert_eq!(mb.destination().map(Address::as_str), Some("thor1second"));
        });
    }

    #[test]
    fn test_limits_are_per_context() {
        let strict = DecodeContext::default().with_limits(MemoLimits {
            max_affiliate_bps: 10,
            ..MemoLimits::default()
        });
        let raw = "=:BTC.BTC:dest::a:50";
        assert!(decode(raw, &latest()).is_ok());
        assert!(decode(raw, &strict).is_err());
    }
}
