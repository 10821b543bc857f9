#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Deterministic decoder and encoder for cross-chain settlement memos.
//!
//! A memo is a short colon-delimited instruction carried in a transaction's
//! memo field, such as `=:BTC.BTC:bc1q...:100/10/20` for a streaming swap.
//! Every node that sees the same memo under the same protocol version must
//! reach the same [`Memo`] or the same [`DecodeError`], so decoding depends
//! only on the memo text and an explicit [`DecodeContext`].
//!
//! # Overview
//!
//! ```rust
//! use memokit::{DecodeContext, Memo};
//!
//! let memo = Memo::decode("RAGNAROK:1024", &DecodeContext::default()).unwrap();
//! assert_eq!(memo.block_height(), 1024);
//! assert_eq!(memo.encode(), "RAGNAROK:1024");
//! ```
//!
//! Field problems are collected across the whole memo rather than reported
//! one at a time:
//!
//! ```rust
//! use memokit::Memo;
//!
//! let err = "=:BTC:bad-dest".parse::<Memo>().unwrap_err();
//! assert_eq!(err.failures().len(), 2);
//! ```
//!
//! # Modules
//!
//! - [`affiliate`] - Compact and verbose affiliate fee lists
//! - [`amount`] - Permissive arbitrary-precision amount parsing
//! - [`context`] - Decode context, limits, and the name-resolving keeper
//! - [`error`] - Structural and field-level decode errors
//! - [`kind`] - Instruction kinds, prefixes and aliases
//! - [`memo`] - The decoded memo sum type and its records
//! - [`parser`] - Positional field access with error accumulation
//! - [`registry`] - Version-aware decoder dispatch
//! - [`types`] - Chain, asset, address and transaction id value types
//! - [`version`] - Protocol versions
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing of decode outcomes

pub mod affiliate;
pub mod amount;
pub mod context;
pub mod error;
pub mod kind;
pub mod memo;
pub mod parser;
pub mod registry;
pub mod types;
pub mod version;

pub use affiliate::{Affiliate, encode_affiliates, parse_affiliates};
pub use amount::parse_min_amount;
pub use context::{DecodeContext, Keeper, MemoLimits, NullKeeper, StaticKeeper};
pub use error::{DecodeError, FieldError};
pub use kind::InstructionKind;
pub use memo::Memo;
pub use registry::{DecoderRegistry, decode};
pub use version::ProtocolVersion;
