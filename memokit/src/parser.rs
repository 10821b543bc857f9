//! Positional field access with error accumulation.
//!
//! A memo is split into `:`-separated fields (field 0 is the kind token).
//! [`MemoParser`] hands out typed, bounds-checked views of those fields.
//! Typed getters never fail: they return a fallback and record the problem,
//! so a decoder reads every field and [`MemoParser::finish`] reports all
//! problems at once.

use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use num_bigint::BigUint;

use crate::affiliate::{Affiliate, parse_affiliates_with};
use crate::amount::parse_min_amount;
use crate::context::DecodeContext;
use crate::error::{DecodeError, FieldError};
use crate::kind::InstructionKind;
use crate::types::{Address, Asset, Chain, TxId};

/// Separator inside a single field.
pub const SUB_SEPARATOR: char = '/';

/// Transient parse state for one memo.
#[derive(Debug)]
pub struct MemoParser<'a> {
    memo: &'a str,
    kind: InstructionKind,
    fields: Vec<&'a str>,
    required: usize,
    errors: Vec<FieldError>,
    ctx: DecodeContext<'a>,
}

impl<'a> MemoParser<'a> {
    /// Splits a memo into fields and resolves its kind token.
    ///
    /// Inbound and refund memos may separate fields with `|` instead of `:`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Empty`] for an empty memo and
    /// [`DecodeError::InvalidTxType`] if the kind token matches no alias.
    pub fn new(memo: &'a str, ctx: DecodeContext<'a>) -> Result<Self, DecodeError> {
        if memo.is_empty() {
            return Err(DecodeError::Empty);
        }
        let head = memo.split(':').next().unwrap_or_default();
        let (kind, separator) = match InstructionKind::from_token(head) {
            Some(kind) => (kind, ':'),
            None => memo
                .split_once('|')
                .and_then(|(token, _)| InstructionKind::from_token(token))
                .filter(InstructionKind::accepts_pipe)
                .map(|kind| (kind, '|'))
                .ok_or_else(|| DecodeError::InvalidTxType(head.into()))?,
        };
        Ok(Self {
            memo,
            kind,
            fields: memo.split(separator).collect(),
            required: 0,
            errors: Vec::new(),
            ctx,
        })
    }

    /// Returns the raw memo.
    #[must_use]
    pub const fn memo(&self) -> &'a str {
        self.memo
    }

    /// Returns the resolved kind.
    #[must_use]
    pub const fn kind(&self) -> InstructionKind {
        self.kind
    }

    /// Returns the decode context.
    #[must_use]
    pub const fn context(&self) -> &DecodeContext<'a> {
        &self.ctx
    }

    /// Returns the number of fields, including the kind token.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the memo has no fields. Never the case for a
    /// parser built by [`MemoParser::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns field `index`, or `""` if out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> &'a str {
        self.fields.get(index).copied().unwrap_or_default()
    }

    /// Returns sub-field `sub` of field `index`, or `""` if either is out of
    /// range.
    #[must_use]
    pub fn get_sub(&self, index: usize, sub: usize) -> &'a str {
        self.get(index)
            .split(SUB_SEPARATOR)
            .nth(sub)
            .unwrap_or_default()
    }

    /// Records an invalid field combination.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.errors.push(FieldError::Invalid(message.into()));
    }

    /// Parses field `index` as a signed 64-bit integer.
    pub fn get_int(&mut self, index: usize, required: bool, default: i64) -> i64 {
        self.parse_field(index, required, "int", i64::from_str)
            .unwrap_or(default)
    }

    /// Parses field `index` as an arbitrary-precision unsigned integer.
    pub fn get_uint(&mut self, index: usize, required: bool, default: BigUint) -> BigUint {
        self.parse_field(index, required, "uint", parse_big_uint)
            .unwrap_or(default)
    }

    /// Parses field `index` as an unsigned integer no larger than `max`.
    ///
    /// A larger value is recorded as an error and clamped to `max`.
    pub fn get_bounded_uint(
        &mut self,
        index: usize,
        required: bool,
        default: u64,
        max: u64,
    ) -> u64 {
        let Some(value) = self.parse_field(index, required, "uint", parse_u64) else {
            return default;
        };
        if value > max {
            let raw = self.get(index);
            self.record(index, raw, "uint", format!("value {value} exceeds maximum {max}"));
            return max;
        }
        value
    }

    /// Parses sub-field `sub` of field `index` as an unsigned integer,
    /// returning `default` when it is empty.
    pub fn get_sub_uint(&mut self, index: usize, sub: usize, default: u64) -> u64 {
        let raw = self.get_sub(index, sub);
        if raw.is_empty() {
            return default;
        }
        parse_u64(raw).unwrap_or_else(|cause| {
            self.record(index, raw, "uint", cause);
            default
        })
    }

    /// Reads field `index` with the permissive amount grammar.
    ///
    /// Never records an error; unreadable amounts are zero.
    #[must_use]
    pub fn get_amount(&self, index: usize) -> BigUint {
        parse_min_amount(self.get(index))
    }

    /// Reads sub-field `sub` of field `index` with the permissive amount
    /// grammar.
    #[must_use]
    pub fn get_sub_amount(&self, index: usize, sub: usize) -> BigUint {
        parse_min_amount(self.get_sub(index, sub))
    }

    /// Reads field `index` as an affiliate list in the compact or verbose
    /// grammar, bounding compact names by the context's limits.
    ///
    /// Never records an error; a malformed list is empty.
    #[must_use]
    pub fn get_affiliates(&self, index: usize) -> Vec<Affiliate> {
        parse_affiliates_with(self.get(index), self.ctx.limits().max_compact_name_len)
    }

    /// Parses field `index` as an address or a registered name.
    pub fn get_address(&mut self, index: usize, required: bool) -> Option<Address> {
        let keeper = self.ctx.keeper();
        self.parse_field(index, required, "address", |raw| {
            keeper
                .resolve_name(raw)
                .map_or_else(|| Address::from_str(raw), Ok)
        })
    }

    /// Parses sub-field `sub` of field `index` as an optional address or
    /// registered name.
    pub fn get_sub_address(&mut self, index: usize, sub: usize) -> Option<Address> {
        let raw = self.get_sub(index, sub);
        if raw.is_empty() {
            return None;
        }
        if let Some(address) = self.ctx.keeper().resolve_name(raw) {
            return Some(address);
        }
        Address::from_str(raw)
            .map_err(|e| self.record(index, raw, "address", e))
            .ok()
    }

    /// Returns field `index` as an owned string, recording an error if it is
    /// required but empty.
    pub fn get_string(&mut self, index: usize, required: bool) -> Option<String> {
        self.parse_field(index, required, "string", |raw| {
            Ok::<_, Infallible>(raw.to_owned())
        })
    }

    /// Parses field `index` as a chain identifier.
    pub fn get_chain(&mut self, index: usize, required: bool) -> Option<Chain> {
        self.parse_field(index, required, "chain", Chain::from_str)
    }

    /// Parses field `index` as an asset identifier.
    pub fn get_asset(&mut self, index: usize, required: bool) -> Option<Asset> {
        self.parse_field(index, required, "asset", Asset::from_str)
    }

    /// Parses field `index` as a transaction hash.
    pub fn get_tx_id(&mut self, index: usize, required: bool) -> Option<TxId> {
        self.parse_field(index, required, "tx id", TxId::from_str)
    }

    /// Parses field `index` as standard base64.
    pub fn get_base64(&mut self, index: usize, required: bool) -> Vec<u8> {
        self.parse_field(index, required, "base64 string", |raw| b64.decode(raw))
            .unwrap_or_default()
    }

    /// Splits field `index` on `separator`. An empty field is an empty list.
    #[must_use]
    pub fn get_string_array(&self, index: usize, separator: char) -> Vec<String> {
        let raw = self.get(index);
        if raw.is_empty() {
            return Vec::new();
        }
        raw.split(separator).map(String::from).collect()
    }

    /// Splits field `index` on `separator` and parses every element as an
    /// unsigned integer.
    ///
    /// The first malformed element is recorded and the whole list is
    /// discarded.
    pub fn get_uint_array(&mut self, index: usize, separator: char) -> Vec<u64> {
        let raw = self.get(index);
        if raw.is_empty() {
            return Vec::new();
        }
        match raw.split(separator).map(parse_u64).collect::<Result<Vec<_>, _>>() {
            Ok(values) => values,
            Err(cause) => {
                self.record(index, raw, "uint array", cause);
                Vec::new()
            }
        }
    }

    /// Completes the parse.
    ///
    /// Checks that the memo carries every required field, then returns
    /// `value` if nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Fields`] with every recorded problem.
    pub fn finish<T>(mut self, value: T) -> Result<T, DecodeError> {
        let want = self.required + 1;
        if self.fields.len() < want {
            self.errors.push(FieldError::NotEnoughParameters {
                got: self.fields.len(),
                want,
            });
        }
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(DecodeError::Fields {
                memo: self.memo.into(),
                failures: self.errors,
            })
        }
    }

    fn parse_field<T, E: Display>(
        &mut self,
        index: usize,
        required: bool,
        expected: &'static str,
        parse: impl FnOnce(&str) -> Result<T, E>,
    ) -> Option<T> {
        if required {
            self.required += 1;
        }
        let raw = self.get(index);
        if raw.is_empty() {
            if required {
                self.record(index, raw, expected, "field is empty");
            }
            return None;
        }
        parse(raw)
            .map_err(|cause| self.record(index, raw, expected, cause))
            .ok()
    }

    fn record(&mut self, index: usize, raw: &str, expected: &'static str, cause: impl Display) {
        self.errors.push(FieldError::Parse {
            index,
            raw: raw.into(),
            expected,
            cause: cause.to_string(),
        });
    }
}

fn parse_u64(raw: &str) -> Result<u64, String> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{raw}' is not an unsigned integer"));
    }
    raw.parse().map_err(|e| format!("{e}"))
}

fn parse_big_uint(raw: &str) -> Result<BigUint, String> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{raw}' is not an unsigned integer"));
    }
    BigUint::parse_bytes(raw.as_bytes(), 10).ok_or_else(|| format!("'{raw}' is out of range"))
}
