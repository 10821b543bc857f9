//! Error types for memo decoding.
//!
//! Structural problems (empty memo, unknown or unsupported kind, unsupported
//! protocol version) fail immediately. Field problems are collected as
//! [`FieldError`]s across the whole memo and returned together as one
//! [`DecodeError::Fields`].

use crate::kind::InstructionKind;
use crate::version::ProtocolVersion;

/// A problem with one memo field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The field text is not a valid value of the expected type.
    #[error("cannot parse '{raw}' as a {expected}: {cause}")]
    Parse {
        /// Zero-based field index.
        index: usize,
        /// The raw field text.
        raw: String,
        /// Name of the expected type.
        expected: &'static str,
        /// Why parsing failed.
        cause: String,
    },
    /// The memo has fewer fields than the kind requires.
    #[error("not enough parameters: got {got} / want {want}")]
    NotEnoughParameters {
        /// Number of fields present, including the kind token.
        got: usize,
        /// Minimum number of fields, including the kind token.
        want: usize,
    },
    /// Individually valid fields form an invalid combination.
    #[error("{0}")]
    Invalid(String),
}

/// Error returned when a memo cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The memo is empty.
    #[error("memo can't be empty")]
    Empty,
    /// The kind token matches no alias.
    #[error("invalid tx type: {0}")]
    InvalidTxType(String),
    /// The kind is known but no decoder is registered for it.
    #[error("TxType not supported: {0}")]
    Unsupported(InstructionKind),
    /// Every registered grammar for the kind is newer than the protocol version.
    #[error("{kind} memos are not supported at protocol version {version} (requires {minimum})")]
    UnsupportedVersion {
        /// The memo kind.
        kind: InstructionKind,
        /// The protocol version decoding ran at.
        version: ProtocolVersion,
        /// The oldest grammar version registered for the kind.
        minimum: ProtocolVersion,
    },
    /// One or more fields failed to parse.
    #[error("MEMO: {memo}\nPARSE FAILURE(S): {}", join_failures(.failures))]
    Fields {
        /// The raw memo.
        memo: String,
        /// Every field failure, in the order they were found.
        failures: Vec<FieldError>,
    },
    /// Decoding faulted unexpectedly and was contained.
    #[error("MEMO: {memo}\ninternal decode fault: {reason}")]
    Internal {
        /// The raw memo.
        memo: String,
        /// Description of the fault.
        reason: String,
    },
}

/// Separator between aggregated field failures.
pub const FAILURE_SEPARATOR: &str = "; ";

fn join_failures(failures: &[FieldError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(FAILURE_SEPARATOR)
}

impl DecodeError {
    /// Returns the field failures, empty for structural errors.
    #[must_use]
    pub fn failures(&self) -> &[FieldError] {
        match self {
            Self::Fields { failures, .. } => failures,
            _ => &[],
        }
    }

    /// Returns a machine-readable reason code.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Empty => "empty_memo",
            Self::InvalidTxType(_) => "invalid_tx_type",
            Self::Unsupported(_) => "unsupported_tx_type",
            Self::UnsupportedVersion { .. } => "unsupported_version",
            Self::Fields { .. } => "invalid_fields",
            Self::Internal { .. } => "internal_fault",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_messages() {
        let parse = FieldError::Parse {
            index: 1,
            raw: "BTC".into(),
            expected: "asset",
            cause: "no separator".into(),
        };
        assert_eq!(
            parse.to_string(),
            "cannot parse 'BTC' as a asset: no separator"
        );
        let count = FieldError::NotEnoughParameters { got: 1, want: 3 };
        assert_eq!(count.to_string(), "not enough parameters: got 1 / want 3");
    }

    #[test]
    fn test_fields_error_joins_failures() {
        let err = DecodeError::Fields {
            memo: "=:BTC".into(),
            failures: vec![
                FieldError::Invalid("first".into()),
                FieldError::Invalid("second".into()),
            ],
        };
        assert_eq!(
            err.to_string(),
            "MEMO: =:BTC\nPARSE FAILURE(S): first; second"
        );
        assert_eq!(err.failures().len(), 2);
        assert_eq!(err.reason(), "invalid_fields");
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(DecodeError::Empty.to_string(), "memo can't be empty");
        assert_eq!(
            DecodeError::Unsupported(InstructionKind::Ragnarok).to_string(),
            "TxType not supported: ragnarok"
        );
        assert!(DecodeError::Empty.failures().is_empty());
    }
}
