//! Affiliate fee lists.
//!
//! An affiliate list names who receives a share of a fee and how many basis
//! points each receives. Two grammars exist for the same list:
//!
//! - **Verbose**: comma-separated `name:bps` pairs, e.g. `flashx:15,butter:20`
//! - **Compact**: packed `(letters)(digits)` groups with no separators,
//!   e.g. `fx15b20im10`, for byte-constrained memo fields
//!
//! A field containing `:` is verbose, otherwise compact. Parsing is
//! all-or-nothing: any malformed element empties the whole list.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Longest affiliate name accepted by the compact grammar.
pub const DEFAULT_MAX_COMPACT_NAME_LEN: usize = 2;

static VERBOSE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid affiliate name regex"));

/// One affiliate fee entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Affiliate {
    /// Affiliate name or code.
    pub name: String,
    /// Fee share in basis points (1/10000).
    pub basis_points: u64,
    /// `true` when the entry came from the compact grammar.
    pub compressed: bool,
}

impl Affiliate {
    /// Creates an entry from the verbose grammar.
    pub fn new(name: impl Into<String>, basis_points: u64) -> Self {
        Self {
            name: name.into(),
            basis_points,
            compressed: false,
        }
    }

    /// Creates an entry from the compact grammar.
    pub fn compact(name: impl Into<String>, basis_points: u64) -> Self {
        Self {
            name: name.into(),
            basis_points,
            compressed: true,
        }
    }
}

/// Parses an affiliate list with the default compact name length.
///
/// ```rust
/// use memokit::affiliate::{Affiliate, parse_affiliates};
///
/// assert_eq!(
///     parse_affiliates("fx15b20"),
///     vec![Affiliate::compact("fx", 15), Affiliate::compact("b", 20)],
/// );
/// assert!(parse_affiliates("fx15b").is_empty());
/// ```
#[must_use]
pub fn parse_affiliates(field: &str) -> Vec<Affiliate> {
    parse_affiliates_with(field, DEFAULT_MAX_COMPACT_NAME_LEN)
}

/// Parses an affiliate list, bounding compact names to `max_name_len` bytes.
///
/// Returns every entry in the field, or an empty list if any entry is
/// malformed. A blank field is an empty list.
#[must_use]
pub fn parse_affiliates_with(field: &str, max_name_len: usize) -> Vec<Affiliate> {
    let field = field.trim_ascii();
    if field.is_empty() {
        return Vec::new();
    }
    let parsed = if field.contains(':') {
        parse_verbose(field)
    } else {
        parse_compact(field, max_name_len)
    };
    parsed.unwrap_or_default()
}

/// Encodes an affiliate list.
///
/// Uses the compact grammar when every entry is compressed, otherwise the
/// verbose grammar.
#[must_use]
pub fn encode_affiliates(affiliates: &[Affiliate]) -> String {
    let compact = !affiliates.is_empty() && affiliates.iter().all(|a| a.compressed);
    let (pair, list) = if compact { ("", "") } else { (":", ",") };
    affiliates
        .iter()
        .map(|a| format!("{}{pair}{}", a.name, a.basis_points))
        .collect::<Vec<_>>()
        .join(list)
}

fn parse_verbose(field: &str) -> Option<Vec<Affiliate>> {
    field
        .split(',')
        .map(|pair| {
            let (name, bps) = pair.trim_ascii().split_once(':')?;
            let name = name.trim_ascii();
            if !VERBOSE_NAME_RE.is_match(name) {
                return None;
            }
            Some(Affiliate::new(name, parse_bps(bps.trim_ascii())?))
        })
        .collect()
}

fn parse_compact(field: &str, max_name_len: usize) -> Option<Vec<Affiliate>> {
    let mut out = Vec::new();
    let mut name = String::new();
    let mut digits = String::new();

    for ch in field.chars() {
        if ch.is_ascii_digit() {
            if name.is_empty() {
                return None;
            }
            digits.push(ch);
        } else if is_compact_name_char(ch) {
            if !digits.is_empty() {
                out.push(Affiliate::compact(
                    std::mem::take(&mut name),
                    parse_bps(&digits)?,
                ));
                digits.clear();
            }
            name.push(ch);
            if name.len() > max_name_len {
                return None;
            }
        } else {
            return None;
        }
    }

    if name.is_empty() || digits.is_empty() {
        return None;
    }
    out.push(Affiliate::compact(name, parse_bps(&digits)?));
    Some(out)
}

const fn is_compact_name_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '-' || ch == '_'
}

fn parse_bps(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
