//! Permissive amount parsing.
//!
//! [`parse_min_amount`] turns a memo sub-field into an arbitrary-precision,
//! non-negative integer. It accepts plain integer literals of any length and
//! scientific notation (`12345e8`, `1.5E3`), truncating any fractional
//! remainder. It never fails: anything it cannot read is zero.
//!
//! All arithmetic is integer-only so every node reaches the same value.

use num_bigint::BigUint;
use num_traits::Zero;

/// Largest power of ten a scientific-notation amount may be scaled by.
///
/// Larger scales read as zero so a short memo cannot force an arbitrarily
/// large allocation.
pub const MAX_SCALE: u32 = 256;

/// Parses an amount, returning zero when the text is not a valid amount.
///
/// Leading and trailing ASCII whitespace is ignored; whitespace inside the
/// number, signs on the mantissa, and decimal points without an exponent are
/// rejected.
///
/// ```rust
/// use memokit::amount::parse_min_amount;
/// use num_bigint::BigUint;
///
/// assert_eq!(parse_min_amount("12345e8"), BigUint::from(1_234_500_000_000u64));
/// assert_eq!(parse_min_amount("1.99e0"), BigUint::from(1u8));
/// assert_eq!(parse_min_amount("not a number"), BigUint::from(0u8));
/// ```
#[must_use]
pub fn parse_min_amount(text: &str) -> BigUint {
    try_parse_amount(text).unwrap_or_default()
}

fn try_parse_amount(text: &str) -> Option<BigUint> {
    let text = text.trim_ascii();
    if text.is_empty() {
        return Some(BigUint::zero());
    }
    match text.find(['e', 'E']) {
        Some(pos) => parse_scientific(&text[..pos], &text[pos + 1..]),
        None => parse_digits(text),
    }
}

fn parse_digits(digits: &str) -> Option<BigUint> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(digits.as_bytes(), 10)
}

fn parse_scientific(mantissa: &str, exponent: &str) -> Option<BigUint> {
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }
    let exponent = parse_exponent(exponent)?;

    let digits = parse_digits(&format!("{int_part}{frac_part}"))?;
    let frac_len = i64::try_from(frac_part.len()).ok()?;
    let scale = exponent.checked_sub(frac_len)?;

    if scale >= 0 {
        let scale = u32::try_from(scale).ok().filter(|s| *s <= MAX_SCALE)?;
        Some(digits * BigUint::from(10u8).pow(scale))
    } else {
        let shift = scale.unsigned_abs();
        // Dividing by more powers of ten than there are digits leaves nothing.
        if shift > (int_part.len() + frac_part.len()) as u64 {
            return Some(BigUint::zero());
        }
        let shift = u32::try_from(shift).ok()?;
        Some(digits / BigUint::from(10u8).pow(shift))
    }
}

fn parse_exponent(exponent: &str) -> Option<i64> {
    let (negative, digits) = match exponent.as_bytes().first() {
        Some(b'-') => (true, &exponent[1..]),
        Some(b'+') => (false, &exponent[1..]),
        _ => (false, exponent),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let significant = digits.trim_start_matches('0');
    let value: i64 = if significant.is_empty() {
        0
    } else {
        significant.parse().ok()?
    };
    Some(if negative { -value } else { value })
}
