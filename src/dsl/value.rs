//! Exact decimal values with engineering suffixes.

use num_bigint::BigInt;

use crate::circuit::Scalar;
use crate::error::{NodalError, Result};

/// Largest decimal exponent accepted, after applying the suffix.
pub const MAX_EXPONENT: u32 = 300;

/// Engineering suffixes and their powers of ten, longest first.
const SUFFIXES: &[(&str, i32)] = &[
    ("MEG", 6),
    ("Meg", 6),
    ("T", 12),
    ("G", 9),
    ("M", 6),
    ("K", 3),
    ("k", 3),
    ("m", -3),
    ("u", -6),
    ("µ", -6),
    ("n", -9),
    ("p", -12),
];

/// Parse a value with an optional engineering suffix (e.g. "10k", "4.7u", "1e-9").
///
/// The value is read exactly, so `0.1` is one tenth rather than the nearest
/// binary float. `M` is mega and `m` is milli.
pub fn parse_value(text: &str) -> Option<Scalar> {
    let text = text.trim();
    let (number, shift) = SUFFIXES
        .iter()
        .find_map(|&(suffix, shift)| text.strip_suffix(suffix).map(|n| (n, shift)))
        .unwrap_or((text, 0));
    parse_decimal(number, shift)
}

/// Like [`parse_value`], failing with [`NodalError::InvalidValue`].
pub fn require_value(text: &str) -> Result<Scalar> {
    parse_value(text).ok_or_else(|| NodalError::InvalidValue {
        text: text.trim().to_string(),
    })
}

/// `[+-]digits[.digits][e[+-]digits]`, scaled by `10^shift`.
fn parse_decimal(text: &str, shift: i32) -> Option<Scalar> {
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (mantissa, exponent) = match rest.find(|c: char| c == 'e' || c == 'E') {
        Some(i) => (&rest[..i], parse_exponent(&rest[i + 1..])?),
        None => (rest, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }
    if frac_part.len() > MAX_EXPONENT as usize {
        return None;
    }

    let mut digits: BigInt = format!("{int_part}{frac_part}").parse().ok()?;
    if negative {
        digits = -digits;
    }

    let power = exponent + shift - frac_part.len() as i32;
    let ten = BigInt::from(10);
    if power >= 0 {
        Some(Scalar::from_integer(digits * ten.pow(power.unsigned_abs())))
    } else {
        Some(Scalar::new(digits, ten.pow(power.unsigned_abs())))
    }
}

fn parse_exponent(text: &str) -> Option<i32> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude: u32 = digits.parse().ok()?;
    if magnitude > MAX_EXPONENT {
        return None;
    }
    let magnitude = magnitude as i32;
    Some(if negative { -magnitude } else { magnitude })
}
