//! Compound duration literals: `300ms`, `1h30m`, `1.5s`, `2h45m10.5s`.
//!
//! A literal is an optional sign followed by one or more `<number><unit>`
//! pairs. The number may carry a decimal fraction. Valid units are `ns`,
//! `us` (or `µs`/`μs`), `ms`, `s`, `m` and `h`. The bare literal `0` needs no
//! unit. `std::time::Duration` is unsigned, so a negative non-zero literal is
//! rejected.

use std::time::Duration;

const NANOS_PER_UNIT: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 3_600 * 1_000_000_000),
];

/// Parse a compound duration literal.
///
/// The error is a short reason, suitable for embedding after the literal.
pub fn parse_duration(literal: &str) -> Result<Duration, String> {
    let (negative, mut rest) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err("invalid duration".into());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (int_part, frac_part, after_number) = split_number(rest)?;
        let unit_len = after_number
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_number.len());
        let unit = &after_number[..unit_len];
        if unit.is_empty() {
            return Err("missing unit in duration".into());
        }
        let scale = NANOS_PER_UNIT
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| format!("unknown unit \"{unit}\" in duration"))?;

        total = int_part
            .checked_mul(scale)
            .and_then(|v| v.checked_add(fraction_nanos(frac_part, scale)))
            .and_then(|v| total.checked_add(v))
            .ok_or("duration out of range")?;
        rest = &after_number[unit_len..];
    }

    if negative && total != 0 {
        return Err("negative durations are not supported".into());
    }
    let nanos = u64::try_from(total).map_err(|_| "duration out of range".to_string())?;
    Ok(Duration::from_nanos(nanos))
}

/// Split a leading `digits[.digits]` off `s`. At least one digit is required
/// on one side of the dot.
fn split_number(s: &str) -> Result<(u128, &str, &str), String> {
    let int_len = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let int_digits = &s[..int_len];
    let mut after = &s[int_len..];

    let mut frac_digits = "";
    if let Some(stripped) = after.strip_prefix('.') {
        let frac_len = stripped
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(stripped.len());
        frac_digits = &stripped[..frac_len];
        after = &stripped[frac_len..];
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return Err("invalid duration".into());
    }

    let int_value = if int_digits.is_empty() {
        0
    } else {
        int_digits
            .parse::<u128>()
            .map_err(|_| "duration out of range".to_string())?
    };
    Ok((int_value, frac_digits, after))
}

fn fraction_nanos(digits: &str, scale: u128) -> u128 {
    // Digits beyond nanosecond precision of the largest unit cannot matter.
    let digits = &digits[..digits.len().min(18)];
    if digits.is_empty() {
        return 0;
    }
    let numerator: u128 = digits.parse().unwrap_or(0);
    numerator * scale / 10u128.pow(digits.len() as u32)
}
