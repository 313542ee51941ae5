//! Conversions between numbers and single-character notation symbols.

use crate::error::{Result, SiteswapError};

/// Highest height that has a single-character symbol (`z`).
pub const MAX_SYMBOL_HEIGHT: i64 = 35;

/// Offset a base letter, e.g. `to_letter(14, 'A') == 'O'`.
pub fn to_letter(n: usize, base: char) -> char {
    char::from_u32(base as u32 + n as u32).unwrap_or(base)
}

/// Inverse of [`to_letter`].
pub fn from_letter(letter: char, base: char) -> usize {
    (letter as u32).saturating_sub(base as u32) as usize
}

/// Encode a whole height as `0-9` or `a-z`.
pub fn int_to_ss(n: i64) -> Result<char> {
    match n {
        0..=9 => Ok(char::from(b'0' + n as u8)),
        10..=MAX_SYMBOL_HEIGHT => Ok(to_letter((n - 10) as usize, 'a')),
        _ => Err(SiteswapError::HeightOutOfRange(n as f64)),
    }
}

/// Encode a height with up to two decimal places, e.g. `10.333 -> "a.33"`.
pub fn float_to_ss(n: f64) -> Result<String> {
    if !n.is_finite() || n < 0.0 {
        return Err(SiteswapError::HeightOutOfRange(n));
    }
    let whole = n.floor();
    let hundredths = ((n - whole) * 100.0).round() as i64;
    if hundredths == 100 {
        // Rounded up, e.g. 4.999
        return int_to_ss(whole as i64 + 1).map(String::from);
    }
    let mut out = String::from(int_to_ss(whole as i64)?);
    if hundredths > 0 {
        let digits = format!("{:02}", hundredths);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    Ok(out)
}

/// Decode a single height symbol.
pub fn ss_to_int(ss: &str) -> Result<i64> {
    let mut chars = ss.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ '0'..='9'), None) => Ok(c as i64 - '0' as i64),
        (Some(c @ 'a'..='z'), None) => Ok(from_letter(c, 'a') as i64 + 10),
        _ => Err(SiteswapError::UnknownThrow(ss.to_string())),
    }
}

/// Decode a height symbol optionally followed by `.digits`.
pub fn ss_to_float(ss: &str) -> Result<f64> {
    let unknown = || SiteswapError::UnknownThrow(ss.to_string());
    let first = ss.chars().next().ok_or_else(unknown)?;
    let (head, rest) = ss.split_at(first.len_utf8());
    let whole = ss_to_int(head)? as f64;
    if rest.is_empty() {
        return Ok(whole);
    }
    let digits = rest.strip_prefix('.').ok_or_else(unknown)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unknown());
    }
    let fraction: f64 = format!("0.{}", digits).parse().map_err(|_| unknown())?;
    Ok(whole + fraction)
}
