//! Reading quantities typed into a text field.

/// Parse the leading integer of a typed quantity.
///
/// Leading whitespace and a single sign are accepted, then digits are read
/// until the first non-digit (`"12 pcs"` is 12, `"7.9"` is 7). Returns `None`
/// when no digit is found or the value does not fit an `i64`; callers treat
/// that as "ignore this keystroke".
#[must_use]
pub fn parse_quantity(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, trimmed.get(1..)?),
        Some(b'+') => (false, trimmed.get(1..)?),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = rest.get(..digits_end)?;
    if digits.is_empty() {
        return None;
    }

    let value = digits.parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}
