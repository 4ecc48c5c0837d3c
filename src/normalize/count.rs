/// Parse an engagement counter such as `1.2K`, `3m`, `1,024` or an empty string.
///
/// A trailing `k`/`m` (any case) scales the numeric prefix by one thousand or
/// one million, truncating any remaining fraction. Without a suffix every
/// non-digit is discarded. Anything unparseable counts as zero.
#[must_use]
pub fn parse_count(raw: &str) -> u64 {
    let text = raw.trim().to_lowercase();

    if let Some(prefix) = text.strip_suffix('k') {
        return scale(prefix, 1_000).unwrap_or(0);
    }
    if let Some(prefix) = text.strip_suffix('m') {
        return scale(prefix, 1_000_000).unwrap_or(0);
    }

    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Multiply a decimal string by `multiplier` using integer arithmetic.
fn scale(prefix: &str, multiplier: u64) -> Option<u64> {
    // Icon glyphs may precede the number
    let prefix = prefix
        .trim()
        .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.');
    let (whole, frac) = prefix.split_once('.').unwrap_or((prefix, ""));

    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole_value: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut value = whole_value.checked_mul(multiplier)?;

    let mut place = multiplier;
    for digit in frac.bytes() {
        place /= 10;
        if place == 0 {
            break;
        }
        value = value.checked_add(u64::from(digit - b'0') * place)?;
    }

    Some(value)
}
