use std::time::Duration;

const NANOS_PER: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 3_600 * 1_000_000_000),
];

/// Parse a Go-style duration string (e.g. "24h", "1h30m", "1.5s", "300ms").
///
/// A bare "0" is accepted. Negative durations are rejected.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let orig = s;
    let mut rest = s;

    let negative = if let Some(r) = rest.strip_prefix('-') {
        rest = r;
        true
    } else {
        if let Some(r) = rest.strip_prefix('+') {
            rest = r;
        }
        false
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(format!("invalid duration {:?}", orig));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..digits_end];
        rest = &rest[digits_end..];
        if number.is_empty() || number == "." {
            return Err(format!("invalid duration {:?}", orig));
        }

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];
        if unit.is_empty() {
            return Err(format!("missing unit in duration {:?}", orig));
        }
        let scale = NANOS_PER
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| format!("unknown unit {:?} in duration {:?}", unit, orig))?;

        total = total
            .checked_add(scaled_nanos(number, scale).ok_or_else(|| format!("invalid duration {:?}", orig))?)
            .ok_or_else(|| format!("duration {:?} overflows", orig))?;
    }

    if negative && total != 0 {
        return Err(format!("negative duration {:?} is not allowed", orig));
    }

    let nanos = u64::try_from(total).map_err(|_| format!("duration {:?} overflows", orig))?;
    Ok(Duration::from_nanos(nanos))
}

/// `number` is `<int>[.<frac>]`, either side may be empty but not both.
fn scaled_nanos(
    number: &str,
    scale: u128,
) -> Option<u128> {
    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, f),
        None => (number, ""),
    };
    if frac_part.contains('.') {
        return None;
    }

    let int_value: u128 = if int_part.is_empty() { 0 } else { int_part.parse().ok()? };
    let mut value = int_value.checked_mul(scale)?;

    // Fractional digits beyond nanosecond precision are dropped, as Go does
    let mut divisor: u128 = 1;
    for digit in frac_part.bytes() {
        divisor = divisor.checked_mul(10)?;
        let d = u128::from(digit - b'0');
        value = value.checked_add(d * scale / divisor)?;
    }
    Some(value)
}
