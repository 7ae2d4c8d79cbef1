//! Compound duration literals such as `1h30m`, `500ms` or `1.5s`.
//!
//! The grammar is a sequence of `<decimal><unit>` pairs, with units `ns`,
//! `us` (or `µs`), `ms`, `s`, `m` and `h`. The bare literal `0` is also
//! accepted. Durations are unsigned, so a leading `-` is rejected.

use std::time::Duration;

use crate::error::ValueError;

const EXPECTED: &str = "duration";

/// Parse a compound duration literal.
pub fn parse_duration(text: &str) -> Result<Duration, ValueError> {
    let err = || ValueError::new(EXPECTED, text);

    let mut rest = text.strip_prefix('+').unwrap_or(text);
    if rest.starts_with('-') {
        return Err(err().with_detail("negative durations are not supported"));
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(err());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_part, after_int) = rest.split_at(int_len);

        let (frac_part, after_num) = match after_int.strip_prefix('.') {
            Some(tail) => {
                let frac_len = tail.bytes().take_while(u8::is_ascii_digit).count();
                tail.split_at(frac_len)
            }
            None => ("", after_int),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }

        let unit_len = after_num
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() || *c == '.')
            .map(|(i, _)| i)
            .unwrap_or(after_num.len());
        let (unit, tail) = after_num.split_at(unit_len);
        if unit.is_empty() {
            return Err(err().with_detail("missing unit"));
        }
        let scale = unit_nanos(unit)
            .ok_or_else(|| err().with_detail(format!("unknown unit {unit}")))?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| err())?
        };
        total = whole
            .checked_mul(scale)
            .and_then(|n| total.checked_add(n))
            .ok_or_else(|| err().with_detail("overflow"))?;

        // Digits beyond nanosecond precision of the largest unit cannot matter.
        let frac_digits = &frac_part[..frac_part.len().min(18)];
        if !frac_digits.is_empty() {
            let frac: u128 = frac_digits.parse().map_err(|_| err())?;
            let divisor = 10u128.pow(frac_digits.len() as u32);
            total = total
                .checked_add(frac * scale / divisor)
                .ok_or_else(|| err().with_detail("overflow"))?;
        }

        rest = tail;
    }

    let nanos = u64::try_from(total).map_err(|_| err().with_detail("overflow"))?;
    Ok(Duration::from_nanos(nanos))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    })
}

/// Render a duration in the canonical compound form, e.g. `1h30m0s`.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", decimal(nanos / 1_000, nanos % 1_000, 3));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", decimal(nanos / 1_000_000, nanos % 1_000_000, 6));
    }

    let secs = d.as_secs();
    let (h, m, s) = (secs / 3_600, (secs % 3_600) / 60, secs % 60);
    let mut out = String::new();
    if h > 0 {
        out.push_str(&format!("{h}h"));
    }
    if h > 0 || m > 0 {
        out.push_str(&format!("{m}m"));
    }
    out.push_str(&decimal(u128::from(s), u128::from(d.subsec_nanos()), 9));
    out.push('s');
    out
}

fn decimal(whole: u128, rem: u128, digits: usize) -> String {
    if rem == 0 {
        return whole.to_string();
    }
    let frac = format!("{rem:0digits$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}
