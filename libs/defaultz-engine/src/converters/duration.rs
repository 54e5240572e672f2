use defaultz_api::{Conversion, Converter, FieldDescriptor, FieldError, Kind, Scalar, Value};

use super::store;

/// Duration strings such as `"300ms"`, `"1.5h"` or `"1h30m20s999ms"`.
///
/// Registered for the `i64` kind behind [`super::IntConverter`]: a bare
/// number is taken by the integer converter as nanoseconds, anything with a
/// unit falls through to this one. Plain `i64` fields receive nanoseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationConverter;

impl Converter for DurationConverter {
    fn name(&self) -> &str {
        "defaultz.DurationConverter"
    }

    fn kinds(&self) -> &[Kind] {
        &[Kind::I64]
    }

    fn convert(&self, raw: &str, path: &str, field: &FieldDescriptor, target: &mut dyn Value) -> Conversion {
        match parse_duration(raw) {
            Ok(nanos) => store(self, path, field, target, Scalar::Int(nanos)),
            Err(e) => Conversion::failed(
                FieldError::invalid_value(path, field, format!("invalid duration value: {e}")).raised_by(self.name()),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },
    #[error("duration {0:?} out of range")]
    Overflow(String),
}

const UNITS: [(&str, u64); 8] = [
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 3_600 * 1_000_000_000),
];

/// Parses a signed sequence of decimal numbers, each with an optional
/// fraction and a unit, into nanoseconds.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. `"0"` is
/// the only value accepted without a unit.
pub fn parse_duration(input: &str) -> Result<i64, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());
    let overflow = || DurationError::Overflow(input.to_string());

    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    if rest == "0" {
        return Ok(0);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        let int_len = leading_digits(rest);
        let (digits, after) = rest.split_at(int_len);
        let mut value: u64 = if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|_| overflow())?
        };
        rest = after;

        let mut fraction: u64 = 0;
        let mut scale: f64 = 1.0;
        let mut frac_len = 0;
        if let Some(after_dot) = rest.strip_prefix('.') {
            frac_len = leading_digits(after_dot);
            let (digits, after) = after_dot.split_at(frac_len);
            // Digits beyond u64 precision are consumed but ignored.
            for d in digits.bytes() {
                let Some(next) = fraction
                    .checked_mul(10)
                    .and_then(|f| f.checked_add(u64::from(d - b'0')))
                else {
                    break;
                };
                fraction = next;
                scale *= 10.0;
            }
            rest = after;
        }
        if int_len == 0 && frac_len == 0 {
            return Err(invalid());
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, after) = rest.split_at(unit_len);
        rest = after;
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let multiplier = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, multiplier)| *multiplier)
            .ok_or_else(|| DurationError::UnknownUnit {
                unit: unit.to_string(),
                input: input.to_string(),
            })?;

        value = value.checked_mul(multiplier).ok_or_else(overflow)?;
        if fraction > 0 {
            let extra = (fraction as f64 * (multiplier as f64 / scale)) as u64;
            value = value.checked_add(extra).ok_or_else(overflow)?;
        }
        total = total.checked_add(value).ok_or_else(overflow)?;
    }

    if negative {
        if total > 1 << 63 {
            return Err(overflow());
        }
        // 1 << 63 wraps to i64::MIN, which is exactly its negation.
        return Ok((total as i64).wrapping_neg());
    }
    i64::try_from(total).map_err(|_| overflow())
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}
