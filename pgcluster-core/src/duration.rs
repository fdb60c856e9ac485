//! Unit-suffixed elapsed-time values
//!
//! Durations travel on the wire as strings such as `5s`, `100ms` or `1h30m`
//! rather than raw nanosecond counts. [`Duration`] is signed so that a
//! negative value in a stored blob can be decoded and then rejected by
//! validation instead of failing as a type error.
//!
//! Encoding picks the largest unit that divides the value evenly, so the
//! output is always a single `<integer><unit>` segment and decodes back to
//! exactly the same value.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DurationError;

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

// Largest first; encoding takes the first unit that divides evenly.
const ENCODE_UNITS: [(&str, u64); 6] = [
    ("h", HOUR),
    ("m", MINUTE),
    ("s", SECOND),
    ("ms", MILLISECOND),
    ("us", MICROSECOND),
    ("ns", NANOSECOND),
];

// Fraction digits beyond this are dropped; they are below nanosecond
// resolution for every unit.
const MAX_FRACTION_DIGITS: u32 = 18;

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Signed elapsed time with nanosecond precision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    nanos: i64,
}

impl Duration {
    pub const ZERO: Duration = Duration { nanos: 0 };

    pub const fn from_nanos(nanos: i64) -> Self {
        Duration { nanos }
    }

    pub const fn from_micros(micros: i64) -> Self {
        Duration::from_nanos(micros.saturating_mul(MICROSECOND as i64))
    }

    pub const fn from_millis(millis: i64) -> Self {
        Duration::from_nanos(millis.saturating_mul(MILLISECOND as i64))
    }

    pub const fn from_secs(secs: i64) -> Self {
        Duration::from_nanos(secs.saturating_mul(SECOND as i64))
    }

    pub const fn from_mins(mins: i64) -> Self {
        Duration::from_nanos(mins.saturating_mul(MINUTE as i64))
    }

    pub const fn from_hours(hours: i64) -> Self {
        Duration::from_nanos(hours.saturating_mul(HOUR as i64))
    }

    pub const fn as_nanos(&self) -> i64 {
        self.nanos
    }

    pub const fn is_negative(&self) -> bool {
        self.nanos < 0
    }

    pub const fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    /// Convert to a `std::time::Duration`, saturating negative values at zero
    pub fn to_std(&self) -> std::time::Duration {
        std::time::Duration::from_nanos(self.nanos.max(0) as u64)
    }

    /// Parse a duration such as `300ms`, `-1.5h` or `2h45m`
    ///
    /// The input is an optional sign followed by one or more
    /// `<number><unit>` segments whose values are summed. A number is a run of
    /// digits with an optional decimal fraction. Valid units are `ns`, `us`
    /// (or `µs`), `ms`, `s`, `m` and `h`. Every segment needs a unit, so a
    /// bare `0` is rejected.
    pub fn parse(input: &str) -> Result<Self, DurationError> {
        let (negative, mut rest) = match input.as_bytes().first() {
            Some(b'-') => (true, &input[1..]),
            Some(b'+') => (false, &input[1..]),
            _ => (false, input),
        };
        if rest.is_empty() {
            return Err(DurationError::Empty {
                input: input.to_string(),
            });
        }

        let limit = if negative {
            i64::MAX as u128 + 1
        } else {
            i64::MAX as u128
        };
        let overflow = || DurationError::Overflow {
            input: input.to_string(),
        };

        let mut total: u128 = 0;
        while !rest.is_empty() {
            let number = parse_number(rest).ok_or_else(|| DurationError::InvalidNumber {
                input: input.to_string(),
            })?;
            let remaining = &rest[number.len..];

            let unit_len = remaining
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(remaining.len());
            let (unit, tail) = remaining.split_at(unit_len);
            if unit.is_empty() {
                return Err(DurationError::MissingUnit {
                    input: input.to_string(),
                });
            }
            let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
                input: input.to_string(),
                unit: unit.to_string(),
            })? as u128;

            let whole = number.whole.checked_mul(scale).ok_or_else(overflow)?;
            let fraction = number.fraction * scale / number.fraction_scale;
            total = total
                .checked_add(whole)
                .and_then(|t| t.checked_add(fraction))
                .filter(|t| *t <= limit)
                .ok_or_else(overflow)?;

            rest = tail;
        }

        let signed = if negative {
            -(total as i128)
        } else {
            total as i128
        };
        Ok(Duration::from_nanos(signed as i64))
    }
}

struct Number {
    whole: u128,
    fraction: u128,
    fraction_scale: u128,
    // Bytes consumed from the input
    len: usize,
}

fn parse_number(text: &str) -> Option<Number> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    let mut whole: u128 = 0;
    let mut digits = 0;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        // Saturate so an absurd digit run surfaces as an overflow later
        whole = whole
            .saturating_mul(10)
            .saturating_add(u128::from(bytes[pos] - b'0'));
        digits += 1;
        pos += 1;
    }

    let mut fraction: u128 = 0;
    let mut fraction_scale: u128 = 1;
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        let mut kept = 0;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            if kept < MAX_FRACTION_DIGITS {
                fraction = fraction * 10 + u128::from(bytes[pos] - b'0');
                fraction_scale *= 10;
                kept += 1;
            }
            digits += 1;
            pos += 1;
        }
    }

    (digits > 0).then_some(Number {
        whole,
        fraction,
        fraction_scale,
        len: pos,
    })
}

impl FromStr for Duration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Duration::parse(s)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nanos == 0 {
            return f.write_str("0s");
        }
        let magnitude = self.nanos.unsigned_abs();
        let (suffix, unit) = ENCODE_UNITS
            .iter()
            .copied()
            .find(|(_, unit)| magnitude % unit == 0)
            .unwrap_or(("ns", NANOSECOND));
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}{}{}", sign, magnitude / unit, suffix)
    }
}

impl TryFrom<std::time::Duration> for Duration {
    type Error = DurationError;

    fn try_from(value: std::time::Duration) -> Result<Self, Self::Error> {
        i64::try_from(value.as_nanos())
            .map(Duration::from_nanos)
            .map_err(|_| DurationError::Overflow {
                input: format!("{:?}", value),
            })
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct DurationVisitor;

impl<'de> Visitor<'de> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a duration string with a unit suffix, e.g. \"5s\"")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Duration, E> {
        Duration::parse(value).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(DurationVisitor)
    }
}

/// Serde adapter for `std::time::Duration` fields using the same textual form
///
/// ```rust
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Timeouts {
///     #[serde(with = "pgcluster_core::duration::serde_std")]
///     request: std::time::Duration,
/// }
///
/// let json = serde_json::to_string(&Timeouts { request: std::time::Duration::from_millis(1500) }).unwrap();
/// assert_eq!(json, r#"{"request":"1500ms"}"#);
/// ```
pub mod serde_std {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};

    use super::Duration;

    pub fn serialize<S: Serializer>(
        value: &std::time::Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let duration = Duration::try_from(*value).map_err(ser::Error::custom)?;
        serializer.collect_str(&duration)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<std::time::Duration, D::Error> {
        let duration = Duration::deserialize(deserializer)?;
        if duration.is_negative() {
            return Err(de::Error::custom(format!(
                "duration {} must not be negative",
                duration
            )));
        }
        Ok(duration.to_std())
    }
}
