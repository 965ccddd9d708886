//! Lenient score and count decoding
//!
//! Results are model output passed through by the backend, so a score may
//! arrive as `78`, `78.5`, `"78"` or `null`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Whole(u64),
    Fraction(f64),
    Text(String),
}

fn round(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.round().min(u32::MAX as f64) as u32
    }
}

/// Round to the nearest whole number; negatives and `null` become 0
pub(crate) fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawNumber>::deserialize(deserializer)? {
        None => Ok(0),
        Some(RawNumber::Whole(n)) => Ok(u32::try_from(n).unwrap_or(u32::MAX)),
        Some(RawNumber::Fraction(f)) => Ok(round(f)),
        Some(RawNumber::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(round)
            .map_err(|_| D::Error::custom(format!("expected a number, got {:?}", s))),
    }
}
