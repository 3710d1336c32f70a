//! Total coercion of human-formatted magnitudes ("1.2K", "5,000", "10M") into `f64`.
//!
//! `coerce` never fails: anything that cannot be read as a number becomes `0.0`.
//! `coerce_detailed` exposes why a value fell back to the default.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A magnitude as received from a source: native number, display string, or nothing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Magnitude {
    /// Native numeric value.
    Number(f64),
    /// Human-formatted string such as `"1.2K"` or `"5,000"`.
    Text(String),
    /// Missing or null.
    #[default]
    Empty,
}

impl From<f64> for Magnitude {
    fn from(value: f64) -> Self {
        Magnitude::Number(value)
    }
}

impl From<i64> for Magnitude {
    fn from(value: i64) -> Self {
        Magnitude::Number(value as f64)
    }
}

impl From<&str> for Magnitude {
    fn from(value: &str) -> Self {
        Magnitude::Text(value.to_string())
    }
}

impl From<String> for Magnitude {
    fn from(value: String) -> Self {
        Magnitude::Text(value)
    }
}

impl<T: Into<Magnitude>> From<Option<T>> for Magnitude {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Magnitude::Empty)
    }
}

impl From<&Value> for Magnitude {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(number) => number
                .as_f64()
                .map(Magnitude::Number)
                .unwrap_or(Magnitude::Empty),
            Value::String(text) => Magnitude::Text(text.clone()),
            _ => Magnitude::Empty,
        }
    }
}

/// Why a magnitude fell back to `0.0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultReason {
    /// Missing, null, or whitespace-only input.
    Empty,
    /// Residue after suffix handling is not a number.
    Unparsable,
    /// Parsed to infinity or NaN.
    NonFinite,
}

/// Internal two-case coercion outcome.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coerced {
    /// The input was read as a number.
    Parsed(f64),
    /// The input could not be read; the default `0.0` applies.
    Defaulted(DefaultReason),
}

impl Coerced {
    /// Collapse to the outward `f64` contract.
    pub fn value(self) -> f64 {
        match self {
            Coerced::Parsed(value) => value,
            Coerced::Defaulted(_) => 0.0,
        }
    }
}

/// Coerce a magnitude into `f64`, returning `0.0` for anything unreadable.
pub fn coerce(value: &Magnitude) -> f64 {
    coerce_detailed(value).value()
}

/// Coerce a magnitude and report whether the default was used.
pub fn coerce_detailed(value: &Magnitude) -> Coerced {
    match value {
        Magnitude::Number(number) if number.is_finite() => Coerced::Parsed(*number),
        Magnitude::Number(_) => Coerced::Defaulted(DefaultReason::NonFinite),
        Magnitude::Empty => Coerced::Defaulted(DefaultReason::Empty),
        Magnitude::Text(text) => coerce_text(text),
    }
}

fn coerce_text(text: &str) -> Coerced {
    let normalized = text.trim().to_uppercase().replace(',', "");
    // Display counts such as "10K+" carry a trailing plus.
    let normalized = normalized
        .strip_suffix('+')
        .unwrap_or(&normalized)
        .trim_end();
    if normalized.is_empty() {
        return Coerced::Defaulted(DefaultReason::Empty);
    }

    let (digits, multiplier) = split_suffix(normalized);
    match digits.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => {
            let scaled = parsed * multiplier;
            if scaled.is_finite() {
                Coerced::Parsed(scaled)
            } else {
                Coerced::Defaulted(DefaultReason::NonFinite)
            }
        }
        Ok(_) => Coerced::Defaulted(DefaultReason::NonFinite),
        Err(_) => Coerced::Defaulted(DefaultReason::Unparsable),
    }
}

fn split_suffix(normalized: &str) -> (&str, f64) {
    if let Some(rest) = normalized.strip_suffix('K') {
        (rest, 1_000.0)
    } else if let Some(rest) = normalized.strip_suffix('M') {
        (rest, 1_000_000.0)
    } else if let Some(rest) = normalized.strip_suffix('B') {
        (rest, 1_000_000_000.0)
    } else {
        (normalized, 1.0)
    }
}
