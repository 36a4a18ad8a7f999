use std::fmt::Display;
use std::str::FromStr;

use hardcase_core::{HardnessError, HardnessResult};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};

/// Measure-specific configuration, e.g. `{"n_neighbors": 5}`.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Deserialize a measure's settings struct from its parameters.
///
/// Settings structs deny unknown fields, so a misspelled key is an error naming
/// the measure rather than a silently ignored option.
pub fn parse_settings<T: DeserializeOwned>(measure: &str, params: &Params) -> HardnessResult<T> {
    serde_json::from_value(serde_json::Value::Object(params.clone())).map_err(|e| {
        HardnessError::InvalidParameter {
            measure: measure.to_string(),
            reason: e.to_string(),
        }
    })
}

pub(crate) fn invalid(measure: &str, reason: impl Into<String>) -> HardnessError {
    HardnessError::InvalidParameter {
        measure: measure.to_string(),
        reason: reason.into(),
    }
}

/// A number as it may appear in configuration: a JSON number or a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Integer(u64),
    Float(f64),
    Text(String),
}

/// Accepts `0.5` as well as `"0.5"`.
pub(crate) fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Lenient::deserialize(deserializer)? {
        Lenient::Integer(v) => Ok(v as f64),
        Lenient::Float(v) => Ok(v),
        Lenient::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("expected a number, got '{s}'"))),
    }
}

/// Accepts `5`, `5.0` and `"5"`; rejects negative or fractional values.
pub(crate) fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let as_whole = |v: f64| {
        if v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
            Ok(v as u64)
        } else {
            Err(D::Error::custom(format!(
                "expected a non-negative integer, got {v}"
            )))
        }
    };
    match Lenient::deserialize(deserializer)? {
        Lenient::Integer(v) => Ok(v),
        Lenient::Float(v) => as_whole(v),
        Lenient::Text(s) => match s.trim().parse::<u64>() {
            Ok(v) => Ok(v),
            Err(_) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("expected an integer, got '{s}'")))
                .and_then(as_whole),
        },
    }
}

pub(crate) fn lenient_usize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let v = lenient_u64(deserializer)?;
    usize::try_from(v).map_err(|_| D::Error::custom(format!("{v} is too large")))
}

/// Deserialize any `FromStr` type from a string.
pub(crate) fn from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<T>().map_err(D::Error::custom)
}
