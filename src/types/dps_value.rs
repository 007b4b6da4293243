// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw data-point identifiers and values.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier of a device data point.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DpsId(u16);

impl DpsId {
    /// Creates a data-point identifier.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Returns the numeric identifier.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Returns the key the device uses for this data point in a DPS bag.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for DpsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for DpsId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

/// A loosely typed value carried by one data point.
///
/// The device protocol is JSON based, so values arrive as booleans,
/// integers, floats or strings depending on the firmware.
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::types::DpsValue;
///
/// let value: DpsValue = serde_json::from_str("500").unwrap();
/// assert_eq!(value.as_i64(), Some(500));
///
/// let value: DpsValue = serde_json::from_str("true").unwrap();
/// assert!(value.is_truthy());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DpsValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    Str(String),
}

impl DpsValue {
    /// Truthiness of the value as devices use it for on/off points.
    ///
    /// Numbers are true when non-zero. Strings are true for `"true"`,
    /// `"on"` and `"1"` (case-insensitive).
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => matches!(s.to_lowercase().as_str(), "true" | "on" | "1"),
        }
    }

    /// Numeric interpretation of the value, if it has one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(n) => Some(*n),
            // `as` saturates out-of-range floats.
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(f) if f.is_finite() => Some(f.round() as i64),
            Self::Float(_) => None,
            Self::Str(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for DpsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for DpsValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for DpsValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u8> for DpsValue {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for DpsValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for DpsValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

/// A bag of raw data-point values keyed by stringified data-point id.
///
/// This is the shape the device sends in `data` and `refresh` events.
pub type DpsBag = HashMap<String, DpsValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_mixed_bag() {
        let bag: DpsBag =
            serde_json::from_str(r#"{"20":true,"62":3,"63":"reverse","23":500.0}"#).unwrap();

        assert_eq!(bag.get("20"), Some(&DpsValue::Bool(true)));
        assert_eq!(bag.get("62"), Some(&DpsValue::Int(3)));
        assert_eq!(bag.get("63"), Some(&DpsValue::Str("reverse".to_string())));
        assert_eq!(bag.get("23").and_then(DpsValue::as_i64), Some(500));
    }

    #[test]
    fn truthiness() {
        assert!(DpsValue::Bool(true).is_truthy());
        assert!(!DpsValue::Int(0).is_truthy());
        assert!(DpsValue::Int(2).is_truthy());
        assert!(DpsValue::from("ON").is_truthy());
        assert!(!DpsValue::from("false").is_truthy());
    }

    #[test]
    fn numeric_interpretation() {
        assert_eq!(DpsValue::from("120").as_i64(), Some(120));
        assert_eq!(DpsValue::Bool(true).as_i64(), Some(1));
        assert_eq!(DpsValue::from("warm").as_i64(), None);
        assert_eq!(DpsValue::Float(f64::NAN).as_i64(), None);
    }

    #[test]
    fn dps_id_key() {
        assert_eq!(DpsId::new(62).key(), "62");
        assert_eq!(DpsId::from(20).to_string(), "20");
    }

    #[test]
    fn serializes_untagged() {
        assert_eq!(serde_json::to_string(&DpsValue::from(4u8)).unwrap(), "4");
        assert_eq!(
            serde_json::to_string(&DpsValue::from("forward")).unwrap(),
            "\"forward\""
        );
    }
}
