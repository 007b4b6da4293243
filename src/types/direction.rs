// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan rotation direction.

use std::fmt;

use super::DpsValue;

/// Rotation direction of the fan blades.
///
/// Devices report direction in several shapes (`"forward"`/`"reverse"`,
/// booleans, `0`/`1`); [`FanDirection::from_dps`] normalises all of them.
/// Clockwise is the device's forward direction.
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::types::{DpsValue, FanDirection};
///
/// assert_eq!(
///     FanDirection::from_dps(&DpsValue::from("reverse")),
///     FanDirection::CounterClockwise
/// );
/// assert_eq!(FanDirection::Clockwise.as_dps_str(), "forward");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum FanDirection {
    /// Forward rotation.
    #[default]
    Clockwise,
    /// Reverse rotation.
    CounterClockwise,
}

impl FanDirection {
    /// Decodes a raw data-point value.
    ///
    /// Strings `"reverse"` and `"1"` mean reverse, other strings mean
    /// forward. Booleans and numbers are reverse when truthy.
    #[must_use]
    pub fn from_dps(value: &DpsValue) -> Self {
        let reverse = match value {
            DpsValue::Str(s) => s == "reverse" || s == "1",
            other => other.is_truthy(),
        };
        if reverse {
            Self::CounterClockwise
        } else {
            Self::Clockwise
        }
    }

    /// Returns the string written to the device.
    #[must_use]
    pub const fn as_dps_str(&self) -> &'static str {
        match self {
            Self::Clockwise => "forward",
            Self::CounterClockwise => "reverse",
        }
    }
}

impl fmt::Display for FanDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clockwise => write!(f, "CW"),
            Self::CounterClockwise => write!(f, "CCW"),
        }
    }
}
