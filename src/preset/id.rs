// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Preset toggle identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

const TEMP_LABELS: [&str; 3] = ["Warm", "Neutral", "Cool"];

/// Which family a preset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PresetFamily {
    /// One toggle per fan speed step.
    Speed,
    /// One toggle per colour-temperature value.
    Temp,
    /// One toggle per timer duration.
    Timer,
}

/// A preset toggle, bound to one discrete value.
///
/// The [`Display`](fmt::Display) form is the stable subtype the host uses
/// to recognise the control across restarts.
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::preset::PresetId;
///
/// assert_eq!(PresetId::Speed(3).to_string(), "speed-preset-3");
/// assert_eq!(PresetId::Temp(0).label(), "Warm");
/// assert_eq!(PresetId::Timer(120).label(), "Timer 2h");
/// assert_eq!(PresetId::Timer(30).label(), "Timer 30m");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PresetId {
    /// Fan speed step.
    Speed(u8),
    /// Index into the colour-temperature list.
    Temp(usize),
    /// Timer duration in minutes.
    Timer(u32),
}

impl PresetId {
    /// Family this preset belongs to.
    #[must_use]
    pub fn family(&self) -> PresetFamily {
        match self {
            Self::Speed(_) => PresetFamily::Speed,
            Self::Temp(_) => PresetFamily::Temp,
            Self::Timer(_) => PresetFamily::Timer,
        }
    }

    /// Human readable name.
    #[must_use]
    pub fn label(&self) -> String {
        match *self {
            Self::Speed(step) => format!("Speed {step}"),
            Self::Temp(index) => TEMP_LABELS
                .get(index)
                .map_or_else(|| format!("Temp {}", index.saturating_add(1)), ToString::to_string),
            Self::Timer(minutes) if minutes >= 60 => {
                format!("Timer {}h", minutes / 60 + u32::from(minutes % 60 >= 30))
            }
            Self::Timer(minutes) => format!("Timer {minutes}m"),
        }
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Speed(step) => write!(f, "speed-preset-{step}"),
            Self::Temp(index) => write!(f, "temp-preset-{index}"),
            Self::Timer(minutes) => write!(f, "timer-preset-{minutes}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtypes() {
        assert_eq!(PresetId::Speed(1).to_string(), "speed-preset-1");
        assert_eq!(PresetId::Temp(2).to_string(), "temp-preset-2");
        assert_eq!(PresetId::Timer(540).to_string(), "timer-preset-540");
    }

    #[test]
    fn temp_labels_fall_back_to_index() {
        assert_eq!(PresetId::Temp(1).label(), "Neutral");
        assert_eq!(PresetId::Temp(2).label(), "Cool");
        assert_eq!(PresetId::Temp(3).label(), "Temp 4");
    }

    #[test]
    fn timer_labels_round_to_hours() {
        assert_eq!(PresetId::Timer(60).label(), "Timer 1h");
        assert_eq!(PresetId::Timer(90).label(), "Timer 2h");
        assert_eq!(PresetId::Timer(540).label(), "Timer 9h");
        assert_eq!(PresetId::Timer(59).label(), "Timer 59m");
        assert_eq!(PresetId::Timer(u32::MAX).label(), "Timer 71582788h");
    }

    #[test]
    fn families() {
        assert_eq!(PresetId::Speed(1).family(), PresetFamily::Speed);
        assert_eq!(PresetId::Temp(0).family(), PresetFamily::Temp);
        assert_eq!(PresetId::Timer(60).family(), PresetFamily::Timer);
    }
}
