// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding of raw data-point bags into typed signals.

use crate::mapping::{DpsMapping, resolve_temp_index};
use crate::types::{DpsBag, DpsId, DpsValue, FanDirection};

use super::StateChange;

/// A colour-temperature reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightTemp {
    /// Value as reported by the device.
    pub raw: i64,
    /// Position of `raw` in the configured list, if it is listed.
    pub index: Option<usize>,
}

/// Signals decoded from one data-point bag.
///
/// Each field is `Some` only when the bag carried that data point and the
/// value could be interpreted. Unmapped optional data points are never
/// decoded.
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::mapping::DpsMapping;
/// use ceilfan_bridge::state::DpsUpdate;
/// use ceilfan_bridge::types::{DpsBag, FanDirection};
///
/// let bag: DpsBag = serde_json::from_str(r#"{"60":true,"62":"4","63":"reverse"}"#).unwrap();
/// let update = DpsUpdate::decode(&bag, &DpsMapping::default());
///
/// assert_eq!(update.fan_active, Some(true));
/// assert_eq!(update.fan_speed, Some(4));
/// assert_eq!(update.fan_direction, Some(FanDirection::CounterClockwise));
/// assert_eq!(update.light_on, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DpsUpdate {
    /// Fan power.
    pub fan_active: Option<bool>,
    /// Fan speed step, clamped to the configured range.
    pub fan_speed: Option<u8>,
    /// Rotation direction.
    pub fan_direction: Option<FanDirection>,
    /// Light power.
    pub light_on: Option<bool>,
    /// Colour temperature.
    pub light_temp: Option<LightTemp>,
    /// Minutes remaining on the timer.
    pub timer_minutes: Option<u32>,
}

impl DpsUpdate {
    /// Decodes the signals in `bag` according to `mapping`.
    #[must_use]
    pub fn decode(bag: &DpsBag, mapping: &DpsMapping) -> Self {
        let get = |id: DpsId| bag.get(&id.key());
        let get_opt = |id: Option<DpsId>| id.and_then(get);

        let range = mapping.speed_range;
        Self {
            fan_active: get(mapping.fan_power).map(DpsValue::is_truthy),
            fan_speed: get(mapping.fan_speed)
                .and_then(DpsValue::as_i64)
                .and_then(|n| {
                    u8::try_from(n.clamp(i64::from(range.min()), i64::from(range.max()))).ok()
                }),
            fan_direction: get_opt(mapping.fan_direction).map(FanDirection::from_dps),
            light_on: get(mapping.light_power).map(DpsValue::is_truthy),
            light_temp: get_opt(mapping.light_temp_mode)
                .and_then(DpsValue::as_i64)
                .map(|raw| LightTemp {
                    raw,
                    index: resolve_temp_index(raw, &mapping.light_temp_values),
                }),
            timer_minutes: get_opt(mapping.timer)
                .and_then(DpsValue::as_i64)
                .and_then(|n| u32::try_from(n.max(0)).ok()),
        }
    }

    /// Returns `true` if no known signal was decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Converts the decoded signals into state changes.
    ///
    /// A temperature value missing from the configured list produces no
    /// change, leaving the cached index as it was.
    #[must_use]
    pub fn to_state_changes(&self) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if let Some(active) = self.fan_active {
            changes.push(StateChange::FanActive(active));
        }
        if let Some(speed) = self.fan_speed {
            changes.push(StateChange::FanSpeed(speed));
        }
        if let Some(direction) = self.fan_direction {
            changes.push(StateChange::FanDirection(direction));
        }
        if let Some(on) = self.light_on {
            changes.push(StateChange::LightOn(on));
        }
        if let Some(index) = self.light_temp.and_then(|t| t.index) {
            changes.push(StateChange::TempIndex(index));
        }
        if let Some(minutes) = self.timer_minutes {
            changes.push(StateChange::TimerMinutes(minutes));
        }

        changes
    }
}
