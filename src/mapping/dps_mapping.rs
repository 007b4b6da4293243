// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data-point mapping for one fan.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValueError;
use crate::types::{DpsId, SpeedRange};

/// Default fan power data point.
pub const DEFAULT_FAN_POWER_DPS: u16 = 60;
/// Default fan speed data point.
pub const DEFAULT_FAN_SPEED_DPS: u16 = 62;
/// Default fan direction data point.
pub const DEFAULT_FAN_DIRECTION_DPS: u16 = 63;
/// Default light power data point.
pub const DEFAULT_LIGHT_POWER_DPS: u16 = 20;
/// Default colour-temperature mode data point.
pub const DEFAULT_LIGHT_TEMP_MODE_DPS: u16 = 23;
/// Default timer data point (minutes remaining).
pub const DEFAULT_TIMER_DPS: u16 = 64;
/// Default colour-temperature values: warm, neutral, cool.
pub const DEFAULT_LIGHT_TEMP_VALUES: [i64; 3] = [0, 500, 1000];
/// Default timer presets in minutes (1h, 2h, 4h, 9h).
pub const DEFAULT_TIMER_VALUES: [u32; 4] = [60, 120, 240, 540];

/// Resolved assignment of data points to fan and light signals.
///
/// Optional data points (direction, colour temperature, timer) disable the
/// corresponding feature when unmapped.
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::mapping::{DpsMapping, DpsMappingOverrides};
///
/// let overrides: DpsMappingOverrides =
///     serde_json::from_str(r#"{"fanSpeedMax": 3, "timerDps": null}"#).unwrap();
/// let mapping = DpsMapping::resolve(Some(&overrides)).unwrap();
///
/// assert_eq!(mapping.speed_range.max(), 3);
/// assert!(mapping.timer.is_none());
/// assert_eq!(mapping.fan_power.value(), 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpsMapping {
    /// Fan on/off.
    pub fan_power: DpsId,
    /// Fan speed step.
    pub fan_speed: DpsId,
    /// Fan rotation direction.
    pub fan_direction: Option<DpsId>,
    /// Allowed fan speed steps.
    pub speed_range: SpeedRange,
    /// Light on/off.
    pub light_power: DpsId,
    /// Colour-temperature mode.
    pub light_temp_mode: Option<DpsId>,
    /// Ordered colour-temperature device values.
    pub light_temp_values: Vec<i64>,
    /// Minutes remaining on the shutoff timer.
    pub timer: Option<DpsId>,
    /// Timer presets in minutes.
    pub timer_values: Vec<u32>,
}

impl Default for DpsMapping {
    fn default() -> Self {
        Self {
            fan_power: DpsId::new(DEFAULT_FAN_POWER_DPS),
            fan_speed: DpsId::new(DEFAULT_FAN_SPEED_DPS),
            fan_direction: Some(DpsId::new(DEFAULT_FAN_DIRECTION_DPS)),
            speed_range: SpeedRange::default(),
            light_power: DpsId::new(DEFAULT_LIGHT_POWER_DPS),
            light_temp_mode: Some(DpsId::new(DEFAULT_LIGHT_TEMP_MODE_DPS)),
            light_temp_values: DEFAULT_LIGHT_TEMP_VALUES.to_vec(),
            timer: Some(DpsId::new(DEFAULT_TIMER_DPS)),
            timer_values: DEFAULT_TIMER_VALUES.to_vec(),
        }
    }
}

impl DpsMapping {
    /// Merges per-device overrides over the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidSpeedRange` if the resulting speed
    /// minimum exceeds the maximum.
    pub fn resolve(overrides: Option<&DpsMappingOverrides>) -> Result<Self, ValueError> {
        let mut mapping = Self::default();
        let Some(o) = overrides else {
            return Ok(mapping);
        };

        if let Some(id) = o.fan_power_dps {
            mapping.fan_power = id;
        }
        if let Some(id) = o.fan_speed_dps {
            mapping.fan_speed = id;
        }
        if let Some(id) = o.fan_direction_dps {
            mapping.fan_direction = id;
        }
        if let Some(id) = o.light_power_dps {
            mapping.light_power = id;
        }
        if let Some(id) = o.light_temp_mode_dps {
            mapping.light_temp_mode = id;
        }
        if let Some(values) = &o.light_temp_values {
            mapping.light_temp_values.clone_from(values);
        }
        if let Some(id) = o.timer_dps {
            mapping.timer = id;
        }
        if let Some(values) = &o.timer_values {
            mapping.timer_values.clone_from(values);
        }

        let min = o.fan_speed_min.unwrap_or(mapping.speed_range.min());
        let max = o.fan_speed_max.unwrap_or(mapping.speed_range.max());
        mapping.speed_range = SpeedRange::new(min, max)?;

        Ok(mapping)
    }
}

/// Partial data-point mapping as written in the platform configuration.
///
/// Absent fields keep their defaults. Optional data points accept an
/// explicit `null` to unmap them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DpsMappingOverrides {
    /// Fan on/off data point.
    #[serde(default)]
    pub fan_power_dps: Option<DpsId>,
    /// Fan speed data point.
    #[serde(default)]
    pub fan_speed_dps: Option<DpsId>,
    /// Fan direction data point (`null` unmaps it).
    #[serde(default, deserialize_with = "explicit_null")]
    pub fan_direction_dps: Option<Option<DpsId>>,
    /// Lowest fan speed step.
    #[serde(default)]
    pub fan_speed_min: Option<u8>,
    /// Highest fan speed step.
    #[serde(default)]
    pub fan_speed_max: Option<u8>,
    /// Light on/off data point.
    #[serde(default)]
    pub light_power_dps: Option<DpsId>,
    /// Colour-temperature data point (`null` unmaps it).
    #[serde(default, deserialize_with = "explicit_null")]
    pub light_temp_mode_dps: Option<Option<DpsId>>,
    /// Ordered colour-temperature device values.
    #[serde(default)]
    pub light_temp_values: Option<Vec<i64>>,
    /// Timer data point (`null` unmaps it).
    #[serde(default, deserialize_with = "explicit_null")]
    pub timer_dps: Option<Option<DpsId>>,
    /// Timer presets in minutes.
    #[serde(default)]
    pub timer_values: Option<Vec<u32>>,
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_create_fan_layout() {
        let mapping = DpsMapping::resolve(None).unwrap();

        assert_eq!(mapping.fan_power, DpsId::new(60));
        assert_eq!(mapping.fan_speed, DpsId::new(62));
        assert_eq!(mapping.fan_direction, Some(DpsId::new(63)));
        assert_eq!(mapping.speed_range, SpeedRange::new(1, 6).unwrap());
        assert_eq!(mapping.light_power, DpsId::new(20));
        assert_eq!(mapping.light_temp_mode, Some(DpsId::new(23)));
        assert_eq!(mapping.light_temp_values, vec![0, 500, 1000]);
        assert_eq!(mapping.timer, Some(DpsId::new(64)));
        assert_eq!(mapping.timer_values, vec![60, 120, 240, 540]);
    }

    #[test]
    fn overrides_merge_field_by_field() {
        let overrides: DpsMappingOverrides = serde_json::from_str(
            r#"{"fanSpeedDps": 3, "fanSpeedMin": 1, "fanSpeedMax": 4, "timerValues": [30, 90]}"#,
        )
        .unwrap();
        let mapping = DpsMapping::resolve(Some(&overrides)).unwrap();

        assert_eq!(mapping.fan_speed, DpsId::new(3));
        assert_eq!(mapping.speed_range.max(), 4);
        assert_eq!(mapping.timer_values, vec![30, 90]);
        // Untouched fields keep defaults
        assert_eq!(mapping.fan_power, DpsId::new(60));
        assert_eq!(mapping.fan_direction, Some(DpsId::new(63)));
    }

    #[test]
    fn explicit_null_unmaps_optional_points() {
        let overrides: DpsMappingOverrides =
            serde_json::from_str(r#"{"fanDirectionDps": null, "lightTempModeDps": null}"#)
                .unwrap();
        let mapping = DpsMapping::resolve(Some(&overrides)).unwrap();

        assert!(mapping.fan_direction.is_none());
        assert!(mapping.light_temp_mode.is_none());
        assert_eq!(mapping.timer, Some(DpsId::new(64)));
    }

    #[test]
    fn inverted_speed_range_is_rejected() {
        let overrides = DpsMappingOverrides {
            fan_speed_min: Some(7),
            ..DpsMappingOverrides::default()
        };
        assert_eq!(
            DpsMapping::resolve(Some(&overrides)),
            Err(ValueError::InvalidSpeedRange { min: 7, max: 6 })
        );
    }
}
