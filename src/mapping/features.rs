// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature flags controlling which host controls a fan exposes.

use serde::{Deserialize, Serialize};

use super::DpsMapping;

/// Which optional controls are exposed to the host.
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::mapping::{DpsMapping, FeatureFlags};
///
/// let mapping = DpsMapping::default();
/// let features = FeatureFlags::resolve(&mapping, None);
///
/// assert!(features.enable_light);
/// assert!(features.enable_direction);
/// assert!(!features.enable_rotation_speed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
// Each flag toggles an independent host control.
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureFlags {
    /// Expose the light on/off control.
    pub enable_light: bool,
    /// Expose the rotation direction control.
    pub enable_direction: bool,
    /// Expose timer preset toggles.
    pub enable_timer_buttons: bool,
    /// Expose colour-temperature preset toggles.
    pub enable_temp_buttons: bool,
    /// Expose a 0-100 % rotation speed control next to the speed presets.
    pub enable_rotation_speed: bool,
}

impl FeatureFlags {
    /// Resolves flags from per-device overrides.
    ///
    /// Direction and timer buttons default to whether their data point is
    /// mapped. Light and temperature buttons default to enabled.
    #[must_use]
    pub fn resolve(mapping: &DpsMapping, overrides: Option<&FeatureOverrides>) -> Self {
        let o = overrides.copied().unwrap_or_default();
        Self {
            enable_light: o.enable_light.unwrap_or(true),
            enable_direction: o
                .enable_direction
                .unwrap_or(mapping.fan_direction.is_some()),
            enable_timer_buttons: o.enable_timer_buttons.unwrap_or(mapping.timer.is_some()),
            enable_temp_buttons: o.enable_temp_buttons.unwrap_or(true),
            enable_rotation_speed: o.enable_rotation_speed.unwrap_or(false),
        }
    }

    /// Whether the direction control is exposed and backed by a data point.
    #[must_use]
    pub fn direction_active(&self, mapping: &DpsMapping) -> bool {
        self.enable_direction && mapping.fan_direction.is_some()
    }

    /// Whether temperature presets are exposed.
    ///
    /// Requires both the temperature-button flag and the light flag.
    #[must_use]
    pub fn temp_buttons_active(&self) -> bool {
        self.enable_temp_buttons && self.enable_light
    }

    /// Whether timer presets are exposed and backed by a data point.
    #[must_use]
    pub fn timer_buttons_active(&self, mapping: &DpsMapping) -> bool {
        self.enable_timer_buttons && mapping.timer.is_some()
    }
}

/// Partial feature flags as written in the platform configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureOverrides {
    /// Override for [`FeatureFlags::enable_light`].
    #[serde(default)]
    pub enable_light: Option<bool>,
    /// Override for [`FeatureFlags::enable_direction`].
    #[serde(default)]
    pub enable_direction: Option<bool>,
    /// Override for [`FeatureFlags::enable_timer_buttons`].
    #[serde(default)]
    pub enable_timer_buttons: Option<bool>,
    /// Override for [`FeatureFlags::enable_temp_buttons`].
    #[serde(default)]
    pub enable_temp_buttons: Option<bool>,
    /// Override for [`FeatureFlags::enable_rotation_speed`].
    #[serde(default)]
    pub enable_rotation_speed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_mapping() {
        let mapping = DpsMapping {
            fan_direction: None,
            timer: None,
            ..DpsMapping::default()
        };
        let flags = FeatureFlags::resolve(&mapping, None);

        assert!(flags.enable_light);
        assert!(flags.enable_temp_buttons);
        assert!(!flags.enable_direction);
        assert!(!flags.enable_timer_buttons);
    }

    #[test]
    fn overrides_win() {
        let overrides: FeatureOverrides =
            serde_json::from_str(r#"{"enableLight": false, "enableRotationSpeed": true}"#)
                .unwrap();
        let flags = FeatureFlags::resolve(&DpsMapping::default(), Some(&overrides));

        assert!(!flags.enable_light);
        assert!(flags.enable_rotation_speed);
        assert!(flags.enable_direction);
    }

    #[test]
    fn temp_buttons_need_light() {
        let overrides = FeatureOverrides {
            enable_light: Some(false),
            ..FeatureOverrides::default()
        };
        let flags = FeatureFlags::resolve(&DpsMapping::default(), Some(&overrides));

        assert!(flags.enable_temp_buttons);
        assert!(!flags.temp_buttons_active());
    }

    #[test]
    fn forced_direction_without_mapping_stays_inactive() {
        let mapping = DpsMapping {
            fan_direction: None,
            ..DpsMapping::default()
        };
        let overrides = FeatureOverrides {
            enable_direction: Some(true),
            ..FeatureOverrides::default()
        };
        let flags = FeatureFlags::resolve(&mapping, Some(&overrides));

        assert!(flags.enable_direction);
        assert!(!flags.direction_active(&mapping));
    }
}
