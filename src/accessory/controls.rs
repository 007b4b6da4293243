// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The set of host controls one accessory exposes.

use crate::host::{ControlDescriptor, ControlId, ControlValue};
use crate::mapping::{DpsMapping, FeatureFlags, step_to_percent};
use crate::preset::PresetSynchronizer;
use crate::state::DeviceState;

/// Host controls of one accessory and how to read them from state.
#[derive(Debug, Clone)]
pub struct Controls {
    name: String,
    mapping: DpsMapping,
    features: FeatureFlags,
    presets: PresetSynchronizer,
}

impl Controls {
    /// Builds the control set for a device.
    #[must_use]
    pub fn new(name: impl Into<String>, mapping: &DpsMapping, features: &FeatureFlags) -> Self {
        Self {
            name: name.into(),
            mapping: mapping.clone(),
            features: *features,
            presets: PresetSynchronizer::new(mapping, features),
        }
    }

    /// Data-point mapping.
    #[must_use]
    pub fn mapping(&self) -> &DpsMapping {
        &self.mapping
    }

    /// Preset families.
    #[must_use]
    pub fn presets(&self) -> &PresetSynchronizer {
        &self.presets
    }

    /// Whether the direction control is exposed.
    #[must_use]
    pub fn direction_enabled(&self) -> bool {
        self.features.direction_active(&self.mapping)
    }

    /// Whether the light control is exposed.
    #[must_use]
    pub fn light_enabled(&self) -> bool {
        self.features.enable_light
    }

    /// Whether the rotation speed control is exposed.
    #[must_use]
    pub fn rotation_speed_enabled(&self) -> bool {
        self.features.enable_rotation_speed
    }

    /// Returns `true` if `id` is exposed.
    #[must_use]
    pub fn is_exposed(&self, id: ControlId) -> bool {
        match id {
            ControlId::FanActive => true,
            ControlId::RotationDirection => self.direction_enabled(),
            ControlId::RotationSpeed => self.rotation_speed_enabled(),
            ControlId::LightOn => self.light_enabled(),
            ControlId::Preset(preset) => self.presets.contains(preset),
            ControlId::LegacyToggle => false,
        }
    }

    /// Controls to register with the host.
    #[must_use]
    pub fn descriptors(&self) -> Vec<ControlDescriptor> {
        let mut descriptors = vec![ControlDescriptor::new(ControlId::FanActive, &self.name)];
        if self.direction_enabled() {
            descriptors.push(ControlDescriptor::new(
                ControlId::RotationDirection,
                format!("{} Direction", self.name),
            ));
        }
        if self.rotation_speed_enabled() {
            descriptors.push(ControlDescriptor::new(
                ControlId::RotationSpeed,
                format!("{} Speed", self.name),
            ));
        }
        if self.light_enabled() {
            descriptors.push(ControlDescriptor::new(
                ControlId::LightOn,
                format!("{} Light", self.name),
            ));
        }
        descriptors.extend(self.presets.descriptors());
        descriptors
    }

    /// Controls a previous configuration may have registered that are no
    /// longer exposed.
    #[must_use]
    pub fn stale(&self) -> Vec<ControlId> {
        let mut stale: Vec<ControlId> = [
            ControlId::LegacyToggle,
            ControlId::RotationDirection,
            ControlId::RotationSpeed,
            ControlId::LightOn,
        ]
        .into_iter()
        .filter(|id| !self.is_exposed(*id))
        .collect();
        stale.extend(self.presets.stale_controls());
        stale
    }

    /// Rotation speed percentage for `state`; `0` while the fan is off.
    #[must_use]
    pub fn rotation_percent(&self, state: &DeviceState) -> u8 {
        if state.fan_active() {
            step_to_percent(state.fan_speed(), self.mapping.speed_range)
        } else {
            0
        }
    }

    /// Reads a control from `state`; `None` if it is not exposed.
    #[must_use]
    pub fn read(&self, id: ControlId, state: &DeviceState) -> Option<ControlValue> {
        if !self.is_exposed(id) {
            return None;
        }
        match id {
            ControlId::FanActive => Some(ControlValue::Bool(state.fan_active())),
            ControlId::RotationDirection => Some(ControlValue::Direction(state.fan_direction())),
            ControlId::RotationSpeed => Some(ControlValue::Percent(self.rotation_percent(state))),
            ControlId::LightOn => Some(ControlValue::Bool(state.light_on())),
            ControlId::Preset(preset) => self.presets.is_on(preset, state).map(ControlValue::Bool),
            ControlId::LegacyToggle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::FeatureOverrides;
    use crate::preset::PresetId;
    use crate::state::StateChange;

    fn controls(overrides: Option<FeatureOverrides>) -> Controls {
        let mapping = DpsMapping::default();
        let features = FeatureFlags::resolve(&mapping, overrides.as_ref());
        Controls::new("Bedroom", &mapping, &features)
    }

    #[test]
    fn default_descriptors() {
        let controls = controls(None);
        let names: Vec<_> = controls.descriptors().into_iter().map(|d| d.name).collect();

        assert_eq!(names[0], "Bedroom");
        assert!(names.contains(&"Bedroom Light".to_string()));
        assert!(names.contains(&"Bedroom Direction".to_string()));
        assert!(!names.contains(&"Bedroom Speed".to_string()));
        // fan + direction + light + 6 speed + 3 temp + 4 timer
        assert_eq!(names.len(), 16);
        assert_eq!(
            controls.stale(),
            vec![ControlId::LegacyToggle, ControlId::RotationSpeed]
        );
    }

    #[test]
    fn disabled_light_is_stale_with_its_presets() {
        let controls = controls(Some(FeatureOverrides {
            enable_light: Some(false),
            ..FeatureOverrides::default()
        }));
        let stale = controls.stale();

        assert!(stale.contains(&ControlId::LightOn));
        assert!(stale.contains(&ControlId::Preset(PresetId::Temp(2))));
        assert!(controls.read(ControlId::LightOn, &DeviceState::new()).is_none());
    }

    #[test]
    fn reads_follow_state() {
        let controls = controls(Some(FeatureOverrides {
            enable_rotation_speed: Some(true),
            ..FeatureOverrides::default()
        }));
        let mut state = DeviceState::new();
        state.apply(&StateChange::FanSpeed(3));

        assert_eq!(
            controls.read(ControlId::RotationSpeed, &state),
            Some(ControlValue::Percent(0))
        );

        state.apply(&StateChange::FanActive(true));
        assert_eq!(
            controls.read(ControlId::RotationSpeed, &state),
            Some(ControlValue::Percent(50))
        );
        assert_eq!(
            controls.read(ControlId::Preset(PresetId::Speed(3)), &state),
            Some(ControlValue::Bool(true))
        );
        assert_eq!(controls.read(ControlId::Preset(PresetId::Speed(9)), &state), None);
    }
}
