// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Preset toggle state derivation and toggle handling.

use crate::host::{ControlDescriptor, ControlId};
use crate::mapping::{DpsMapping, FeatureFlags};
use crate::state::{DeviceState, StateChange};
use crate::transport::DpsCommand;

use super::{PresetFamily, PresetId};

/// Number of temperature presets older configurations always created.
const LEGACY_TEMP_PRESETS: usize = 3;

/// What a toggle asks the accessory to do.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PresetEffect {
    /// Optimistic cache updates, in order.
    pub changes: Vec<StateChange>,
    /// Device writes, in order.
    pub commands: Vec<DpsCommand>,
}

impl PresetEffect {
    fn push(&mut self, change: StateChange, command: Option<DpsCommand>) {
        self.changes.push(change);
        self.commands.extend(command);
    }
}

/// Derives preset toggle states from the cache and turns toggles into
/// device commands.
///
/// Within each family at most one toggle reports on:
///
/// - speed `n` is on iff the fan is active at step `n`
/// - temperature `i` is on iff the light is on with temperature index `i`
/// - timer `m` is on iff exactly `m` minutes remain
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::mapping::{DpsMapping, FeatureFlags};
/// use ceilfan_bridge::preset::{PresetId, PresetSynchronizer};
/// use ceilfan_bridge::state::DeviceState;
///
/// let mapping = DpsMapping::default();
/// let features = FeatureFlags::resolve(&mapping, None);
/// let presets = PresetSynchronizer::new(&mapping, &features);
///
/// let mut state = DeviceState::new();
/// let effect = presets.toggle(PresetId::Speed(4), true, &state).unwrap();
/// for change in &effect.changes {
///     state.apply(change);
/// }
///
/// assert!(state.fan_active());
/// assert_eq!(presets.is_on(PresetId::Speed(4), &state), Some(true));
/// assert_eq!(presets.is_on(PresetId::Speed(3), &state), Some(false));
/// ```
#[derive(Debug, Clone)]
pub struct PresetSynchronizer {
    mapping: DpsMapping,
    speed: Vec<PresetId>,
    temp: Vec<PresetId>,
    timer: Vec<PresetId>,
    stale: Vec<PresetId>,
}

impl PresetSynchronizer {
    /// Builds the preset families enabled by `features`.
    #[must_use]
    pub fn new(mapping: &DpsMapping, features: &FeatureFlags) -> Self {
        let speed = mapping.speed_range.steps().map(PresetId::Speed).collect();

        let mut stale = Vec::new();

        let temp_ids = (0..mapping.light_temp_values.len()).map(PresetId::Temp);
        let temp = if features.temp_buttons_active() {
            temp_ids.collect()
        } else {
            let count = mapping.light_temp_values.len().max(LEGACY_TEMP_PRESETS);
            stale.extend((0..count).map(PresetId::Temp));
            Vec::new()
        };

        let timer_ids = mapping.timer_values.iter().copied().map(PresetId::Timer);
        let timer = if features.timer_buttons_active(mapping) {
            timer_ids.collect()
        } else {
            stale.extend(timer_ids);
            Vec::new()
        };

        Self {
            mapping: mapping.clone(),
            speed,
            temp,
            timer,
            stale,
        }
    }

    /// Presets of one family, in display order.
    #[must_use]
    pub fn family(&self, family: PresetFamily) -> &[PresetId] {
        match family {
            PresetFamily::Speed => &self.speed,
            PresetFamily::Temp => &self.temp,
            PresetFamily::Timer => &self.timer,
        }
    }

    /// Every exposed preset.
    pub fn presets(&self) -> impl Iterator<Item = PresetId> + '_ {
        self.speed
            .iter()
            .chain(&self.temp)
            .chain(&self.timer)
            .copied()
    }

    /// Returns `true` if `id` is exposed.
    #[must_use]
    pub fn contains(&self, id: PresetId) -> bool {
        self.family(id.family()).contains(&id)
    }

    /// Host controls to register for the exposed presets.
    #[must_use]
    pub fn descriptors(&self) -> Vec<ControlDescriptor> {
        self.presets()
            .map(|id| ControlDescriptor::new(ControlId::Preset(id), id.label()))
            .collect()
    }

    /// Controls of disabled families that a previous configuration may
    /// have left registered.
    #[must_use]
    pub fn stale_controls(&self) -> Vec<ControlId> {
        self.stale.iter().copied().map(ControlId::Preset).collect()
    }

    /// Whether `id` should report on; `None` if it is not exposed.
    #[must_use]
    pub fn is_on(&self, id: PresetId, state: &DeviceState) -> Option<bool> {
        if !self.contains(id) {
            return None;
        }
        Some(match id {
            PresetId::Speed(step) => state.is_speed_active(step),
            PresetId::Temp(index) => state.is_temp_active(index),
            PresetId::Timer(minutes) => state.is_timer_active(minutes),
        })
    }

    /// Current on/off value of every preset in `family`.
    #[must_use]
    pub fn states(&self, family: PresetFamily, state: &DeviceState) -> Vec<(PresetId, bool)> {
        self.family(family)
            .iter()
            .filter_map(|&id| self.is_on(id, state).map(|on| (id, on)))
            .collect()
    }

    /// Handles a host write to a preset toggle.
    ///
    /// Returns `None` if `id` is not exposed. Afterwards the caller applies
    /// the changes, sends the commands and recomputes `id`'s family.
    #[must_use]
    pub fn toggle(&self, id: PresetId, on: bool, state: &DeviceState) -> Option<PresetEffect> {
        if !self.contains(id) {
            return None;
        }
        let m = &self.mapping;
        let mut effect = PresetEffect::default();

        match (id, on) {
            (PresetId::Speed(step), true) => {
                if !state.fan_active() {
                    effect.push(
                        StateChange::FanActive(true),
                        Some(DpsCommand::new(m.fan_power, true)),
                    );
                }
                effect.push(
                    StateChange::FanSpeed(step),
                    Some(DpsCommand::new(m.fan_speed, step)),
                );
            }
            (PresetId::Speed(step), false) => {
                if state.is_speed_active(step) {
                    effect.push(
                        StateChange::FanActive(false),
                        Some(DpsCommand::new(m.fan_power, false)),
                    );
                }
            }
            (PresetId::Temp(index), true) => {
                if !state.light_on() {
                    effect.push(
                        StateChange::LightOn(true),
                        Some(DpsCommand::new(m.light_power, true)),
                    );
                }
                let command = m
                    .light_temp_mode
                    .zip(m.light_temp_values.get(index))
                    .map(|(dps, &value)| DpsCommand::new(dps, value));
                effect.push(StateChange::TempIndex(index), command);
            }
            // Temperature presets have no "off" action.
            (PresetId::Temp(_), false) => {}
            (PresetId::Timer(minutes), true) => {
                effect.push(
                    StateChange::TimerMinutes(minutes),
                    m.timer.map(|dps| DpsCommand::new(dps, minutes)),
                );
            }
            (PresetId::Timer(minutes), false) => {
                if state.is_timer_active(minutes) {
                    effect.push(
                        StateChange::TimerMinutes(0),
                        m.timer.map(|dps| DpsCommand::new(dps, 0u32)),
                    );
                }
            }
        }

        Some(effect)
    }
}
