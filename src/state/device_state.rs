// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known fan and light state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{FanDirection, SpeedRange};

use super::StateChange;

/// Last-known state of one fan/light device.
///
/// The fan speed is kept while the fan is off so the previously active
/// speed preset can be computed again when it turns back on. No preset
/// reports on while the fan is inactive.
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::state::{DeviceState, StateChange};
///
/// let mut state = DeviceState::new();
/// assert!(state.apply(&StateChange::FanSpeed(4)));
/// assert!(state.apply(&StateChange::FanActive(true)));
///
/// assert!(state.is_speed_active(4));
///
/// state.apply(&StateChange::FanActive(false));
/// assert_eq!(state.fan_speed(), 4);
/// assert!(!state.is_speed_active(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    fan_active: bool,
    fan_speed: u8,
    fan_direction: FanDirection,
    light_on: bool,
    current_temp_index: usize,
    timer_remaining_minutes: u32,
}

impl DeviceState {
    /// Creates the state a freshly constructed accessory starts with.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the initial state for a fan stepping through `range`.
    ///
    /// The remembered speed starts at the lowest step, so turning the fan
    /// on before the device reports lands on a valid preset.
    #[must_use]
    pub fn for_range(range: SpeedRange) -> Self {
        Self {
            fan_active: false,
            fan_speed: range.min(),
            fan_direction: FanDirection::Clockwise,
            light_on: false,
            current_temp_index: 0,
            timer_remaining_minutes: 0,
        }
    }

    /// Whether the fan is running.
    #[must_use]
    pub fn fan_active(&self) -> bool {
        self.fan_active
    }

    /// Current (or last) fan speed step.
    #[must_use]
    pub fn fan_speed(&self) -> u8 {
        self.fan_speed
    }

    /// Rotation direction.
    #[must_use]
    pub fn fan_direction(&self) -> FanDirection {
        self.fan_direction
    }

    /// Whether the light is on.
    #[must_use]
    pub fn light_on(&self) -> bool {
        self.light_on
    }

    /// Index into the configured colour-temperature list.
    #[must_use]
    pub fn current_temp_index(&self) -> usize {
        self.current_temp_index
    }

    /// Minutes left on the shutoff timer, `0` when no timer runs.
    #[must_use]
    pub fn timer_remaining_minutes(&self) -> u32 {
        self.timer_remaining_minutes
    }

    /// Whether the speed preset for `step` should report on.
    #[must_use]
    pub fn is_speed_active(&self, step: u8) -> bool {
        self.fan_active && self.fan_speed == step
    }

    /// Whether the temperature preset at `index` should report on.
    #[must_use]
    pub fn is_temp_active(&self, index: usize) -> bool {
        self.light_on && self.current_temp_index == index
    }

    /// Whether the timer preset for `minutes` should report on.
    #[must_use]
    pub fn is_timer_active(&self, minutes: u32) -> bool {
        self.timer_remaining_minutes == minutes
    }

    /// Applies a change.
    ///
    /// Returns `true` if any field actually changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        match change {
            StateChange::FanActive(v) => replace(&mut self.fan_active, *v),
            StateChange::FanSpeed(v) => replace(&mut self.fan_speed, *v),
            StateChange::FanDirection(v) => replace(&mut self.fan_direction, *v),
            StateChange::LightOn(v) => replace(&mut self.light_on, *v),
            StateChange::TempIndex(v) => replace(&mut self.current_temp_index, *v),
            StateChange::TimerMinutes(v) => replace(&mut self.timer_remaining_minutes, *v),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::for_range(SpeedRange::default())
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fan={} speed={} dir={} light={} temp={} timer={}m",
            if self.fan_active { "ON" } else { "OFF" },
            self.fan_speed,
            self.fan_direction,
            if self.light_on { "ON" } else { "OFF" },
            self.current_temp_index,
            self.timer_remaining_minutes,
        )
    }
}
