// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host platform boundary.
//!
//! The host exposes named controls to users. The accessory registers the
//! controls it needs, removes controls that a previous configuration left
//! behind, and pushes observed values whenever they change. Reads and
//! writes coming from the host are routed back through
//! [`AccessoryHandle`](crate::accessory::AccessoryHandle).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::preset::PresetId;
use crate::types::FanDirection;

/// Identifies one host-exposed control of an accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ControlId {
    /// Fan on/off.
    FanActive,
    /// Fan rotation direction.
    RotationDirection,
    /// Fan speed as a percentage.
    RotationSpeed,
    /// Light on/off.
    LightOn,
    /// A preset toggle.
    Preset(PresetId),
    /// The un-subtyped light toggle older releases registered. Never
    /// exposed; removed on every start.
    LegacyToggle,
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FanActive => write!(f, "fan-active"),
            Self::RotationDirection => write!(f, "rotation-direction"),
            Self::RotationSpeed => write!(f, "rotation-speed"),
            Self::LightOn => write!(f, "light-on"),
            Self::Preset(preset) => write!(f, "{preset}"),
            Self::LegacyToggle => write!(f, "legacy-toggle"),
        }
    }
}

/// Value of a control as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlValue {
    /// On/off controls and preset toggles.
    Bool(bool),
    /// Rotation direction.
    Direction(FanDirection),
    /// Rotation speed, 0-100.
    Percent(u8),
}

impl ControlValue {
    /// Boolean reading of the value.
    ///
    /// Directions read as `true` when counter-clockwise, percentages when
    /// non-zero.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Direction(d) => *d == FanDirection::CounterClockwise,
            Self::Percent(p) => *p > 0,
        }
    }
}

impl From<bool> for ControlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<FanDirection> for ControlValue {
    fn from(value: FanDirection) -> Self {
        Self::Direction(value)
    }
}

/// A control the accessory asks the host to expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlDescriptor {
    /// Stable identifier.
    pub id: ControlId,
    /// Display name.
    pub name: String,
}

impl ControlDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(id: ControlId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Host-side operations used by an accessory.
///
/// All calls must be idempotent: registering an existing control, removing
/// an absent one, or re-announcing an unchanged value is harmless.
pub trait HostControl: Send + 'static {
    /// Exposes a control (or refreshes its name if it already exists).
    fn register_control(&self, descriptor: &ControlDescriptor);

    /// Removes a control if the host still has it.
    fn remove_control(&self, id: ControlId);

    /// Reports the current value of a control.
    fn notify_value_changed(&self, id: ControlId, value: ControlValue);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_id_display() {
        assert_eq!(ControlId::FanActive.to_string(), "fan-active");
        assert_eq!(
            ControlId::Preset(PresetId::Timer(120)).to_string(),
            "timer-preset-120"
        );
    }

    #[test]
    fn control_value_as_bool() {
        assert!(ControlValue::Bool(true).as_bool());
        assert!(!ControlValue::Percent(0).as_bool());
        assert!(ControlValue::Direction(FanDirection::CounterClockwise).as_bool());
        assert!(!ControlValue::from(FanDirection::Clockwise).as_bool());
    }
}
