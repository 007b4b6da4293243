// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.

use serde::{Deserialize, Serialize};

use crate::types::FanDirection;

/// A discrete change to a [`DeviceState`](super::DeviceState).
///
/// Changes come either from decoded device data or from optimistic writes
/// made by host handlers before the device confirms them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChange {
    /// Fan power.
    FanActive(bool),
    /// Fan speed step.
    FanSpeed(u8),
    /// Rotation direction.
    FanDirection(FanDirection),
    /// Light power.
    LightOn(bool),
    /// Colour-temperature index.
    TempIndex(usize),
    /// Minutes remaining on the timer.
    TimerMinutes(u32),
}
