// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the bridge.
//!
//! # Types
//!
//! - [`DpsId`] - Numeric identifier of a device data point
//! - [`DpsValue`] - Raw value of one data point (bool, number or string)
//! - [`DpsBag`] - Raw data-point map as delivered by the transport
//! - [`FanDirection`] - Clockwise / counter-clockwise rotation
//! - [`SpeedRange`] - Inclusive range of discrete fan speed steps

mod direction;
mod dps_value;
mod speed_range;

pub use direction::FanDirection;
pub use dps_value::{DpsBag, DpsId, DpsValue};
pub use speed_range::SpeedRange;
