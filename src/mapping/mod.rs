// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping between device data points and host-facing values.
//!
//! [`DpsMapping`] and [`FeatureFlags`] are resolved once per device from
//! the platform configuration. The free functions in this module are the
//! stateless conversions used when applying device data and when handling
//! host writes.
//!
//! # Examples
//!
//! ```
//! use ceilfan_bridge::mapping::{percent_to_step, step_to_percent};
//! use ceilfan_bridge::types::SpeedRange;
//!
//! let range = SpeedRange::new(1, 6).unwrap();
//! for step in range.steps() {
//!     assert_eq!(percent_to_step(step_to_percent(step, range), range), step);
//! }
//! ```

mod conversion;
mod dps_mapping;
mod features;

pub use conversion::{percent_to_step, resolve_temp_index, step_to_percent};
pub use dps_mapping::{
    DEFAULT_FAN_DIRECTION_DPS, DEFAULT_FAN_POWER_DPS, DEFAULT_FAN_SPEED_DPS,
    DEFAULT_LIGHT_POWER_DPS, DEFAULT_LIGHT_TEMP_MODE_DPS, DEFAULT_LIGHT_TEMP_VALUES,
    DEFAULT_TIMER_DPS, DEFAULT_TIMER_VALUES, DpsMapping, DpsMappingOverrides,
};
pub use features::{FeatureFlags, FeatureOverrides};
