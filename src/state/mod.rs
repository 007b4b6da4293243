// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! [`DeviceState`] is the last-known fan and light state. Raw data-point
//! bags are decoded once into a [`DpsUpdate`], which the [`StateCache`]
//! applies as [`StateChange`]s while deciding whether the host should be
//! told about them.
//!
//! # Examples
//!
//! ```
//! use ceilfan_bridge::state::{DeviceState, StateChange};
//!
//! let mut state = DeviceState::new();
//!
//! let changed = state.apply(&StateChange::LightOn(true));
//! assert!(changed);
//!
//! // Applying the same change again returns false
//! assert!(!state.apply(&StateChange::LightOn(true)));
//! ```

mod cache;
mod device_state;
mod dps_update;
mod state_change;

pub use cache::{ApplyOutcome, DEFAULT_DEBOUNCE_WINDOW, StateCache};
pub use device_state::DeviceState;
pub use dps_update::{DpsUpdate, LightTemp};
pub use state_change::StateChange;
