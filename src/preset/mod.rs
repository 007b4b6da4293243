// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mutually exclusive preset toggles.
//!
//! Speed, colour-temperature and timer presets are exposed as independent
//! on/off controls. [`PresetSynchronizer`] keeps them consistent with the
//! cached device state.

mod id;
mod synchronizer;

pub use id::{PresetFamily, PresetId};
pub use synchronizer::{PresetEffect, PresetSynchronizer};
