// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device link lifecycle.
//!
//! [`ConnectionManager`] tracks whether the link is up, schedules
//! reconnects with exponential backoff ([`ReconnectionPolicy`]) and drives
//! periodic state refreshes while connected.

mod manager;
mod reconnect;

pub use manager::{ConnectionAction, ConnectionManager, ConnectionState, DEFAULT_CONNECT_GRACE};
pub use reconnect::{DEFAULT_INITIAL_DELAY, DEFAULT_MAX_DELAY, ReconnectionPolicy};
