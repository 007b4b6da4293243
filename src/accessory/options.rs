// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runtime timing options for an accessory.

use std::time::Duration;

use crate::config::{DEFAULT_POLLING_INTERVAL_SECS, PlatformConfig};
use crate::connection::{DEFAULT_CONNECT_GRACE, ReconnectionPolicy};
use crate::state::DEFAULT_DEBOUNCE_WINDOW;

/// Timing knobs of one accessory.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ceilfan_bridge::accessory::AccessoryOptions;
///
/// let options = AccessoryOptions::default()
///     .with_polling_interval(Duration::from_secs(30))
///     .with_debounce_window(Duration::from_millis(500));
///
/// assert_eq!(options.connect_grace, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryOptions {
    /// Reconnect backoff.
    pub reconnection: ReconnectionPolicy,
    /// Pause between a fresh connection and the first refresh.
    pub connect_grace: Duration,
    /// Window during which repeated inbound data is not pushed to the host.
    pub debounce_window: Duration,
    /// Interval between full refreshes while connected; zero disables.
    pub polling_interval: Duration,
}

impl AccessoryOptions {
    /// Options for accessories of the given platform configuration.
    #[must_use]
    pub fn from_config(config: &PlatformConfig) -> Self {
        Self::default().with_polling_interval(config.polling_interval())
    }

    /// Sets the reconnect backoff.
    #[must_use]
    pub fn with_reconnection(mut self, policy: ReconnectionPolicy) -> Self {
        self.reconnection = policy;
        self
    }

    /// Sets the post-connect grace period.
    #[must_use]
    pub fn with_connect_grace(mut self, grace: Duration) -> Self {
        self.connect_grace = grace;
        self
    }

    /// Sets the debounce window.
    #[must_use]
    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Sets the polling interval.
    #[must_use]
    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }
}

impl Default for AccessoryOptions {
    fn default() -> Self {
        Self {
            reconnection: ReconnectionPolicy::default(),
            connect_grace: DEFAULT_CONNECT_GRACE,
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
            polling_interval: Duration::from_secs(DEFAULT_POLLING_INTERVAL_SECS),
        }
    }
}
