// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection lifecycle state machine.

use std::fmt;
use std::time::Duration;

use crate::error::TransportError;
use crate::scheduler::{ScheduledTask, Scheduler, TimerId};

use super::ReconnectionPolicy;

/// Default pause between a fresh connection and the first refresh.
pub const DEFAULT_CONNECT_GRACE: Duration = Duration::from_secs(2);

/// Link state of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No link and no attempt in flight.
    Disconnected,
    /// A find/connect attempt is in flight.
    Connecting,
    /// The link is open.
    Connected,
}

impl ConnectionState {
    /// Returns true if the device is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns true if a connection attempt is in flight.
    #[must_use]
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Work the manager asks its owner to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Start a find + connect attempt.
    Connect,
    /// Request a full state refresh.
    Refresh,
}

/// Owns the connect/reconnect/poll lifecycle of one device link.
///
/// The manager never performs I/O. Transport events and timer firings are
/// fed in; [`ConnectionAction`]s come out. It holds at most one pending
/// reconnect timer, one post-connect grace timer and one polling timer, all
/// of which are cancelled on [`shutdown`](Self::shutdown) or drop.
#[derive(Debug)]
pub struct ConnectionManager {
    device: String,
    state: ConnectionState,
    policy: ReconnectionPolicy,
    failures: u32,
    grace: Duration,
    polling_interval: Duration,
    scheduler: Scheduler,
    reconnect_timer: Option<ScheduledTask>,
    grace_timer: Option<ScheduledTask>,
    poll_timer: Option<ScheduledTask>,
}

impl ConnectionManager {
    /// Creates a manager in the disconnected state.
    ///
    /// A zero `polling_interval` disables periodic refreshes.
    #[must_use]
    pub fn new(
        device: impl Into<String>,
        scheduler: Scheduler,
        policy: ReconnectionPolicy,
        grace: Duration,
        polling_interval: Duration,
    ) -> Self {
        Self {
            device: device.into(),
            state: ConnectionState::Disconnected,
            policy,
            failures: 0,
            grace,
            polling_interval,
            scheduler,
            reconnect_timer: None,
            grace_timer: None,
            poll_timer: None,
        }
    }

    /// Current link state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns true if the device is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Returns true if a reconnect is scheduled.
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_timer.is_some()
    }

    /// Returns true if periodic polling is running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poll_timer.is_some()
    }

    /// Delay the next scheduled reconnect would use.
    #[must_use]
    pub fn next_reconnect_delay(&self) -> Duration {
        self.policy.delay_for_attempt(self.failures)
    }

    /// Requests a connection attempt.
    ///
    /// Returns `true` if the caller should start one; requests made while
    /// connecting or connected collapse into the existing attempt.
    pub fn request_connect(&mut self) -> bool {
        if self.state != ConnectionState::Disconnected {
            return false;
        }
        self.state = ConnectionState::Connecting;
        tracing::info!(device = %self.device, "Connecting");
        true
    }

    /// The transport reported an open link.
    pub fn on_connected(&mut self) {
        tracing::info!(device = %self.device, "Connected");
        self.state = ConnectionState::Connected;
        self.failures = 0;
        self.reconnect_timer = None;
        self.poll_timer = None;
        self.grace_timer = Some(self.scheduler.once(self.grace));
    }

    /// A find/connect attempt failed.
    ///
    /// Ignored unless an attempt is in flight.
    pub fn on_connect_failed(&mut self, error: &TransportError) {
        if !self.state.is_connecting() {
            return;
        }
        tracing::warn!(device = %self.device, error = %error, "Connection failed");
        self.state = ConnectionState::Disconnected;
        self.schedule_reconnect();
    }

    /// The transport reported a closed link.
    pub fn on_disconnected(&mut self) {
        tracing::info!(device = %self.device, "Disconnected");
        self.state = ConnectionState::Disconnected;
        self.stop_polling();
        self.schedule_reconnect();
    }

    /// The transport reported an error.
    ///
    /// An error while disconnected keeps the reconnect loop going. While
    /// connecting, the pending attempt reports its own outcome.
    pub fn on_error(&mut self, message: &str) {
        tracing::warn!(device = %self.device, error = %message, "Transport error");
        if self.state == ConnectionState::Disconnected {
            self.schedule_reconnect();
        }
    }

    /// A scheduled task fired.
    ///
    /// Firings from tasks the manager no longer holds are ignored.
    pub fn on_timer(&mut self, id: TimerId) -> Option<ConnectionAction> {
        if self.reconnect_timer.as_ref().is_some_and(|t| t.is(id)) {
            self.reconnect_timer = None;
            return self.request_connect().then_some(ConnectionAction::Connect);
        }

        if self.grace_timer.as_ref().is_some_and(|t| t.is(id)) {
            self.grace_timer = None;
            if !self.is_connected() {
                return None;
            }
            self.start_polling();
            return Some(ConnectionAction::Refresh);
        }

        if self.poll_timer.as_ref().is_some_and(|t| t.is(id)) {
            return self.is_connected().then_some(ConnectionAction::Refresh);
        }

        tracing::trace!(device = %self.device, timer = %id, "Ignoring stale timer");
        None
    }

    /// Cancels every outstanding timer.
    pub fn shutdown(&mut self) {
        cancel(&mut self.reconnect_timer);
        self.stop_polling();
        self.state = ConnectionState::Disconnected;
    }

    fn schedule_reconnect(&mut self) {
        if self.reconnect_timer.is_some() {
            return;
        }
        let delay = self.next_reconnect_delay();
        self.failures = self.failures.saturating_add(1);
        tracing::debug!(
            device = %self.device,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Reconnect scheduled"
        );
        self.reconnect_timer = Some(self.scheduler.once(delay));
    }

    fn start_polling(&mut self) {
        self.poll_timer = None;
        if self.polling_interval.is_zero() {
            return;
        }
        tracing::debug!(
            device = %self.device,
            interval_s = self.polling_interval.as_secs(),
            "Polling started"
        );
        self.poll_timer = Some(self.scheduler.repeating(self.polling_interval));
    }

    fn stop_polling(&mut self) {
        cancel(&mut self.grace_timer);
        cancel(&mut self.poll_timer);
    }
}

fn cancel(slot: &mut Option<ScheduledTask>) {
    if let Some(task) = slot.take() {
        task.cancel();
    }
}
