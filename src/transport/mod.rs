// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device transport boundary.
//!
//! The bridge does not speak the device's network protocol itself. A
//! [`Transport`] implementation discovers the device, keeps a link open
//! and exchanges raw data-point bags; the accessory drives it and consumes
//! its [`TransportEvent`] stream.

use std::future::Future;

use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::types::{DpsBag, DpsId, DpsValue};

/// Lifecycle and data events emitted by a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The link to the device is open.
    Connected,
    /// The link to the device was lost or closed.
    Disconnected,
    /// The device reported data-point values (push or refresh reply).
    Data(DpsBag),
    /// A transport-level error occurred.
    Error(String),
}

/// A single data-point write.
#[derive(Debug, Clone, PartialEq)]
pub struct DpsCommand {
    /// Target data point.
    pub dps: DpsId,
    /// Value to write.
    pub value: DpsValue,
}

impl DpsCommand {
    /// Creates a command.
    #[must_use]
    pub fn new(dps: DpsId, value: impl Into<DpsValue>) -> Self {
        Self {
            dps,
            value: value.into(),
        }
    }
}

/// Connection to one physical device.
///
/// Async methods return `Send` futures so the accessory can run them on
/// spawned tasks while it keeps handling events.
pub trait Transport: Send + Sync + 'static {
    /// Locates the device on the network.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::NotFound` if the device does not answer.
    fn find(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Opens the link. Success is reported via [`TransportEvent::Connected`].
    ///
    /// # Errors
    ///
    /// Returns `TransportError::ConnectionFailed` if the link cannot be opened.
    fn connect(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Closes the link.
    ///
    /// # Errors
    ///
    /// Returns an error if the link could not be closed cleanly.
    fn disconnect(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Requests a full state report, answered with [`TransportEvent::Data`].
    ///
    /// # Errors
    ///
    /// Returns `TransportError::RefreshFailed` if the request fails.
    fn refresh(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Writes one data point without waiting for acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::SendFailed` if the write could not be queued.
    fn send(&self, command: DpsCommand) -> Result<(), TransportError>;

    /// Takes the event receiver.
    ///
    /// Returns `None` if it was already taken.
    fn take_event_receiver(&self) -> Option<mpsc::Receiver<TransportEvent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_from_primitives() {
        let cmd = DpsCommand::new(DpsId::new(60), true);
        assert_eq!(cmd.value, DpsValue::Bool(true));

        let cmd = DpsCommand::new(DpsId::new(63), "reverse");
        assert_eq!(cmd.value, DpsValue::Str("reverse".to_string()));

        let cmd = DpsCommand::new(DpsId::new(64), 120u32);
        assert_eq!(cmd.value, DpsValue::Int(120));
    }
}
