// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory event types.

use crate::connection::ConnectionState;
use crate::state::{DeviceState, StateChange};

use super::AccessoryId;

/// Events emitted by accessories and the platform.
///
/// State events are published for every cache change, including changes
/// the debounce gate keeps from the host.
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::connection::ConnectionState;
/// use ceilfan_bridge::event::{AccessoryId, DeviceEvent};
///
/// let id = AccessoryId::for_device("abc");
/// let event = DeviceEvent::connection_changed(id, ConnectionState::Connected);
///
/// assert!(event.is_connection());
/// assert_eq!(event.accessory_id(), id);
/// ```
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// A new accessory was created.
    AccessoryAdded {
        /// The accessory.
        accessory_id: AccessoryId,
        /// Configured device name.
        name: String,
    },

    /// An accessory known to the host was reconfigured.
    AccessoryRestored {
        /// The accessory.
        accessory_id: AccessoryId,
        /// Configured device name.
        name: String,
    },

    /// A cached accessory is no longer configured.
    AccessoryRemoved {
        /// The accessory.
        accessory_id: AccessoryId,
    },

    /// Link state changed.
    ConnectionChanged {
        /// The accessory.
        accessory_id: AccessoryId,
        /// The new link state.
        state: ConnectionState,
    },

    /// Cached device state changed.
    StateChanged {
        /// The accessory.
        accessory_id: AccessoryId,
        /// The change that was applied.
        change: StateChange,
        /// Full state after the change.
        new_state: DeviceState,
    },
}

impl DeviceEvent {
    /// Returns the accessory this event concerns.
    #[must_use]
    pub fn accessory_id(&self) -> AccessoryId {
        match self {
            Self::AccessoryAdded { accessory_id, .. }
            | Self::AccessoryRestored { accessory_id, .. }
            | Self::AccessoryRemoved { accessory_id }
            | Self::ConnectionChanged { accessory_id, .. }
            | Self::StateChanged { accessory_id, .. } => *accessory_id,
        }
    }

    /// Returns `true` for added/restored/removed events.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::AccessoryAdded { .. }
                | Self::AccessoryRestored { .. }
                | Self::AccessoryRemoved { .. }
        )
    }

    /// Returns `true` if this is a connection event.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionChanged { .. })
    }

    /// Returns `true` if this is a state change event.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }

    /// Creates a connection event.
    #[must_use]
    pub fn connection_changed(accessory_id: AccessoryId, state: ConnectionState) -> Self {
        Self::ConnectionChanged {
            accessory_id,
            state,
        }
    }

    /// Creates a state changed event.
    #[must_use]
    pub fn state_changed(
        accessory_id: AccessoryId,
        change: StateChange,
        new_state: DeviceState,
    ) -> Self {
        Self::StateChanged {
            accessory_id,
            change,
            new_state,
        }
    }
}
