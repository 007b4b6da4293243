// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for accessory ids derived from device ids.
const ACCESSORY_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_3b0e_8d2a_5f47_9e61_a4c8_0b7d_2e15);

/// Stable identifier of an accessory.
///
/// Derived deterministically (UUID v5) from the device id so the host
/// recognises the same fan across restarts.
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::event::AccessoryId;
///
/// let a = AccessoryId::for_device("bf1234567890abcdef");
/// let b = AccessoryId::for_device("bf1234567890abcdef");
/// assert_eq!(a, b);
/// assert_ne!(a, AccessoryId::for_device("another"));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessoryId(Uuid);

impl AccessoryId {
    /// Derives the identifier for a device id.
    #[must_use]
    pub fn for_device(device_id: &str) -> Self {
        Self(Uuid::new_v5(&ACCESSORY_NAMESPACE, device_id.as_bytes()))
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for AccessoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 8 characters are enough to tell fans apart in logs
        let short = &self.0.simple().to_string()[..8];
        write!(f, "AccessoryId({short}...)")
    }
}

impl fmt::Display for AccessoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for AccessoryId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<AccessoryId> for Uuid {
    fn from(id: AccessoryId) -> Self {
        id.0
    }
}
